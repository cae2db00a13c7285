use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A customer's purchase of one or more lessons
///
/// Values are stored as received. Referenced lessons are not checked for existence and
/// `quantity` is not reconciled with the number of lesson ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub name: Value,
    pub phone: Value,
    #[serde(rename = "lessonIDs")]
    pub lesson_ids: Vec<Value>,
    pub quantity: Number,
}

/// Candidate order as submitted by a client
///
/// Every field is optional here so that validation can report exactly which ones are missing.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default, rename = "lessonIDs")]
    pub lesson_ids: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// One or more fields are absent, null, or hold an empty/zero/false value
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("lessonIDs must be an array")]
    LessonIdsNotArray,
    #[error("quantity must be a number")]
    QuantityNotNumber,
}

impl TryFrom<OrderRequest> for Order {
    type Error = OrderError;

    fn try_from(req: OrderRequest) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        let name = require("name", req.name, &mut missing);
        let phone = require("phone", req.phone, &mut missing);
        let lesson_ids = require("lessonIDs", req.lesson_ids, &mut missing);
        let quantity = require("quantity", req.quantity, &mut missing);

        let (Some(name), Some(phone), Some(lesson_ids), Some(quantity)) =
            (name, phone, lesson_ids, quantity)
        else {
            return Err(OrderError::MissingFields(missing));
        };

        let Value::Array(lesson_ids) = lesson_ids else {
            return Err(OrderError::LessonIdsNotArray);
        };
        let Value::Number(quantity) = quantity else {
            return Err(OrderError::QuantityNotNumber);
        };

        Ok(Order {
            name,
            phone,
            lesson_ids,
            quantity,
        })
    }
}

fn require(
    field: &'static str,
    value: Option<Value>,
    missing: &mut Vec<&'static str>,
) -> Option<Value> {
    match value {
        Some(value) if is_truthy(&value) => Some(value),
        _ => {
            missing.push(field);
            None
        }
    }
}

/// Truthiness of a JSON value: `null`, `false`, `0`, and `""` are falsy, everything else
/// (including empty arrays and objects) is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
