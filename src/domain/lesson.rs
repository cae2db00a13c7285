use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A bookable lesson from the catalog
///
/// Lessons carry no fixed schema: the set of attributes is whatever the stored record holds
/// (subject, price, spaces, location, ...). The numeric `id` attribute identifies the lesson
/// and is distinct from the key the store assigns to the record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lesson {
    attributes: Map<String, Value>,
}

impl Lesson {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    /// Numeric identifier of the lesson, if the record carries one
    pub fn id(&self) -> Option<f64> {
        self.attributes.get("id").and_then(Value::as_f64)
    }

    pub fn has_id(&self, id: LessonId) -> bool {
        self.id() == Some(id.value())
    }

    /// Whether the record itself holds this attribute
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Replace the value of an attribute the lesson already has
    ///
    /// Returns `None` without touching the record if the attribute does not exist, otherwise
    /// whether the stored value changed.
    pub fn set_attribute(&mut self, name: &str, value: Value) -> Option<bool> {
        let slot = self.attributes.get_mut(name)?;
        let modified = *slot != value;
        *slot = value;
        Some(modified)
    }
}

impl From<Map<String, Value>> for Lesson {
    fn from(attributes: Map<String, Value>) -> Self {
        Self::new(attributes)
    }
}

/// Numeric lesson identifier as addressed from a request path
///
/// Parsing follows numeric coercion: surrounding whitespace is ignored, an empty string
/// reads as `0` and unsigned `0x`, `0o` and `0b` literals are accepted. Only finite numbers
/// are valid identifiers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LessonId(f64);

impl LessonId {
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Integer form of the identifier, when it has no fractional part
    pub fn as_i64(self) -> Option<i64> {
        let in_range = self.0 >= i64::MIN as f64 && self.0 <= i64::MAX as f64;
        (self.0.fract() == 0.0 && in_range).then_some(self.0 as i64)
    }
}

impl FromStr for LessonId {
    type Err = InvalidLessonId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self(0.0));
        }

        let value = match radix_literal(trimmed) {
            Some((radix, digits)) => parse_radix(digits, radix),
            None => trimmed.parse::<f64>().ok(),
        };

        value
            .and_then(Self::new)
            .ok_or_else(|| InvalidLessonId(s.to_string()))
    }
}

fn radix_literal(s: &str) -> Option<(u32, &str)> {
    let prefix = s.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((radix, &s[2..]))
}

/// Digits are accumulated as a float so that very long literals lose precision instead of
/// overflowing
fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0, |acc, c| {
        let digit = c.to_digit(radix)?;
        Some(acc * f64::from(radix) + f64::from(digit))
    })
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_i64() {
            Some(id) => write!(f, "{id}"),
            None => write!(f, "{}", self.0),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("not a numeric lesson id: {0:?}")]
pub struct InvalidLessonId(pub String);
