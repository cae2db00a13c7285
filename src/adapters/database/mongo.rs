use crate::{
    domain::{Lesson, LessonId, Order},
    ports::database::{DatabasePort, Error, UpdateOutcome},
};
use chrono::{DateTime, SecondsFormat};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    Client, Collection, Database,
};
use serde_json::{Map, Number, Value};

const LESSONS: &str = "lessons";
const ORDERS: &str = "orders";

/// MongoDB-backed store
///
/// Lessons and orders live in the `lessons` and `orders` collections. The numeric `id`
/// attribute of a lesson is looked up as a regular field, never as the `_id` key.
#[derive(Clone, Debug)]
pub struct MongoDatabase {
    lessons: Collection<Document>,
    orders: Collection<Document>,
}

impl MongoDatabase {
    /// Connect to the deployment at `uri` and check it answers a `ping`
    ///
    /// The database named in the URI is used when there is one, `default_name` otherwise.
    pub async fn connect(uri: &str, default_name: &str) -> Result<Self, Error> {
        let client = Client::with_uri_str(uri).await?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(default_name));
        database.run_command(doc! { "ping": 1 }).await?;

        tracing::info!(database = database.name(), "connected to MongoDB");
        Ok(Self::new(&database))
    }

    pub fn new(database: &Database) -> Self {
        Self {
            lessons: database.collection(LESSONS),
            orders: database.collection(ORDERS),
        }
    }
}

#[async_trait::async_trait]
impl DatabasePort for MongoDatabase {
    async fn list_lessons(&self) -> Result<Vec<Lesson>, Error> {
        let documents: Vec<Document> = self.lessons.find(doc! {}).await?.try_collect().await?;
        Ok(documents.into_iter().map(lesson_from_document).collect())
    }

    async fn find_lesson(&self, id: LessonId) -> Result<Option<Lesson>, Error> {
        let document = self.lessons.find_one(id_filter(id)).await?;
        Ok(document.map(lesson_from_document))
    }

    async fn update_lesson_attribute(
        &self,
        id: LessonId,
        attribute: String,
        value: Value,
    ) -> Result<UpdateOutcome, Error> {
        let mut set = Document::new();
        set.insert(attribute, json_to_bson(&value));

        let result = self
            .lessons
            .update_one(id_filter(id), doc! { "$set": set })
            .await?;

        Ok(UpdateOutcome::new(
            result.matched_count,
            result.modified_count,
        ))
    }

    async fn insert_order(&self, order: Order) -> Result<(), Error> {
        self.orders.insert_one(order_document(&order)).await?;
        Ok(())
    }
}

/// Filter matching the numeric `id` attribute
///
/// Integral ids are sent as 64-bit integers; the server compares numbers across numeric types.
fn id_filter(id: LessonId) -> Document {
    let id = match id.as_i64() {
        Some(id) => Bson::Int64(id),
        None => Bson::Double(id.value()),
    };
    doc! { "id": id }
}

fn lesson_from_document(document: Document) -> Lesson {
    let attributes: Map<String, Value> = document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect();
    Lesson::new(attributes)
}

/// Read a stored value back as JSON
///
/// Object ids become hex strings and dates ISO 8601 strings with millisecond precision;
/// everything else goes through relaxed extended JSON.
fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(date) => match DateTime::from_timestamp_millis(date.timestamp_millis()) {
            Some(date) => Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => Bson::DateTime(date).into_relaxed_extjson(),
        },
        Bson::Array(values) => Value::Array(values.into_iter().map(bson_to_json).collect()),
        Bson::Document(document) => Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        other => other.into_relaxed_extjson(),
    }
}

fn order_document(order: &Order) -> Document {
    doc! {
        "name": json_to_bson(&order.name),
        "phone": json_to_bson(&order.phone),
        "lessonIDs": order.lesson_ids.iter().map(json_to_bson).collect::<Vec<_>>(),
        "quantity": number_to_bson(&order.quantity),
    }
}

fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => number_to_bson(n),
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(values) => Bson::Array(values.iter().map(json_to_bson).collect()),
        Value::Object(fields) => Bson::Document(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), json_to_bson(value)))
                .collect(),
        ),
    }
}

/// Integers that fit 64 signed bits stay integers, anything larger is stored as a double
fn number_to_bson(n: &Number) -> Bson {
    match n.as_i64() {
        Some(i) => match i32::try_from(i) {
            Ok(i) => Bson::Int32(i),
            Err(_) => Bson::Int64(i),
        },
        None => Bson::Double(n.as_f64().unwrap_or(f64::NAN)),
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Adapter(Box::new(err))
    }
}
