use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::{json, Map, Value};
use tower::ServiceExt;

use crate::{
    commands::{
        list_lessons::ListLessonsRequest, place_order::PlaceOrderRequest,
        update_lesson::UpdateLessonRequest, DomainLogic, Error,
    },
    domain::{Lesson, LessonId, OrderRequest},
    ports::database::DatabasePort,
};

use super::errors::ApiError;

pub async fn list_lessons<D>(
    State(domain): State<DomainLogic<D>>,
) -> Result<Json<Vec<Lesson>>, ApiError>
where
    D: DatabasePort + 'static,
{
    let lessons = domain.oneshot(ListLessonsRequest).await?;
    Ok(Json(lessons))
}

pub async fn place_order<D>(
    State(domain): State<DomainLogic<D>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError>
where
    D: DatabasePort + 'static,
{
    let order = match parse_body(&body)? {
        Value::Object(fields) => serde_json::from_value::<OrderRequest>(Value::Object(fields))
            .map_err(|err| ApiError::BadRequest(format!("Invalid request body: {err}")))?,
        _ => OrderRequest::default(),
    };

    domain.oneshot(PlaceOrderRequest { order }).await?;

    Ok(Json(json!({ "message": "Order placed successfully" })))
}

pub async fn update_lesson<D>(
    State(domain): State<DomainLogic<D>>,
    Path((id, attribute)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>, ApiError>
where
    D: DatabasePort + 'static,
{
    // Anything that is not a number cannot match a lesson id
    let id: LessonId = id
        .parse()
        .map_err(|_| ApiError::from(Error::LessonNotFound(id.clone())))?;
    let value = match parse_body(&body)? {
        Value::Object(mut fields) => fields.remove("value").unwrap_or(Value::Null),
        _ => Value::Null,
    };

    let result = domain
        .oneshot(UpdateLessonRequest {
            id,
            attribute,
            value,
        })
        .await?;

    Ok(Json(json!({
        "message": "Lesson updated successfully",
        "result": result,
    })))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// Known path, unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed")
}

/// Parse a JSON request body, reading an empty body as `{}`
fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(error = %err, "malformed JSON body");
        ApiError::BadRequest(format!("Invalid JSON body: {err}"))
    })
}
