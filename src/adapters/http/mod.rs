//! HTTP surface of the lesson booking service
//!
//! | Method | Path                      | Command                  |
//! |--------|---------------------------|--------------------------|
//! | GET    | `/lessons`                | list every lesson        |
//! | POST   | `/order`                  | validate and store order |
//! | PUT    | `/lesson/:id/:attribute`  | update one attribute     |
//!
//! Every error response is a JSON object with an `errorMsg` field, including the 404 for
//! unknown paths and the 405 for a known path with another method.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};

use crate::{commands::DomainLogic, ports::database::DatabasePort};

pub mod errors;
pub mod handlers;
pub mod middleware;

pub use middleware::OriginAllowList;

/// Build the router with the cross-origin gate and the access logger applied
pub fn router<D>(domain: DomainLogic<D>, allow_list: OriginAllowList) -> Router
where
    D: DatabasePort + 'static,
{
    Router::new()
        .route(
            "/lessons",
            get(handlers::list_lessons::<D>).fallback(handlers::method_not_allowed),
        )
        .route(
            "/order",
            post(handlers::place_order::<D>).fallback(handlers::method_not_allowed),
        )
        .route(
            "/lesson/:id/:attribute",
            put(handlers::update_lesson::<D>).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .with_state(domain)
        .layer(allow_list.cors_layer())
        .layer(from_fn_with_state(allow_list, middleware::cors_gate))
        .layer(from_fn(middleware::access_log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::database::{lazy::LazyDatabase, memory::MemoryDatabase},
        domain::Lesson,
        ports::database::{self, MockDatabasePort},
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use rstest::*;
    use serde_json::{json, Value};
    use speculoos::prelude::*;
    use std::sync::Arc;
    use tower::{BoxError, ServiceExt};

    const ALLOWED_ORIGIN: &str = "http://localhost:8080";

    #[fixture]
    fn lessons() -> Vec<Lesson> {
        serde_json::from_value(json!([
            { "id": 1, "subject": "Math", "price": 100, "spaces": 5, "location": "London" },
            { "id": 5, "subject": "Art", "price": 80, "spaces": 5, "location": "Leeds" },
            { "id": 3, "subject": "Music", "price": 90, "spaces": 0, "location": "York" },
        ]))
        .unwrap()
    }

    fn app(database: MemoryDatabase) -> Router {
        router(
            DomainLogic::new(Arc::new(database)),
            OriginAllowList::new([ALLOWED_ORIGIN]),
        )
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> Result<(StatusCode, Value), BoxError> {
        let response = app.clone().oneshot(req).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_lessons(lessons: Vec<Lesson>) -> Result<(), BoxError> {
        // GIVEN a store holding three lessons
        let app = app(MemoryDatabase::with_lessons(lessons.clone()));

        // WHEN listing lessons
        let (status, body) = send(&app, get_request("/lessons")).await?;

        // THEN all of them come back in store order, untransformed
        assert_that!(status).is_equal_to(StatusCode::OK);
        assert_that!(body).is_equal_to(serde_json::to_value(&lessons)?);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_lessons_not_ready() -> Result<(), BoxError> {
        // GIVEN a store that has not connected yet
        let app = router(
            DomainLogic::new(Arc::new(LazyDatabase::new())),
            OriginAllowList::default(),
        );

        // WHEN listing lessons
        let (status, body) = send(&app, get_request("/lessons")).await?;

        // THEN it is an internal error rather than an empty list
        assert_that!(status).is_equal_to(StatusCode::INTERNAL_SERVER_ERROR);
        assert_that!(body).is_equal_to(json!({ "errorMsg": "Database not ready" }));

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_place_order(lessons: Vec<Lesson>) -> Result<(), BoxError> {
        let database = MemoryDatabase::with_lessons(lessons);
        let app = app(database.clone());
        let order = json!({ "name": "Jo", "phone": "123", "lessonIDs": [1, 2], "quantity": 2 });

        let (status, body) = send(&app, json_request(Method::POST, "/order", order.clone())).await?;

        assert_that!(status).is_equal_to(StatusCode::OK);
        assert_that!(body).is_equal_to(json!({ "message": "Order placed successfully" }));
        let orders = database.orders()?;
        assert_that!(orders).has_length(1);
        assert_that!(serde_json::to_value(&orders[0].order)?).is_equal_to(order);

        Ok(())
    }

    #[rstest]
    #[case(json!({ "phone": "123", "lessonIDs": [1], "quantity": 1 }), "Missing required fields: name")]
    #[case(json!({}), "Missing required fields: name, phone, lessonIDs, quantity")]
    #[case(json!({ "name": "Jo", "phone": "123", "lessonIDs": "1", "quantity": 1 }), "lessonIDs must be an array")]
    #[case(json!({ "name": "Jo", "phone": "123", "lessonIDs": 1, "quantity": 1 }), "lessonIDs must be an array")]
    #[case(json!({ "name": "Jo", "phone": "123", "lessonIDs": [1], "quantity": "1" }), "quantity must be a number")]
    #[tokio::test]
    async fn test_place_order_rejected(
        #[case] order: Value,
        #[case] message: &str,
    ) -> Result<(), BoxError> {
        let database = MemoryDatabase::default();
        let app = app(database.clone());

        let (status, body) = send(&app, json_request(Method::POST, "/order", order)).await?;

        assert_that!(status).is_equal_to(StatusCode::BAD_REQUEST);
        assert_that!(body).is_equal_to(json!({ "errorMsg": message }));
        assert_that!(database.orders()?).is_empty();

        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_malformed_json() -> Result<(), BoxError> {
        let database = MemoryDatabase::default();
        let app = app(database.clone());
        let req = Request::builder()
            .method(Method::POST)
            .uri("/order")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))?;

        let (status, body) = send(&app, req).await?;

        assert_that!(status).is_equal_to(StatusCode::BAD_REQUEST);
        let message = body["errorMsg"].as_str().unwrap_or_default();
        assert_that!(message.starts_with("Invalid JSON body")).is_true();
        assert_that!(database.orders()?).is_empty();

        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_empty_body() -> Result<(), BoxError> {
        let app = app(MemoryDatabase::default());
        let req = Request::builder()
            .method(Method::POST)
            .uri("/order")
            .body(Body::empty())?;

        let (status, body) = send(&app, req).await?;

        assert_that!(status).is_equal_to(StatusCode::BAD_REQUEST);
        assert_that!(body).is_equal_to(json!({
            "errorMsg": "Missing required fields: name, phone, lessonIDs, quantity"
        }));

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_lesson(lessons: Vec<Lesson>) -> Result<(), BoxError> {
        // GIVEN lesson 5 with 5 spaces
        let app = app(MemoryDatabase::with_lessons(lessons.clone()));

        // WHEN setting its spaces to 3
        let (status, body) =
            send(&app, json_request(Method::PUT, "/lesson/5/spaces", json!({ "value": 3 }))).await?;

        // THEN
        // * the update is reported
        // * a later listing shows the new value and nothing else changed
        assert_that!(status).is_equal_to(StatusCode::OK);
        assert_that!(body).is_equal_to(json!({
            "message": "Lesson updated successfully",
            "result": {
                "acknowledged": true,
                "matchedCount": 1,
                "modifiedCount": 1,
                "upsertedCount": 0,
                "upsertedId": null,
            },
        }));

        let (_, listed) = send(&app, get_request("/lessons")).await?;
        let mut expected = serde_json::to_value(&lessons)?;
        expected[1]["spaces"] = json!(3);
        assert_that!(listed).is_equal_to(expected);

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_lesson_repeated(lessons: Vec<Lesson>) -> Result<(), BoxError> {
        let app = app(MemoryDatabase::with_lessons(lessons));
        let update = || json_request(Method::PUT, "/lesson/5/spaces", json!({ "value": 3 }));

        let (first, _) = send(&app, update()).await?;
        let (_, after_first) = send(&app, get_request("/lessons")).await?;
        let (second, _) = send(&app, update()).await?;
        let (_, after_second) = send(&app, get_request("/lessons")).await?;

        assert_that!(first).is_equal_to(StatusCode::OK);
        assert_that!(second).is_equal_to(StatusCode::OK);
        assert_that!(after_second).is_equal_to(after_first);

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_unknown_attribute(lessons: Vec<Lesson>) -> Result<(), BoxError> {
        let app = app(MemoryDatabase::with_lessons(lessons.clone()));

        let (status, body) = send(
            &app,
            json_request(Method::PUT, "/lesson/5/nonexistentField", json!({ "value": 3 })),
        )
        .await?;

        assert_that!(status).is_equal_to(StatusCode::BAD_REQUEST);
        assert_that!(body).is_equal_to(json!({ "errorMsg": "Invalid attribute: nonexistentField" }));
        let (_, listed) = send(&app, get_request("/lessons")).await?;
        assert_that!(listed).is_equal_to(serde_json::to_value(&lessons)?);

        Ok(())
    }

    #[rstest]
    #[case("/lesson/9999/spaces", "Lesson with id 9999 not found")]
    #[case("/lesson/abc/spaces", "Lesson with id abc not found")]
    #[tokio::test]
    async fn test_update_missing_lesson(
        lessons: Vec<Lesson>,
        #[case] uri: &str,
        #[case] message: &str,
    ) -> Result<(), BoxError> {
        let app = app(MemoryDatabase::with_lessons(lessons));

        let (status, body) = send(&app, json_request(Method::PUT, uri, json!({ "value": 3 }))).await?;

        assert_that!(status).is_equal_to(StatusCode::NOT_FOUND);
        assert_that!(body).is_equal_to(json!({ "errorMsg": message }));

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_lesson_hex_id(lessons: Vec<Lesson>) -> Result<(), BoxError> {
        // GIVEN lesson 5
        let app = app(MemoryDatabase::with_lessons(lessons));

        // WHEN addressing it as 0x5
        let (status, _) =
            send(&app, json_request(Method::PUT, "/lesson/0x5/spaces", json!({ "value": 1 }))).await?;

        // THEN lesson 5 is the one updated
        let (_, listed) = send(&app, get_request("/lessons")).await?;
        assert_that!(status).is_equal_to(StatusCode::OK);
        assert_that!(listed[1]["spaces"]).is_equal_to(json!(1));

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_without_value_sets_null(lessons: Vec<Lesson>) -> Result<(), BoxError> {
        let app = app(MemoryDatabase::with_lessons(lessons));

        let (status, _) = send(&app, json_request(Method::PUT, "/lesson/1/location", json!({}))).await?;
        let (_, listed) = send(&app, get_request("/lessons")).await?;

        assert_that!(status).is_equal_to(StatusCode::OK);
        assert_that!(listed[0]["location"]).is_equal_to(Value::Null);

        Ok(())
    }

    #[tokio::test]
    async fn test_disallowed_origin_is_rejected() -> Result<(), BoxError> {
        let app = app(MemoryDatabase::default());
        let req = Request::builder()
            .uri("/lessons")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())?;

        let (status, body) = send(&app, req).await?;

        assert_that!(status).is_equal_to(StatusCode::FORBIDDEN);
        assert_that!(body).is_equal_to(json!({ "errorMsg": "Not allowed by CORS" }));

        Ok(())
    }

    #[tokio::test]
    async fn test_allowed_origin_gets_cors_headers() -> Result<(), BoxError> {
        let app = app(MemoryDatabase::default());
        let req = Request::builder()
            .uri("/lessons")
            .header(header::ORIGIN, ALLOWED_ORIGIN)
            .body(Body::empty())?;

        let response = app.oneshot(req).await?;

        assert_that!(response.status()).is_equal_to(StatusCode::OK);
        assert_that!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()))
        .is_equal_to(Some(ALLOWED_ORIGIN));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_route() -> Result<(), BoxError> {
        let app = app(MemoryDatabase::default());

        let (status, body) = send(&app, get_request("/instructors")).await?;

        assert_that!(status).is_equal_to(StatusCode::NOT_FOUND);
        assert_that!(body).is_equal_to(json!({ "errorMsg": "Not found" }));

        Ok(())
    }

    #[rstest]
    #[case(Method::GET, "/order")]
    #[case(Method::DELETE, "/lessons")]
    #[case(Method::GET, "/lesson/5/spaces")]
    #[tokio::test]
    async fn test_wrong_method(#[case] method: Method, #[case] uri: &str) -> Result<(), BoxError> {
        let app = app(MemoryDatabase::default());
        let req = Request::builder().method(method).uri(uri).body(Body::empty())?;

        let (status, body) = send(&app, req).await?;

        assert_that!(status).is_equal_to(StatusCode::METHOD_NOT_ALLOWED);
        assert_that!(body).is_equal_to(json!({ "errorMsg": "Method not allowed" }));

        Ok(())
    }

    fn mock_app(database: MockDatabasePort) -> Router {
        router(
            DomainLogic::new(Arc::new(database)),
            OriginAllowList::default(),
        )
    }

    fn spaces_lesson() -> Lesson {
        serde_json::from_value(json!({ "id": 5, "spaces": 5 })).unwrap()
    }

    async fn send_raw(app: &Router, req: Request<Body>) -> Result<(StatusCode, String), BoxError> {
        let response = app.clone().oneshot(req).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, String::from_utf8(bytes.to_vec())?))
    }

    #[tokio::test]
    async fn test_place_order_store_failure() -> Result<(), BoxError> {
        // GIVEN a store whose insert fails with a detailed driver error
        let mut database = MockDatabasePort::new();
        database
            .expect_insert_order()
            .times(1)
            .returning(|_| Err(database::Error::Adapter("connection reset by 10.0.0.7".into())));
        let app = mock_app(database);
        let order = json!({ "name": "Jo", "phone": "123", "lessonIDs": [1], "quantity": 1 });

        // WHEN placing a valid order
        let (status, body) = send_raw(&app, json_request(Method::POST, "/order", order)).await?;

        // THEN
        // * the client gets a generic 500
        // * the driver detail stays out of the response
        assert_that!(status).is_equal_to(StatusCode::INTERNAL_SERVER_ERROR);
        assert_that!(serde_json::from_str::<Value>(&body)?)
            .is_equal_to(json!({ "errorMsg": "Internal server error" }));
        assert_that!(body.contains("10.0.0.7")).is_false();

        Ok(())
    }

    #[tokio::test]
    async fn test_update_lesson_store_failure() -> Result<(), BoxError> {
        // GIVEN lesson 5 whose update fails with a detailed driver error
        let mut database = MockDatabasePort::new();
        database
            .expect_find_lesson()
            .times(1)
            .returning(|_| Ok(Some(spaces_lesson())));
        database
            .expect_update_lesson_attribute()
            .times(1)
            .returning(|_, _, _| Err(database::Error::Adapter("write conflict on shard-2".into())));
        let app = mock_app(database);

        // WHEN updating its spaces
        let (status, body) = send_raw(
            &app,
            json_request(Method::PUT, "/lesson/5/spaces", json!({ "value": 3 })),
        )
        .await?;

        // THEN the client gets a generic 500 without the detail
        assert_that!(status).is_equal_to(StatusCode::INTERNAL_SERVER_ERROR);
        assert_that!(serde_json::from_str::<Value>(&body)?)
            .is_equal_to(json!({ "errorMsg": "Internal server error" }));
        assert_that!(body.contains("shard-2")).is_false();

        Ok(())
    }

    #[tokio::test]
    async fn test_list_lessons_store_failure() -> Result<(), BoxError> {
        let mut database = MockDatabasePort::new();
        database
            .expect_list_lessons()
            .times(1)
            .returning(|| Err(database::Error::Adapter("cursor killed".into())));
        let app = mock_app(database);

        let (status, body) = send_raw(&app, get_request("/lessons")).await?;

        assert_that!(status).is_equal_to(StatusCode::INTERNAL_SERVER_ERROR);
        assert_that!(serde_json::from_str::<Value>(&body)?)
            .is_equal_to(json!({ "errorMsg": "Internal server error" }));

        Ok(())
    }

    #[rstest]
    #[case(Method::POST, "/order", json!({ "name": "Jo", "phone": "123", "lessonIDs": [1], "quantity": 1 }))]
    #[case(Method::PUT, "/lesson/5/spaces", json!({ "value": 3 }))]
    #[tokio::test]
    async fn test_write_before_store_ready(
        #[case] method: Method,
        #[case] uri: &str,
        #[case] body: Value,
    ) -> Result<(), BoxError> {
        // GIVEN a store that has not connected yet
        let app = router(
            DomainLogic::new(Arc::new(LazyDatabase::new())),
            OriginAllowList::default(),
        );

        // WHEN writing
        let (status, body) = send(&app, json_request(method, uri, body)).await?;

        // THEN it is reported as not ready
        assert_that!(status).is_equal_to(StatusCode::INTERNAL_SERVER_ERROR);
        assert_that!(body).is_equal_to(json!({ "errorMsg": "Database not ready" }));

        Ok(())
    }
}
