use std::{collections::HashSet, sync::Arc, time::Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::errors::ApiError;

/// Origins allowed to call the API from a browser
#[derive(Clone, Debug, Default)]
pub struct OriginAllowList {
    origins: Arc<HashSet<String>>,
}

impl OriginAllowList {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: Arc::new(origins.into_iter().map(Into::into).collect()),
        }
    }

    pub fn permits(&self, origin: &HeaderValue) -> bool {
        origin
            .to_str()
            .map(|origin| self.origins.contains(origin))
            .unwrap_or(false)
    }

    /// CORS response headers for the allowed origins
    pub fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    }
}

/// Reject browser requests from origins outside the allow-list
///
/// Requests without an `Origin` header (curl, server-to-server) always pass.
pub async fn cors_gate(
    State(allow_list): State<OriginAllowList>,
    req: Request,
    next: Next,
) -> Response {
    match req.headers().get(header::ORIGIN) {
        Some(origin) if !allow_list.permits(origin) => {
            tracing::warn!(origin = ?origin, "rejected request from disallowed origin");
            ApiError::Forbidden("Not allowed by CORS").into_response()
        }
        _ => next.run(req).await,
    }
}

/// Log method, path, status and latency of every completed request
pub async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );
    response
}
