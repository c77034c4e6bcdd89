//! Request dispatch against the live route table.
//!
//! # Responsibilities
//! - Attach permissive CORS headers to every response
//! - Short-circuit `OPTIONS` preflight with 202
//! - Map lookup outcomes to 200-style mock responses, 404 or 405
//! - Log request and response metadata
//!
//! # Design Decisions
//! - Pure function of (table, request parts); the handler only supplies a snapshot
//! - Only the exact target `/` reaches the root path; `/?q` is 404
//! - Bodies are serialized per request from the configured JSON value

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::routing::{Lookup, RouteResponse, RouteTable};

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

pub(crate) const CORS_HEADERS: [(HeaderName, &str); 5] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "*"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "*"),
    (header::ACCESS_CONTROL_EXPOSE_HEADERS, "*"),
];

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to serialize response data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Status, headers and body produced for one request.
#[derive(Debug, Clone)]
pub struct DispatchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl DispatchResponse {
    fn new(status: StatusCode) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in CORS_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }
        Self {
            status,
            headers,
            body: Bytes::new(),
        }
    }

    fn text(status: StatusCode, body: String) -> Self {
        let mut response = Self::new(status);
        response.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response.body = Bytes::from(body);
        response
    }

    fn not_found() -> Self {
        Self::text(StatusCode::NOT_FOUND, "Not Found".to_string())
    }

    /// Answer for data that cannot be serialized: status line and CORS
    /// headers only, as if the handler returned before writing.
    fn abandoned(request_id: &str, error: DispatchError) -> Self {
        tracing::error!(request_id = %request_id, error = %error, "Response abandoned");
        Self::new(StatusCode::OK)
    }

    fn method_not_allowed(method: &Method) -> Self {
        Self::text(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("[{}] Method Not Allowed", method),
        )
    }

    fn json(route: &RouteResponse) -> Result<Self, DispatchError> {
        let body = serde_json::to_vec(&route.data)?;
        let status = StatusCode::from_u16(route.status).unwrap_or_else(|_| {
            tracing::warn!(status = route.status, "Configured status is not representable, sending 500");
            StatusCode::INTERNAL_SERVER_ERROR
        });

        let mut response = Self::new(status);
        response.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        );
        response.body = Bytes::from(body);
        Ok(response)
    }
}

impl IntoResponse for DispatchResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Answer one request from `table`.
pub fn dispatch(table: &RouteTable, method: &Method, uri: &Uri, headers: &HeaderMap) -> DispatchResponse {
    if method == Method::OPTIONS {
        return DispatchResponse::new(StatusCode::ACCEPTED);
    }

    let path = uri.path();
    let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or(path);
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info!(
        request_id = %request_id,
        method = %method,
        target = %target,
        headers = ?headers,
        "Request received"
    );

    let response = if path == "/" && target != "/" {
        DispatchResponse::not_found()
    } else {
        match table.lookup(method, path) {
            Lookup::Matched { path: pattern, response, params } => {
                if !params.is_empty() {
                    tracing::debug!(request_id = %request_id, pattern = %pattern, params = ?params, "Path parameters");
                }
                DispatchResponse::json(response).unwrap_or_else(|e| DispatchResponse::abandoned(request_id, e))
            }
            Lookup::MethodNotAllowed => DispatchResponse::method_not_allowed(method),
            Lookup::NotFound if path == "/" && !table.has_root_path() => {
                DispatchResponse::new(StatusCode::OK)
            }
            Lookup::NotFound => DispatchResponse::not_found(),
        }
    };

    tracing::info!(
        request_id = %request_id,
        status = response.status.as_u16(),
        body = %String::from_utf8_lossy(&response.body),
        "Response sent"
    );
    response
}
