//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, timeout, CORS, request ID)
//! - Bind server to listener
//! - Hand each request a snapshot of the live route table

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, Method, Uri},
    routing::any,
    Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::http::dispatch::{dispatch, DispatchResponse, CORS_HEADERS};
use crate::routing::SharedRouteTable;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: SharedRouteTable,
}

/// HTTP front end for the mock route table.
pub struct MockServer {
    router: Router,
}

impl MockServer {
    /// Create a server answering from `routes`.
    pub fn new(routes: SharedRouteTable) -> Self {
        Self::with_timeout(routes, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(routes: SharedRouteTable, request_timeout: Duration) -> Self {
        let state = AppState { routes };
        Self {
            router: Self::build_router(state, request_timeout),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, request_timeout: Duration) -> Router {
        let routes = Router::new()
            .route("/{*path}", any(mock_handler))
            .route("/", any(mock_handler))
            .fallback(mock_handler)
            .with_state(state);
        with_middleware(routes, request_timeout)
    }

    /// The configured router, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Timeout, CORS, tracing and request-ID layers.
///
/// CORS headers sit outside the timeout so a 408 carries them too.
#[allow(deprecated)]
fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    let router = router.layer(TimeoutLayer::new(request_timeout));
    let router = CORS_HEADERS.into_iter().fold(router, |router, (name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ))
    });
    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Dispatch one request against the table installed right now.
async fn mock_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> DispatchResponse {
    let table = state.routes.load();
    dispatch(&table, &method, &uri, &headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RouteSpec, ServerConfig};
    use crate::routing::RouteTable;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    fn shared(routes: Vec<RouteSpec>) -> SharedRouteTable {
        SharedRouteTable::new(RouteTable::build(&ServerConfig {
            routes,
            ..Default::default()
        }))
    }

    fn get(path: &str, data: serde_json::Value) -> RouteSpec {
        RouteSpec {
            path: path.into(),
            method: "GET".into(),
            status: 200,
            data,
            ..Default::default()
        }
    }

    async fn call(router: Router, method: Method, uri: &str) -> (StatusCode, HeaderMap, String) {
        let response = router
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_routes_through_middleware() {
        let router = MockServer::new(shared(vec![get("/a/b", json!({ "deep": true }))])).into_router();

        let (status, headers, body) = call(router.clone(), Method::GET, "/a/b").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"deep":true}"#);
        assert!(headers.contains_key("x-request-id"));

        let (status, _, body) = call(router.clone(), Method::OPTIONS, "/whatever").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(body.is_empty());

        let (status, _, body) = call(router, Method::DELETE, "/a/b").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, "[DELETE] Method Not Allowed");
    }

    #[tokio::test]
    async fn test_install_visible_to_next_request() {
        let routes = shared(vec![get("/v", json!({ "v": 1 }))]);
        let router = MockServer::new(routes.clone()).into_router();

        let (_, _, body) = call(router.clone(), Method::GET, "/v").await;
        assert_eq!(body, r#"{"v":1}"#);

        routes.install(RouteTable::build(&ServerConfig {
            routes: vec![get("/v", json!({ "v": 2 }))],
            ..Default::default()
        }));

        let (_, _, body) = call(router, Method::GET, "/v").await;
        assert_eq!(body, r#"{"v":2}"#);
    }

    #[tokio::test]
    async fn test_timeout_response_carries_cors() {
        let slow = Router::new().route(
            "/slow",
            any(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let router = with_middleware(slow, Duration::from_millis(20));

        let (status, headers, body) = call(router, Method::GET, "/slow").await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert!(body.is_empty());
        for (name, value) in CORS_HEADERS {
            assert_eq!(headers.get(&name).unwrap(), value, "{name}");
        }
    }

    #[tokio::test]
    async fn test_root_paths() {
        let router = MockServer::new(shared(vec![get("/a", json!({}))])).into_router();

        let (status, headers, body) = call(router.clone(), Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");

        let (status, _, _) = call(router, Method::GET, "/?page=2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
