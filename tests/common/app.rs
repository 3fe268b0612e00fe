//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use tonewalk::models::{AppConfig, ReconfigureConfig};
use tonewalk::server::{build_router, create_app_state, AppState};
use tonewalk::services::{EngineParams, EventBus, ReconfigurationController, ToneEngine};

/// Test application with router and direct access to services
pub struct TestApp {
    router: axum::Router,
    pub engine: Arc<ToneEngine>,
    pub events: EventBus,
    pub reconfigure: ReconfigurationController<EngineParams>,
}

impl TestApp {
    /// Create a new test application with default settings and no debounce
    pub fn new() -> Self {
        Self::with_config(AppConfig {
            reconfigure: ReconfigureConfig { debounce_ms: 0 },
            ..AppConfig::default()
        })
    }

    /// Create a test application from an explicit configuration
    pub fn with_config(config: AppConfig) -> Self {
        let state = create_app_state(config);

        // Keep references for test assertions
        let engine = state.engine.clone();
        let events = state.events.clone();
        let reconfigure = state.reconfigure.clone();

        // Build router using shared server module (same as production)
        let router = build_router(state);

        Self {
            router,
            engine,
            events,
            reconfigure,
        }
    }

    /// Create application state for custom router configuration
    pub fn create_state() -> AppState {
        create_app_state(AppConfig::default())
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request without a body
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request(Request::post(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with a raw body
    pub async fn post_bytes(&self, path: &str, content_type: &str, body: Vec<u8>) -> TestResponse {
        let request = Request::post(path)
            .header("Content-Type", content_type)
            .body(Body::from(body))
            .unwrap();
        self.request(request).await
    }

    /// Upload a PNG image
    pub async fn upload_png(&self, png: Vec<u8>) -> TestResponse {
        self.post_bytes("/api/image", "image/png", png).await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::post(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// Make a PUT request with JSON body
    pub async fn put_json(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::put(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Wait until no rebuild is running, pending or deferred
    pub async fn settle(&self) {
        for _ in 0..300 {
            if self.reconfigure.is_settled() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Reconfiguration did not settle");
    }

    /// Send `count` samples of `magnitude` meters, returning the last response
    pub async fn walk(&self, magnitude: f64, count: usize) -> TestResponse {
        let body = format!(r#"{{"magnitude": {magnitude}}}"#);
        let mut last = None;
        for _ in 0..count {
            last = Some(self.post_json("/api/movement", &body).await);
        }
        last.expect("walk needs at least one sample")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Check if response is a PNG image
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && &self.body[0..8] == b"\x89PNG\r\n\x1a\n"
    }
}
