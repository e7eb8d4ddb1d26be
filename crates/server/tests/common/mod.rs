//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! backed by an in-memory algorithm repository and a manual clock, so
//! handler and daily-pick behavior can be exercised without a document store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use cubealg_core::testing::{ManualClock, MockAlgorithmRepository};
use cubealg_core::{AlgorithmRepository, RandomSelectors, SelectorConfig};
use cubealg_server::api::create_router;
use cubealg_server::state::AppState;

/// Re-export fixtures for test convenience
pub use cubealg_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_lookup() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.get("/v1/algorithm/Ua%20Perm").await;
///
///     assert_eq!(response.status, 200);
///     assert_eq!(response.body["id"], 5);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock repository - configure served algorithms and failures
    pub repository: Arc<MockAlgorithmRepository>,
    /// Manual clock - advance to expire daily picks
    pub clock: Arc<ManualClock>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture serving the full PLL and OLL catalog.
    pub fn new() -> Self {
        Self::with_algorithms(fixtures::catalog())
    }

    /// Create a fixture serving the given algorithms with default selectors.
    pub fn with_algorithms(algorithms: Vec<cubealg_core::Algorithm>) -> Self {
        Self::with_selector_config(algorithms, SelectorConfig::default())
    }

    /// Create a fixture with custom selector settings.
    pub fn with_selector_config(
        algorithms: Vec<cubealg_core::Algorithm>,
        selector_config: SelectorConfig,
    ) -> Self {
        let repository = Arc::new(MockAlgorithmRepository::with_algorithms(algorithms));
        let clock = Arc::new(ManualClock::starting_now());

        let selectors = RandomSelectors::new(&selector_config, clock.clone());
        let state = Arc::new(AppState::new(
            repository.clone() as Arc<dyn AlgorithmRepository>,
            selectors,
        ));

        Self {
            router: create_router(state),
            repository,
            clock,
        }
    }

    /// Make a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, &[]).await
    }

    /// Make a request with arbitrary method and headers.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            text,
            body,
        }
    }
}
