use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::metrics_middleware;
use super::{algorithms, handlers, random};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Liveness
        .route("/v1/", get(handlers::root))
        // Lookups
        .route("/v1/algorithm/{name}", get(algorithms::get_algorithm))
        .route(
            "/v1/algorithmCategory/{category}",
            get(algorithms::list_category),
        )
        // Daily random picks
        .route("/v1/randomPLL/", get(random::random_pll))
        .route("/v1/randomOLL/", get(random::random_oll))
        // Observability
        .route("/metrics", get(handlers::metrics))
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Any origin, with the header and method lists browser clients already rely on.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([
            HeaderName::from_static("x-requested-with"),
            header::AUTHORIZATION,
            header::ORIGIN,
        ])
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::OPTIONS,
            Method::PATCH,
            Method::CONNECT,
        ])
}
