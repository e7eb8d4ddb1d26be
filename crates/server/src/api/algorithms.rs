//! Algorithm lookup handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Response,
};

use super::response::{json_body, ApiError};
use crate::state::AppState;

/// GET /v1/algorithm/{name}
///
/// Look up a single algorithm by its exact name.
pub async fn get_algorithm(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let algorithm = state
        .repository()
        .find_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Algorithm \"{}\" not found", name)))?;

    json_body(&algorithm)
}

/// GET /v1/algorithmCategory/{category}
///
/// List every algorithm in a category. An empty category is a 404.
pub async fn list_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Response, ApiError> {
    let algorithms = state.repository().find_by_category(&category).await?;

    if algorithms.is_empty() {
        return Err(ApiError::NotFound(format!(
            "Algorithm Category \"{}\" not found",
            category
        )));
    }

    json_body(&algorithms)
}
