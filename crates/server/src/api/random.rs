//! Daily random algorithm handlers.

use std::sync::Arc;

use axum::{extract::State, response::Response};
use cubealg_core::AlgorithmFamily;
use tracing::debug;

use super::response::{json_body, ApiError};
use crate::state::AppState;

/// GET /v1/randomPLL/
pub async fn random_pll(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    random_algorithm(&state, AlgorithmFamily::Pll).await
}

/// GET /v1/randomOLL/
pub async fn random_oll(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    random_algorithm(&state, AlgorithmFamily::Oll).await
}

/// Serve the family's current daily pick.
async fn random_algorithm(state: &AppState, family: AlgorithmFamily) -> Result<Response, ApiError> {
    let id = state.selectors().pick(family);
    debug!(family = family.as_str(), id, "Serving daily random algorithm");

    let algorithm = state
        .repository()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Error Fetching random Algorithm".to_string()))?;

    json_body(&algorithm)
}
