//! Response envelope shared by the algorithm handlers.
//!
//! Successful responses are the bare serialized record or list. Failures use
//! `{"status": "fail", "data": ...}` where `data` is `{"title": ...}` for a
//! missing record and a plain message for internal errors.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cubealg_core::RepositoryError;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub struct FailResponse {
    pub status: &'static str,
    pub data: FailData,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FailData {
    Title { title: String },
    Message(String),
}

impl FailResponse {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            status: "fail",
            data: FailData::Title {
                title: title.into(),
            },
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "fail",
            data: FailData::Message(message.into()),
        }
    }
}

/// Handler failure, mapped to a status code and fail envelope.
#[derive(Debug)]
pub enum ApiError {
    /// Nothing matched; carries the title shown to the client.
    NotFound(String),
    /// The store query failed.
    Store(RepositoryError),
    /// The record could not be serialized.
    Serialization(serde_json::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(title) => {
                (StatusCode::NOT_FOUND, Json(FailResponse::title(title))).into_response()
            }
            ApiError::Store(e) => {
                warn!(error = %e, "Algorithm store query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(FailResponse::message(e.to_string())),
                )
                    .into_response()
            }
            ApiError::Serialization(e) => {
                error!(error = %e, "Failed to serialize algorithm");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(FailResponse::message(format!(
                        "Unable to fetch algorithm: {}",
                        e
                    ))),
                )
                    .into_response()
            }
        }
    }
}

/// Serialize `value` as the raw JSON body of a 200 response.
pub fn json_body<T: Serialize>(value: &T) -> Result<Response, ApiError> {
    let body = serde_json::to_vec(value).map_err(ApiError::Serialization)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
