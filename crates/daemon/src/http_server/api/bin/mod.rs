//! Bin create/read endpoints

use axum::extract::rejection::PathRejection;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::bin_service::GetBinError;

pub mod create;
pub mod get;

// Re-export request/response types for use by the CLI and other clients
pub use create::{CreateBinRequest, CreateBinResponse, CreateError};
pub use get::GetBinRequest;

/// Failure of any endpoint that looks a bin up by id.
///
/// Absent ids, malformed ids and undecodable paths all produce the same
/// response.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("bin not found")]
    NotFound,
    #[error("storage error")]
    Storage,
}

impl From<GetBinError> for LookupError {
    fn from(err: GetBinError) -> Self {
        match err {
            GetBinError::NotFound => LookupError::NotFound,
            GetBinError::Store(_) => LookupError::Storage,
        }
    }
}

impl From<PathRejection> for LookupError {
    fn from(_: PathRejection) -> Self {
        LookupError::NotFound
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        match self {
            LookupError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            LookupError::Storage => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected error").into_response()
            }
        }
    }
}
