//! Short-link redirect: `/r/:id` answers with the stored content as `Location`

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use http::header::LOCATION;
use http::{HeaderValue, StatusCode};

use crate::http_server::api::bin::LookupError;
use crate::ServiceState;

#[tracing::instrument(skip_all)]
pub async fn handler(
    State(state): State<ServiceState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, LookupError> {
    let Path(id) = path?;
    let target = state.bins().redirect_target(&id).await?;

    // Content that cannot be a header value is not a redirect target
    let location = HeaderValue::from_str(&target).map_err(|_| {
        tracing::debug!(id = %id, "stored content is not a valid redirect target");
        LookupError::NotFound
    })?;

    Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
}
