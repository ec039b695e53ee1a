//! `POST /bin`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::bin::Bin;
use common::short_id::ShortId;

use crate::bin_service::CreateBinError;
use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBinRequest {
    /// Opaque content, usually base64 ciphertext or a URL
    pub content: String,
    /// Highlighting hint, stored as-is
    #[serde(default)]
    pub language: String,
    /// Client-side initialization vector; empty for unencrypted bins
    #[serde(default)]
    pub iv: String,
}

impl From<CreateBinRequest> for Bin {
    fn from(req: CreateBinRequest) -> Self {
        Bin::new(req.content, req.language, req.iv)
    }
}

impl From<Bin> for CreateBinRequest {
    fn from(bin: Bin) -> Self {
        Self {
            content: bin.content,
            language: bin.language,
            iv: bin.iv,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBinResponse {
    pub id: ShortId,
}

#[tracing::instrument(skip_all)]
pub async fn handler(
    State(state): State<ServiceState>,
    payload: Result<Json<CreateBinRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CreateError> {
    let Json(req) = payload?;
    let created = state.bins().create(&Bin::from(req)).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBinResponse { id: created.id }),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("request body too large")]
    PayloadTooLarge,
    #[error(transparent)]
    Bin(#[from] CreateBinError),
}

impl From<JsonRejection> for CreateError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            CreateError::PayloadTooLarge
        } else {
            CreateError::Validation(rejection.body_text())
        }
    }
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        match self {
            CreateError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Bad request: {}", msg),
            )
                .into_response(),
            CreateError::PayloadTooLarge | CreateError::Bin(CreateBinError::TooLarge { .. }) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Content too large".to_string(),
            )
                .into_response(),
            CreateError::Bin(CreateBinError::Exhausted { .. })
            | CreateError::Bin(CreateBinError::Store(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
            )
                .into_response(),
        }
    }
}

impl ApiRequest for CreateBinRequest {
    type Response = CreateBinResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let mut url = base_url.clone();
        url.set_path("/bin");
        client.post(url).json(&self)
    }
}
