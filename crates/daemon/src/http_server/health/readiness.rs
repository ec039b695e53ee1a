use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyzRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyzResponse {
    pub status: String,
}

impl ApiRequest for ReadyzRequest {
    type Response = ReadyzResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let mut url = base_url.clone();
        url.set_path("/_status/readyz");
        client.get(url)
    }
}

/// Ready once the database answers a query. A failure here means requests
/// touching bins would 500.
#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> Response {
    match state.database().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyzResponse {
                status: "ok".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyzResponse {
                    status: "unavailable".to_string(),
                }),
            )
                .into_response()
        }
    }
}
