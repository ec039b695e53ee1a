//! `GET /bin/:id`

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::bin::Bin;

use super::LookupError;
use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBinRequest {
    pub id: String,
}

#[tracing::instrument(skip_all)]
pub async fn handler(
    State(state): State<ServiceState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, LookupError> {
    let Path(id) = path?;
    let bin = state.bins().get(&id).await?;
    Ok((StatusCode::OK, Json(bin)))
}

impl ApiRequest for GetBinRequest {
    type Response = Bin;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let mut url = base_url.clone();
        url.set_path(&format!("/bin/{}", self.id));
        client.get(url)
    }
}
