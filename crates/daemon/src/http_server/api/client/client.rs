use reqwest::header::{HeaderMap, HeaderValue, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use url::Url;

use common::bin::Bin;
use common::crypto::SecretKey;
use common::short_id::ShortId;

use super::error::ApiError;
use super::ApiRequest;
use crate::http_server::api::bin::{CreateBinRequest, CreateBinResponse, GetBinRequest};

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

impl ApiClient {
    /// Redirects are not followed, so short links can be inspected rather
    /// than chased
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(default_headers)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client);
        let response = request_builder.send().await?;

        if response.status().is_success() {
            Ok(response.json::<T::Response>().await?)
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    /// Store a bin and return its id
    pub async fn create_bin(&self, bin: Bin) -> Result<ShortId, ApiError> {
        let response: CreateBinResponse = self.call(CreateBinRequest::from(bin)).await?;
        Ok(response.id)
    }

    /// Fetch a bin by id
    pub async fn get_bin(&self, id: &str) -> Result<Bin, ApiError> {
        self.call(GetBinRequest { id: id.to_string() }).await
    }

    /// Where the short link `/r/<id>` points, without following it
    pub async fn resolve_redirect(&self, id: &str) -> Result<String, ApiError> {
        let url = self.short_link(id);
        let response = self.client.get(url).send().await?;

        if response.status() != StatusCode::FOUND {
            return Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ));
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Other("redirect without a Location header".to_string()))
    }

    /* Getters */

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Public short link for a bin, `<remote>/r/<id>`
    pub fn short_link(&self, id: &str) -> Url {
        let mut url = self.remote.clone();
        url.set_path(&format!("/r/{}", id));
        url
    }

    /// Web client page for a bin, `<remote>/<id>`, carrying `?key=` when the
    /// bin is encrypted. The key never reaches the service.
    pub fn page_link(&self, id: &str, key: Option<&SecretKey>) -> Url {
        let mut url = self.remote.clone();
        url.set_path(&format!("/{}", id));
        url.set_query(key.map(|k| format!("key={}", k.to_link_param())).as_deref());
        url
    }

    /// API location of a bin, `<remote>/bin/<id>`
    pub fn bin_url(&self, id: &str) -> Url {
        let mut url = self.remote.clone();
        url.set_path(&format!("/bin/{}", id));
        url
    }
}
