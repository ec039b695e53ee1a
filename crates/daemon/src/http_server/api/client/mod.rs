//! Typed client for the daemon's HTTP API.
//!
//! Each endpoint module defines a request type implementing [`ApiRequest`];
//! [`ApiClient::call`] sends it and decodes the matching response type.

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

#[allow(clippy::module_inception)]
mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder;
}
