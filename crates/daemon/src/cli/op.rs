use std::fmt::Display;
use std::path::PathBuf;

use url::Url;

use minibin_daemon::http_server::api::client::{ApiClient, ApiError};

/// Shared inputs for every command
#[derive(Debug, Clone)]
pub struct OpContext {
    pub client: ApiClient,
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    pub fn new(remote: &Url, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        Ok(Self {
            client: ApiClient::new(remote)?,
            config_path,
        })
    }
}

/// A CLI command: runs against the context and renders its output
#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;
    type Output: Display + Send;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}
