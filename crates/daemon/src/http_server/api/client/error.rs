use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("server returned {0}: {1}")]
    HttpStatus(StatusCode, String),
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// The server answered, but with a 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::HttpStatus(status, _) if *status == StatusCode::NOT_FOUND)
    }
}
