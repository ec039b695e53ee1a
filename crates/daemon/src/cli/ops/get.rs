use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;
use url::Url;

use common::bin::Bin;
use common::crypto::{CryptoError, SecretKey};
use minibin_daemon::http_server::api::client::ApiError;

#[derive(Args, Debug, Clone)]
pub struct Get {
    /// Bin id, or a share link like `https://host/<id>?key=...`
    pub target: String,

    /// Decryption key (the `key` parameter of a share link)
    #[arg(long, short)]
    pub key: Option<String>,

    /// Print where the short link /r/<id> redirects instead of the bin
    #[arg(long)]
    pub redirect: bool,

    /// Print the bin as stored, as JSON, without decrypting
    #[arg(long, conflicts_with = "redirect")]
    pub json: bool,
}

#[derive(Debug)]
pub enum GetOutput {
    Bin { bin: Bin, decrypted: bool },
    Json(String),
    Redirect(String),
}

impl fmt::Display for GetOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GetOutput::Bin { bin, decrypted } => {
                write!(f, "{} {}", "Language:".dimmed(), bin.language.bold())?;
                if *decrypted {
                    write!(f, "  {}", "(decrypted)".cyan())?;
                }
                writeln!(f)?;
                write!(f, "{}", bin.content)
            }
            GetOutput::Json(json) => write!(f, "{json}"),
            GetOutput::Redirect(target) => write!(f, "{target}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error("bin {0} not found")]
    NotFound(String),
    #[error("API error: {0}")]
    Api(ApiError),
    #[error("failed to encode bin: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bin {0} is encrypted, pass --key or the full share link")]
    MissingKey(String),
    #[error("invalid key: {0}")]
    InvalidKey(CryptoError),
    #[error("could not decrypt bin: {0}")]
    Decrypt(CryptoError),
}

/// Id and optional key named by a `get` target
#[derive(Debug, PartialEq, Eq)]
struct Target {
    id: String,
    key: Option<String>,
}

impl Target {
    /// A bare id, or a page link `<remote>/<id>[?key=...]`. Short links
    /// (`/r/<id>`) and API links (`/bin/<id>`) resolve to the same id.
    fn parse(raw: &str) -> Self {
        let url = match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                return Self {
                    id: raw.to_string(),
                    key: None,
                }
            }
        };

        let id = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .unwrap_or_default()
            .to_string();
        let key = url
            .query_pairs()
            .find(|(name, _)| name == "key")
            .map(|(_, value)| value.into_owned());

        Self { id, key }
    }
}

fn lookup_error(id: &str, err: ApiError) -> GetError {
    if err.is_not_found() {
        GetError::NotFound(id.to_string())
    } else {
        GetError::Api(err)
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Get {
    type Error = GetError;
    type Output = GetOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let target = Target::parse(&self.target);
        let id = target.id.as_str();

        if self.redirect {
            let location = ctx
                .client
                .resolve_redirect(id)
                .await
                .map_err(|e| lookup_error(id, e))?;
            return Ok(GetOutput::Redirect(location));
        }

        let mut bin = ctx
            .client
            .get_bin(id)
            .await
            .map_err(|e| lookup_error(id, e))?;

        if self.json {
            return Ok(GetOutput::Json(serde_json::to_string_pretty(&bin)?));
        }

        if !bin.is_encrypted() {
            return Ok(GetOutput::Bin {
                bin,
                decrypted: false,
            });
        }

        let key = self
            .key
            .as_deref()
            .or(target.key.as_deref())
            .ok_or_else(|| GetError::MissingKey(id.to_string()))?;
        let key = SecretKey::from_link_param(key).map_err(GetError::InvalidKey)?;

        bin.content = bin.decrypt(&key).map_err(GetError::Decrypt)?;
        bin.iv.clear();

        Ok(GetOutput::Bin {
            bin,
            decrypted: true,
        })
    }
}
