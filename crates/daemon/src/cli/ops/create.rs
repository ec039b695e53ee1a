use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;
use tokio::io::AsyncReadExt;
use url::Url;

use common::bin::Bin;
use common::crypto::{CryptoError, SecretKey};
use common::short_id::ShortId;
use minibin_daemon::http_server::api::client::ApiError;

#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Content to store; read from --file or stdin when omitted
    pub content: Option<String>,

    /// Read content from a file
    #[arg(long, short, conflicts_with = "content")]
    pub file: Option<PathBuf>,

    /// Language tag used for highlighting
    #[arg(long, short, default_value = "none")]
    pub language: String,

    /// Initialization vector, for content that is already encrypted
    #[arg(long, default_value = "", conflicts_with = "encrypt")]
    pub iv: String,

    /// Encrypt locally with a fresh key; the key only appears in the printed link
    #[arg(long, short)]
    pub encrypt: bool,
}

#[derive(Debug)]
pub struct CreateOutput {
    pub id: ShortId,
    /// Web page for the bin; includes `?key=` for encrypted bins
    pub link: Url,
    pub url: Url,
    pub short_link: Url,
    pub encrypted: bool,
}

impl fmt::Display for CreateOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.encrypted {
            writeln!(
                f,
                "{} bin {} {}",
                "Created".green().bold(),
                self.id.bold(),
                "(encrypted)".cyan()
            )?;
        } else {
            writeln!(f, "{} bin {}", "Created".green().bold(), self.id.bold())?;
        }
        writeln!(f, "  {} {}", "link:".dimmed(), self.link)?;
        writeln!(f, "  {} {}", "api:".dimmed(), self.url)?;
        write!(f, "  {} {}", "short link:".dimmed(), self.short_link)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to read content: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encrypt content: {0}")]
    Crypto(#[from] CryptoError),
    #[error("refusing to store an empty bin")]
    Empty,
}

impl Create {
    async fn read_content(&self) -> Result<String, CreateError> {
        if let Some(ref content) = self.content {
            return Ok(content.clone());
        }
        if let Some(ref path) = self.file {
            return Ok(tokio::fs::read_to_string(path).await?);
        }

        let mut content = String::new();
        tokio::io::stdin().read_to_string(&mut content).await?;
        Ok(content)
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Create {
    type Error = CreateError;
    type Output = CreateOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let content = self.read_content().await?;
        if content.is_empty() {
            return Err(CreateError::Empty);
        }

        let (bin, key) = if self.encrypt {
            let key = SecretKey::generate();
            (Bin::encrypt(&content, self.language.clone(), &key)?, Some(key))
        } else {
            (Bin::new(content, self.language.clone(), self.iv.clone()), None)
        };

        let encrypted = bin.is_encrypted();
        let id = ctx.client.create_bin(bin).await?;

        Ok(CreateOutput {
            link: ctx.client.page_link(id.as_str(), key.as_ref()),
            url: ctx.client.bin_url(id.as_str()),
            short_link: ctx.client.short_link(id.as_str()),
            id,
            encrypted,
        })
    }
}
