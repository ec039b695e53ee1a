use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;

use minibin_daemon::http_server::api::client::ApiError;
use minibin_daemon::http_server::health::{LivezRequest, ReadyzRequest};
use minibin_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug)]
pub struct ConfigInfo {
    pub directory: PathBuf,
    pub initialized: bool,
    pub db_path: PathBuf,
    pub port: u16,
}

#[derive(Debug)]
pub enum EndpointStatus {
    Ok,
    Unhealthy(String),
    NotReachable,
}

impl<T> From<Result<T, ApiError>> for EndpointStatus {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(_) => EndpointStatus::Ok,
            Err(ApiError::HttpStatus(status, _)) => EndpointStatus::Unhealthy(status.to_string()),
            Err(_) => EndpointStatus::NotReachable,
        }
    }
}

#[derive(Debug)]
pub struct DaemonInfo {
    pub url: String,
    pub livez: EndpointStatus,
    pub readyz: EndpointStatus,
}

#[derive(Debug)]
pub struct HealthOutput {
    pub config: Option<ConfigInfo>,
    pub config_error: Option<String>,
    pub daemon: DaemonInfo,
}

impl fmt::Display for HealthOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", "Config".bold())?;
        match &self.config {
            Some(info) => {
                writeln!(
                    f,
                    "  {} {}",
                    "directory:".dimmed(),
                    info.directory.display()
                )?;
                if info.initialized {
                    writeln!(f, "  {} {}", "config.toml:".dimmed(), "OK".green())?;
                } else {
                    writeln!(
                        f,
                        "  {} {}",
                        "config.toml:".dimmed(),
                        "missing (defaults)".yellow()
                    )?;
                }
                writeln!(f, "  {} {}", "database:".dimmed(), info.db_path.display())?;
                writeln!(f, "  {} {}", "port:".dimmed(), info.port)?;
            }
            None => {
                if let Some(err) = &self.config_error {
                    writeln!(f, "  {} {}", "error:".red(), err)?;
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "{} ({}):", "Service".bold(), self.daemon.url)?;

        let status_str = |s: &EndpointStatus| -> String {
            match s {
                EndpointStatus::Ok => "OK".green().to_string(),
                EndpointStatus::Unhealthy(code) => format!("{} ({})", "UNHEALTHY".red(), code),
                EndpointStatus::NotReachable => "NOT REACHABLE".red().to_string(),
            }
        };

        writeln!(
            f,
            "  {} {}",
            "livez:".dimmed(),
            status_str(&self.daemon.livez)
        )?;
        write!(
            f,
            "  {} {}",
            "readyz:".dimmed(),
            status_str(&self.daemon.readyz)
        )
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = Infallible;
    type Output = HealthOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (config, config_error) = match AppState::load_or_default(ctx.config_path.clone()) {
            Ok(state) => (
                Some(ConfigInfo {
                    initialized: state.config_path.exists(),
                    directory: state.minibin_dir,
                    db_path: state.db_path,
                    port: state.config.port,
                }),
                None,
            ),
            Err(e) => (None, Some(e.to_string())),
        };

        let (livez, readyz) = futures::join!(
            ctx.client.call(LivezRequest {}),
            ctx.client.call(ReadyzRequest {})
        );

        Ok(HealthOutput {
            config,
            config_error,
            daemon: DaemonInfo {
                url: ctx.client.base_url().to_string(),
                livez: livez.into(),
                readyz: readyz.into(),
            },
        })
    }
}
