//! Service lifecycle: logging setup, binding, serving and shutdown.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::http_server;
use crate::service_config::Config;
use crate::service_state::{State, StateSetupError};

const LOG_FILE_PREFIX: &str = "minibin.log";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("state setup failed: {0}")]
    State(#[from] StateSetupError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Signals a running service to stop accepting connections and drain
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, rx)
    }

    pub fn shutdown(&self) {
        // No receivers left means the server is already gone
        let _ = self.tx.send(true);
    }
}

/// A service bound to a socket and serving on a background task
pub struct RunningService {
    pub local_addr: SocketAddr,
    pub state: State,
    shutdown: ShutdownHandle,
    task: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningService {
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Stop the server and wait for in-flight requests to finish
    pub async fn stop(self) -> Result<(), ServiceError> {
        self.shutdown.shutdown();
        self.task.await??;
        Ok(())
    }

    /// Wait for the server task to end on its own
    pub async fn wait(self) -> Result<(), ServiceError> {
        self.task.await??;
        Ok(())
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. The returned guard flushes the
/// log file on drop and must be held for the life of the process.
pub fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string().to_lowercase()));

    let (file_layer, guard) = match config.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init();

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }

    guard
}

/// Build state, bind the listener and start serving in the background.
///
/// Binding happens before this returns, so `local_addr` is usable right
/// away (port 0 picks a free port).
pub async fn start_service(config: &Config) -> Result<RunningService, ServiceError> {
    let state = State::from_config(config).await?;

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .map_err(|source| ServiceError::Bind {
            addr: config.listen_addr,
            source,
        })?;
    let local_addr = listener.local_addr()?;

    let router = http_server::router(state.clone(), config.static_dir.as_deref());
    let (shutdown, mut rx) = ShutdownHandle::new();

    let task = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while rx.changed().await.is_ok() {
                    if *rx.borrow() {
                        break;
                    }
                }
            })
            .await
    });

    tracing::info!("minibin listening on {}", local_addr);

    Ok(RunningService {
        local_addr,
        state,
        shutdown,
        task,
    })
}

/// Run the service until ctrl-c, then shut down gracefully
pub async fn spawn_service(config: &Config) -> Result<(), ServiceError> {
    let _guard = init_tracing(config);

    let service = start_service(config).await?;
    let handle = service.shutdown_handle();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("received ctrl-c, shutting down");
        handle.shutdown();
    });

    service.wait().await?;
    tracing::info!("minibin stopped");
    Ok(())
}
