// Service modules
pub mod bin_service;
pub mod database;
pub mod http_server;
pub mod process;
pub mod service_config;
pub mod service_state;

// App state (configuration, paths)
pub mod state;

// Re-exports for consumers
pub use bin_service::{BinService, CreateBinError, CreatedBin, GetBinError};
pub use database::{BinRecord, BinStoreError, Database, DatabaseSetupError};
pub use process::{spawn_service, start_service, RunningService, ServiceError, ShutdownHandle};
pub use service_config::Config as ServiceConfig;
pub use service_state::State as ServiceState;
pub use state::{AppConfig, AppState, StateError};

/// Build info for the daemon package itself
pub fn build_info() -> common::version::BuildInfo {
    common::build_info!()
}
