pub mod create;
pub mod get;
pub mod health;
pub mod init;
pub mod serve;
pub mod version;

pub use create::Create;
pub use get::Get;
pub use health::Health;
pub use init::Init;
pub use serve::Serve;
pub use version::Version;
