pub mod bin;
pub mod client;
