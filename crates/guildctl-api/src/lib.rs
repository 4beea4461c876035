// guildctl-api: Async Rust client for the Discord REST API (guild provisioning surface)

pub mod error;
pub mod rest;
pub mod transport;
pub mod types;

pub use error::Error;
pub use rest::RestClient;
pub use transport::TransportConfig;
