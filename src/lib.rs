pub mod aws;
pub mod config;
pub mod crypto;
pub mod error;
pub mod functions;
pub mod metrics;
pub mod notify;
pub mod store;
pub mod vehicle;

pub use config::{LoggerConfig, NotifierConfig};
pub use error::TelemetryError;
pub use store::{TokenCache, TokenPair};
