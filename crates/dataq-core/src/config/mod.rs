#[allow(clippy::module_inception)]
pub mod config;
pub mod credentials;
pub use config::{AzureConfig, ConfigError, DataqConfig};
pub use credentials::{BackendKind, Credentials, ProviderOptions};
