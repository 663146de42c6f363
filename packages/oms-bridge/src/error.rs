//! Configuration and startup errors of the bridge binary.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid OMS URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store client error: {0}")]
    Client(#[from] oms_client::Error),

    #[error("Address space error: {0}")]
    AddressSpace(#[from] oms_address_space::BridgeError),
}
