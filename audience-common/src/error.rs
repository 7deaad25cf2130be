//! Common error types for Audience

use thiserror::Error;

/// Common result type for Audience operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the Audience crates
#[derive(Error, Debug)]
pub enum Error {
    /// Config file missing, unreadable or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML file could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
