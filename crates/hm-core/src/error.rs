use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration key that no field answers to.
    #[error("Unknown configuration key: {key}")]
    UnknownKey {
        /// The key as it was supplied.
        key: String,
    },

    /// Configuration value that does not parse as the key's type.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Key being set.
        key: String,
        /// Raw value that failed to parse.
        value: String,
    },

    /// Status name that matches no known status.
    #[error("Unknown status: {0}")]
    UnknownStatus(String),
}
