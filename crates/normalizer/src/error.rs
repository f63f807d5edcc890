use thiserror::Error;

/// Result type for normalizer setup
pub type Result<T> = std::result::Result<T, NormalizerError>;

/// Errors raised while building a normalizer.
///
/// Parsing itself never fails; these only cover configuration.
#[derive(Error, Debug)]
pub enum NormalizerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file is not valid TOML for this schema
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl NormalizerError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
