//! Errors raised while loading or validating settings.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed config file")]
    Toml(#[from] toml::de::Error),

    #[error("invalid ignore pattern `{0}`")]
    Glob(String, #[source] globset::Error),

    #[error("invalid settings: {0}")]
    Validation(String),
}
