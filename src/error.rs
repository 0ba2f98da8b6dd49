//! Error types for ManavLayer

use crate::transform::TransformError;
use thiserror::Error;

/// ManavLayer error type
#[derive(Error, Debug)]
pub enum LayerError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for LayerError {
    fn from(e: toml::de::Error) -> Self {
        LayerError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LayerError>;
