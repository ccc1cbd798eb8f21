//! Error types for Ambiscape

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmbiscapeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Audio backend error: {0}")]
    Backend(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Unknown emitter: {0}")]
    UnknownEmitter(String),

    #[error("Unknown ambience track: {0}")]
    UnknownTrack(String),

    #[error("Response curve error: {0}")]
    Curve(String),
}

pub type Result<T> = std::result::Result<T, AmbiscapeError>;
