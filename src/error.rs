//! Error types for the soundboard

use thiserror::Error;

/// Startup error: everything that can stop the server from coming up
#[derive(Error, Debug)]
pub enum Error {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Command interpreter rejections
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("payload is not valid UTF-8")]
    InvalidEncoding,

    #[error("illegal delay: {0:?}")]
    IllegalDelay(String),

    #[error("illegal volume: {0:?}")]
    IllegalVolume(String),

    #[error("missing sound name")]
    MissingSoundName,

    #[error("{keyword} takes no arguments, got {argument:?}")]
    UnexpectedArgument { keyword: &'static str, argument: String },
}

/// Audio output errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No output device: {0}")]
    NoDevice(String),

    #[error("Failed to open resource: {0}")]
    Open(#[source] std::io::Error),

    #[error("Failed to decode resource: {0}")]
    Decode(String),

    #[error("Failed to start playback: {0}")]
    Playback(String),

    #[error("Audio output thread is gone")]
    OutputClosed,
}

/// External player control errors
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("No external player configured")]
    NotConfigured,

    #[error("External player not found at {0}")]
    Missing(String),

    #[error("Failed to spawn external player: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Network errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Socket bind failed: {0}")]
    BindFailed(String),
}

/// Sound catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path}: {message}")]
    Parse { path: String, message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("No platform config directory available")]
    NoConfigDir,
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;
