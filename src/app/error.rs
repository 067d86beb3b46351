use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemebotError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Content source error: {0}")]
    Source(String),

    #[error("Meme not found: {0}")]
    MemeNotFound(i64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<crate::config::ConfigError> for MemebotError {
    fn from(err: crate::config::ConfigError) -> Self {
        MemebotError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MemebotError>;
