//! Error types for Penny

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The completion API answered with an error or an unusable body
    #[error("Completion API error: {0}")]
    Upstream(String),
}

impl Error {
    /// Whether this error originated in the external completion API
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream(_) | Error::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
