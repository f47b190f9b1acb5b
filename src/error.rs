//! Error types for Tome Archive

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed input caught at the console boundary (e.g. a non-numeric ID)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No unused record ID remains
    #[error("ID space exhausted: {0}")]
    IdsExhausted(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Human-readable message without the error kind prefix
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::IdsExhausted(msg) => msg.clone(),
            AppError::Io(e) => e.to_string(),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
