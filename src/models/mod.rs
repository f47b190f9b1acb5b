//! Data models for Tome Archive

pub mod patron;
pub mod tome;

use validator::ValidationErrors;

use crate::error::AppError;

// Re-export commonly used types
pub use patron::{NewPatron, Patron};
pub use tome::{NewTome, Tome};

/// Turn validator output into a single message, taking `fields` in order
pub(crate) fn first_violation(errors: &ValidationErrors, fields: &[&str]) -> AppError {
    let field_errors = errors.field_errors();
    let message = fields
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string());
    AppError::Validation(message)
}
