//! Tome Archive - Library Catalogue Manager
//!
//! Tracks books ("tomes") and members ("patrons"), lends and takes back books,
//! and keeps all state in two flat text tables that are rewritten on every
//! change.

pub mod archive;
pub mod config;
pub mod console;
pub mod error;
pub mod models;

pub use archive::{Archive, TomeField};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
