//! Error types for revagent core
//!
//! Re-exports revagent-error and adds a few domain constructors.

pub use revagent_error::{Error, ErrorClass, ErrorKind, Result};

/// Rating outside the 1..=5 star scale
pub fn invalid_rating(rating: u8) -> Error {
    Error::invalid_argument(format!("rating must be between 1 and 5, got {}", rating))
        .with_context("rating", rating.to_string())
}

/// A required text field was empty
pub fn empty_field(field: &'static str) -> Error {
    Error::invalid_argument(format!("{} must not be empty", field)).with_context("field", field)
}

/// A keyword that cannot be stored one-per-line
pub fn invalid_keyword(keyword: &str, reason: &str) -> Error {
    Error::invalid_argument(format!("invalid keyword: {}", reason))
        .with_operation("registry::register")
        .with_context("keyword", keyword)
}

/// Session ids become file names, so separators and dot paths are refused
pub fn invalid_session_id(id: &str) -> Error {
    Error::invalid_argument(format!("invalid session id '{}'", id)).with_context("session", id)
}

/// Lock poisoning inside an in-memory store
pub fn lock_poisoned(what: &'static str) -> Error {
    Error::storage_failed(format!("{} lock poisoned", what))
}
