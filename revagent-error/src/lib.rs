//! # revagent-error
//!
//! Unified error handling for revagent.
//!
//! - **ErrorKind**: what went wrong (e.g. `SchemaMismatch`, `RateLimited`)
//! - **ErrorClass**: coarse group used to pick how a command reports it
//! - **Context**: key-value pairs that help locate the cause
//! - **Source**: the wrapped underlying error, never leaked as a raw type
//!
//! ## Usage
//!
//! ```rust
//! use revagent_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::ReviewNotFound, "review 7 not found")
//!         .with_operation("session::store_sentiment")
//!         .with_context("review_id", "7"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All fallible functions return `Result<T, revagent_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - An error is handled once; later layers only append context

mod error;
mod kind;

pub use error::Error;
pub use kind::{ErrorClass, ErrorKind};

/// Result type alias using the revagent Error
pub type Result<T> = std::result::Result<T, Error>;
