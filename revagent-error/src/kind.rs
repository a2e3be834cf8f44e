//! Error kinds for revagent operations

use std::fmt;

/// The kind of error that occurred.
///
/// Callers match on the kind, or on its [`ErrorClass`], to decide between
/// showing a message, storing a fallback record, or aborting a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// Catch-all for unhandled cases
    Unexpected,

    /// Invalid configuration (missing API key, unknown provider)
    ConfigInvalid,

    /// Invalid argument passed to a function
    InvalidArgument,

    // =========================================================================
    // Provider errors
    // =========================================================================
    /// The model endpoint could not be reached or refused the request
    ProviderUnavailable,

    /// Rate limit exceeded
    RateLimited,

    /// Network error
    NetworkFailed,

    /// Credentials were missing or rejected
    AuthenticationFailed,

    /// The model answered, but not with something usable
    InferenceFailed,

    /// The model kept requesting tools past the configured limit
    ToolLimitExceeded,

    // =========================================================================
    // Tool errors
    // =========================================================================
    /// A tool ran but failed
    ToolFailed,

    /// The model requested a tool that is not registered
    ToolUnknown,

    // =========================================================================
    // Schema errors
    // =========================================================================
    /// The answer did not satisfy the expected result schema
    SchemaMismatch,

    /// Failed to parse input
    ParseFailed,

    /// Serialization/deserialization failed
    SerializationFailed,

    // =========================================================================
    // Session errors
    // =========================================================================
    /// No review with the requested id
    ReviewNotFound,

    /// Stored session not found
    StorageNotFound,

    /// Session storage operation failed
    StorageFailed,

    // =========================================================================
    // IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,
}

/// Coarse grouping of error kinds used for recovery decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Model or search endpoint failed
    Provider,
    /// Model output could not be coerced into the result schema
    SchemaMismatch,
    /// Local file or storage failure
    Resource,
    /// Bad input from the caller
    Input,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::ConfigInvalid => "ConfigInvalid",
            ErrorKind::InvalidArgument => "InvalidArgument",

            ErrorKind::ProviderUnavailable => "ProviderUnavailable",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::NetworkFailed => "NetworkFailed",
            ErrorKind::AuthenticationFailed => "AuthenticationFailed",
            ErrorKind::InferenceFailed => "InferenceFailed",
            ErrorKind::ToolLimitExceeded => "ToolLimitExceeded",

            ErrorKind::ToolFailed => "ToolFailed",
            ErrorKind::ToolUnknown => "ToolUnknown",

            ErrorKind::SchemaMismatch => "SchemaMismatch",
            ErrorKind::ParseFailed => "ParseFailed",
            ErrorKind::SerializationFailed => "SerializationFailed",

            ErrorKind::ReviewNotFound => "ReviewNotFound",
            ErrorKind::StorageNotFound => "StorageNotFound",
            ErrorKind::StorageFailed => "StorageFailed",

            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::IoFailed => "IoFailed",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ErrorKind::ProviderUnavailable
            | ErrorKind::RateLimited
            | ErrorKind::NetworkFailed
            | ErrorKind::AuthenticationFailed
            | ErrorKind::InferenceFailed
            | ErrorKind::ToolLimitExceeded
            | ErrorKind::ToolFailed
            | ErrorKind::ToolUnknown => ErrorClass::Provider,

            ErrorKind::SchemaMismatch | ErrorKind::ParseFailed => ErrorClass::SchemaMismatch,

            ErrorKind::StorageNotFound
            | ErrorKind::StorageFailed
            | ErrorKind::FileNotFound
            | ErrorKind::PermissionDenied
            | ErrorKind::IoFailed
            | ErrorKind::SerializationFailed => ErrorClass::Resource,

            ErrorKind::Unexpected
            | ErrorKind::ConfigInvalid
            | ErrorKind::InvalidArgument
            | ErrorKind::ReviewNotFound => ErrorClass::Input,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
