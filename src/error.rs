//! Error types for the account-book crate.
//!
//! Internally, functions return `Res<T>` (an `anyhow::Result`) and attach context as errors
//! propagate. Public functions convert to `Result<T>`, whose `Error` carries an `ErrorType` so
//! that callers (the CLI and the HTTP server) can decide how to report the failure.

use crate::model::AmountOverflow;
use std::fmt::{Debug, Display, Formatter};

/// Internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// Public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of failure that occurred.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ErrorType {
    /// The SQLite store could not be reached or rejected a statement.
    StoreUnavailable,
    /// The caller supplied malformed input, e.g. a non-numeric amount.
    InvalidInput,
    /// The requested resource does not exist, e.g. an unknown user in a route.
    NotFound,
    /// The home directory or its configuration file is missing or invalid.
    Config,
    /// The HTTP server failed to bind or serve.
    Service,
    /// A total over the stored amounts does not fit in the supported range.
    Overflow,
}

impl ErrorType {
    /// A short, stable description of the error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::StoreUnavailable => "Store unavailable",
            ErrorType::InvalidInput => "Invalid input",
            ErrorType::NotFound => "Not found",
            ErrorType::Config => "Configuration error",
            ErrorType::Service => "Service error",
            ErrorType::Overflow => "Amount overflow",
        }
    }
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The public error type. It wraps an `anyhow::Error` and classifies it with an `ErrorType`.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// Creates an error from a message.
    pub fn msg(error_type: ErrorType, message: impl Display) -> Self {
        Self::new(error_type, anyhow::anyhow!("{message}"))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The alternate format prints the whole context chain.
        write!(f, "{}: {:#}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Converts an internal result into a public `Result` with the given `ErrorType`.
///
/// An `AmountOverflow` anywhere in the error chain is always reported as `ErrorType::Overflow`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Res<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let error_type = if e.chain().any(|cause| cause.is::<AmountOverflow>()) {
                ErrorType::Overflow
            } else {
                error_type
            };
            Error::new(error_type, e)
        })
    }
}

impl From<AmountOverflow> for Error {
    fn from(e: AmountOverflow) -> Self {
        Error::new(ErrorType::Overflow, e)
    }
}
