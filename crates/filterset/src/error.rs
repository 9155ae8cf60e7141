use derive_more::Display;
use filterset_core::error::{FilterError, SchemaError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Whether the caller's request parameters are at fault, as opposed to
    /// the schema or its configuration.
    #[must_use]
    pub const fn is_request_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Request(kind) if !matches!(kind, RequestErrorKind::Unbound))
    }
}

impl From<FilterError> for Error {
    fn from(err: FilterError) -> Self {
        let kind = match &err {
            FilterError::UnknownParameter { .. } => RequestErrorKind::UnknownParameter,
            FilterError::UnknownField { .. } => RequestErrorKind::UnknownField,
            FilterError::UnsupportedTraversal { .. } => RequestErrorKind::UnsupportedTraversal,
            FilterError::UnsupportedOperator { .. } => RequestErrorKind::UnsupportedOperator,
            FilterError::TypeMismatch { .. } => RequestErrorKind::TypeMismatch,
            FilterError::InvalidOrdering { .. } => RequestErrorKind::InvalidOrdering,
            FilterError::InvalidValue { .. } => RequestErrorKind::InvalidValue,
            FilterError::Unbound => RequestErrorKind::Unbound,
        };

        Self::new(ErrorKind::Request(kind), ErrorOrigin::Apply, err.to_string())
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Self::new(ErrorKind::Schema, ErrorOrigin::Schema, err.to_string())
    }
}

#[cfg(feature = "config")]
impl From<filterset_config::ConfigError> for Error {
    fn from(err: filterset_config::ConfigError) -> Self {
        use filterset_config::ConfigError;

        match err {
            ConfigError::Schema(err) => err.into(),
            ConfigError::Io { .. } => {
                Self::new(ErrorKind::Unavailable, ErrorOrigin::Config, err.to_string())
            }
            err => Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string()),
        }
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Request(RequestErrorKind),

    /// Schema declarations are inconsistent.
    Schema,

    /// Config could not be turned into a schema.
    Config,

    /// Config source could not be read.
    Unavailable,
}

///
/// RequestErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RequestErrorKind {
    UnknownParameter,

    /// Field path segment missing from the model.
    UnknownField,

    /// Relationship traversal on an unbound schema.
    UnsupportedTraversal,

    UnsupportedOperator,

    /// Value shape does not fit the operator or declared type.
    TypeMismatch,

    InvalidOrdering,

    /// Value has the right shape but an illegal content.
    InvalidValue,

    /// A model-backed queryable was requested from an unbound schema.
    Unbound,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Apply,
    Config,
    Schema,
}
