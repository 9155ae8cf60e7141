use filterset_core::error::{FilterError, SchemaError};
use std::path::PathBuf;
use thiserror::Error as ThisError;

///
/// ConfigError
///
/// Failures while reading, parsing, or building a schema from config.
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid filter schema config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown model '{name}'")]
    UnknownModel { name: String },

    #[error("filter '{filter}' references unknown method '{method}'")]
    UnknownMethod { filter: String, method: String },

    #[error("filter '{filter}': {source}")]
    Operator {
        filter: String,
        #[source]
        source: FilterError,
    },

    /// A key that does not apply to the filter's kind, or a missing one.
    #[error("filter '{filter}': {message}")]
    Invalid { filter: String, message: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ConfigError {
    pub(crate) fn invalid(filter: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            filter: filter.to_string(),
            message: message.into(),
        }
    }
}
