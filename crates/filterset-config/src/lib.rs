//! TOML-declared filter schemas.
//!
//! A config names an optional model and lists filters in declaration order.
//! Model and method references are resolved through registries at load
//! time, so a loaded schema never looks anything up by name again.
mod config;
mod error;
mod registry;


use filterset_core::schema::FilterSchema;
use std::path::Path;

// re-exports
pub use config::{DefaultConfig, FieldsConfig, FilterConfig, FilterKindConfig, SchemaConfig};
pub use error::ConfigError;
pub use registry::{MethodRegistry, ModelRegistry};

///
/// Parse and build a schema from TOML text.
///
pub fn load_schema(
    source: &str,
    models: &ModelRegistry,
    methods: &MethodRegistry,
) -> Result<FilterSchema, ConfigError> {
    let config: SchemaConfig = toml::from_str(source)?;

    config.build(models, methods)
}

///
/// Read a TOML file and build a schema from it.
///
pub fn load_schema_file(
    path: impl AsRef<Path>,
    models: &ModelRegistry,
    methods: &MethodRegistry,
) -> Result<FilterSchema, ConfigError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loading filter schema config");

    load_schema(&source, models, methods)
}
