//! ## Crate layout
//! - `core`: values, model metadata, predicates, schemas, and the apply engine.
//! - `config`: TOML-declared schemas (feature `config`, on by default).
//! - `error`: public error type with a stable kind + origin taxonomy.
//!
//! The `prelude` module carries the declaration and apply vocabulary.

pub use filterset_core as core;

#[cfg(feature = "config")]
pub use filterset_config as config;

pub mod error;

pub use error::Error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::error::{Error, ErrorKind, ErrorOrigin};

    #[cfg(feature = "config")]
    pub use crate::config::{MethodRegistry, ModelRegistry, load_schema};
}
