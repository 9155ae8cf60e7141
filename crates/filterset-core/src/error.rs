use thiserror::Error as ThisError;

///
/// FilterError
///
/// Apply-time failures. Raised synchronously at the point of detection and
/// surfaced unchanged to the caller of `FilterSet::apply`.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FilterError {
    /// Input key has no matching filter in the schema.
    #[error("unknown filter parameter '{name}'")]
    UnknownParameter { name: String },

    /// A field path segment cannot be located on the current model.
    #[error("unknown field '{field}' on '{entity}'")]
    UnknownField { entity: String, field: String },

    /// Relationship traversal attempted without a bound model.
    #[error("field path '{path}' traverses a relationship, which requires a bound model")]
    UnsupportedTraversal { path: String },

    /// Operator text outside the recognized vocabulary.
    #[error("unsupported operator '{operator}'")]
    UnsupportedOperator { operator: String },

    /// Value shape is incompatible with the operator or declared type.
    #[error("type mismatch for '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// Ordering key is not in the filter's allow-list.
    #[error("invalid ordering '{key}'")]
    InvalidOrdering { key: String },

    /// Value has the right shape but an illegal content.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// A model-backed queryable was requested from an unbound schema.
    #[error("schema is not bound to a model; an explicit queryable is required")]
    Unbound,
}

impl FilterError {
    pub(crate) fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

///
/// SchemaError
///
/// Build-time failures. A schema that fails to build never exists, so
/// every `FilterSchema` in circulation is internally consistent.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("duplicate filter '{name}'")]
    DuplicateFilter { name: String },

    /// Generic `Filter` declared on a schema without a bound model.
    #[error("filter '{name}' has no declared type and the schema is not bound to a model")]
    UntypedFilter { name: String },

    /// Typed filter declared against a model field of another kind.
    #[error("{filter} '{name}' is not suitable for field kind {kind}")]
    UnsuitableFilter {
        name: String,
        filter: &'static str,
        kind: String,
    },

    /// Search and ordering filters need at least one field.
    #[error("filter '{name}' must declare at least one field")]
    MissingFields { name: String },

    /// Only unbound schemas may serve as a base for another schema.
    #[error("only unbound schemas can be extended")]
    BoundBase,

    #[error("filter '{name}' is invalid: {source}")]
    InvalidFilter {
        name: String,
        #[source]
        source: FilterError,
    },
}

impl SchemaError {
    pub(crate) fn invalid(name: impl Into<String>, source: FilterError) -> Self {
        Self::InvalidFilter {
            name: name.into(),
            source,
        }
    }
}
