use crate::value::ScalarType;
use derive_more::Deref;
use std::fmt;

///
/// FieldRef
///
/// Terminal field handle produced by resolution. `path` is the dotted,
/// fully qualified path predicates are built against; `ty` is absent for
/// fields the model marks unsupported or that an unbound schema cannot type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldRef {
    pub path: String,
    pub ty: Option<ScalarType>,
}

impl FieldRef {
    #[must_use]
    pub fn new(path: impl Into<String>, ty: Option<ScalarType>) -> Self {
        Self {
            path: path.into(),
            ty,
        }
    }

    #[must_use]
    pub fn typed(path: impl Into<String>, ty: ScalarType) -> Self {
        Self::new(path, Some(ty))
    }
}

///
/// FieldPath
///
/// Dotted field path split into segments. All but the last segment name
/// relationships; the last names the terminal field.
///

#[derive(Clone, Debug, Deref, Eq, Hash, PartialEq)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self(path.split('.').map(str::to_string).collect())
    }

    /// Last segment; empty for an empty path.
    #[must_use]
    pub fn terminal(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    /// Whether reaching the terminal crosses at least one relationship.
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        self.0.len() > 1
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}
