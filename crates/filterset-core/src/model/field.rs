use crate::{model::entity::EntityModel, value::ScalarType};
use std::fmt;

///
/// FieldModel
/// Runtime field metadata used by field resolution.
///

#[derive(Debug)]
pub struct FieldModel {
    /// Field name as used in field paths.
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

///
/// FieldKind
///
/// Lossy projection of the host ORM's field classes. Relations point at the
/// target entity so dotted paths can be walked statically.
///

pub enum FieldKind {
    Bool,
    Date,
    DateTime,
    Float,
    Int,
    Relation { target: &'static EntityModel },
    Text,
    Time,
    Uuid,

    /// Marker for fields that cannot be filtered.
    Unsupported,
}

impl FieldKind {
    /// Semantic type of a scalar field; `None` for relations and unsupported
    /// fields.
    #[must_use]
    pub const fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Self::Bool => Some(ScalarType::Bool),
            Self::Date => Some(ScalarType::Date),
            Self::DateTime => Some(ScalarType::DateTime),
            Self::Float | Self::Int => Some(ScalarType::Number),
            Self::Text => Some(ScalarType::Text),
            Self::Time => Some(ScalarType::Time),
            Self::Uuid => Some(ScalarType::Uuid),
            Self::Relation { .. } | Self::Unsupported => None,
        }
    }

    #[must_use]
    pub const fn relation_target(&self) -> Option<&'static EntityModel> {
        match self {
            Self::Relation { target } => Some(*target),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("Bool"),
            Self::Date => f.write_str("Date"),
            Self::DateTime => f.write_str("DateTime"),
            Self::Float => f.write_str("Float"),
            Self::Int => f.write_str("Int"),
            Self::Relation { target } => write!(f, "Relation({})", target.name),
            Self::Text => f.write_str("Text"),
            Self::Time => f.write_str("Time"),
            Self::Uuid => f.write_str("Uuid"),
            Self::Unsupported => f.write_str("Unsupported"),
        }
    }
}

// Relations print the target name only; models may reference each other.
impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
