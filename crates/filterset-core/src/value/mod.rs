mod coerce;


use crate::error::FilterError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

// re-exports
pub use coerce::{coerce, coerce_list};

///
/// ScalarType
///
/// Semantic value type a filter validates against. Typed filters carry one
/// directly; generic filters inherit it from the bound model's field kind.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    #[display("bool")]
    Bool,
    #[display("date")]
    Date,
    #[display("datetime")]
    DateTime,
    #[display("number")]
    Number,
    #[display("text")]
    Text,
    #[display("time")]
    Time,
    #[display("uuid")]
    Uuid,
}

impl ScalarType {
    /// Whether `lt`/`gt`/`le`/`ge` are meaningful for this type.
    #[must_use]
    pub const fn is_orderable(self) -> bool {
        !matches!(self, Self::Bool | Self::Uuid)
    }

    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

///
/// Value
///
/// Raw or coerced filter value.
///
/// Null → no value supplied; input keys carrying Null are treated as absent.
/// List → ordered values for membership operators; never nested.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Date(Date),
    DateTime(OffsetDateTime),
    Float(f64),
    Int(i64),
    List(Vec<Self>),
    Null,
    Text(String),
    Time(Time),
    Uuid(Uuid),
}

impl Value {
    /// Short type label used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Time(_) => "time",
            Self::Uuid(_) => "uuid",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Scalars are every non-null, non-list value.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Null | Self::List(_))
    }

    #[must_use]
    pub const fn is_orderable(&self) -> bool {
        matches!(
            self,
            Self::Date(_)
                | Self::DateTime(_)
                | Self::Float(_)
                | Self::Int(_)
                | Self::Text(_)
                | Self::Time(_)
        )
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Compare two values of the same family. Ints and floats compare
    /// numerically; every other cross-type pair is unordered.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Time(a), Self::Time(b)) => Some(a.cmp(b)),
            (Self::Uuid(a), Self::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Convert a decoded JSON parameter into a `Value`.
    ///
    /// Integral numbers become `Int`, other numbers `Float`, arrays become
    /// `List` of scalars. Objects and nested arrays are rejected.
    pub fn from_json(field: &str, json: serde_json::Value) -> Result<Self, FilterError> {
        Self::from_json_inner(field, json, true)
    }

    fn from_json_inner(
        field: &str,
        json: serde_json::Value,
        allow_list: bool,
    ) -> Result<Self, FilterError> {
        use serde_json::Value as Json;

        match json {
            Json::Null => Ok(Self::Null),
            Json::Bool(b) => Ok(Self::Bool(b)),
            Json::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .ok_or_else(|| FilterError::type_mismatch(field, "number", n.to_string())),
            Json::String(s) => Ok(Self::Text(s)),
            Json::Array(items) if allow_list => items
                .into_iter()
                .map(|item| Self::from_json_inner(field, item, false))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            Json::Array(_) => Err(FilterError::type_mismatch(field, "scalar", "nested list")),
            Json::Object(_) => Err(FilterError::type_mismatch(field, "scalar or list", "object")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "'{d}'"),
            Self::DateTime(dt) => write!(f, "'{dt}'"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Self::Null => f.write_str("NULL"),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Time(t) => write!(f, "'{t}'"),
            Self::Uuid(u) => write!(f, "'{u}'"),
        }
    }
}

macro_rules! value_from {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f64 => Float,
    String => Text,
    &str => Text,
    Date => Date,
    OffsetDateTime => DateTime,
    Time => Time,
    Uuid => Uuid,
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
