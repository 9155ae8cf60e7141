//! Filter declarations.
//!
//! Each declaration form (`CharFilter`, `OrderingFilter`, ...) is a thin
//! builder around one `FilterDef`. Forms are collected into a
//! `FilterSchema` by name; the schema fills in the name and default field
//! path at build time.
mod special;


use crate::{
    DEFAULT_LIMIT,
    apply::Context,
    error::FilterError,
    query::{FieldPath, Operator, Queryable},
    value::{ScalarType, Value},
};
use std::fmt;

pub(crate) use special::{apply_limit, apply_offset, apply_ordering, apply_search};

///
/// MethodFn
///
/// Custom filter method: `(query, field_name, value, context)`. The method
/// owns validation of `value` and may mutate the queryable freely.
///

pub type MethodFn = fn(&mut dyn Queryable, &str, &Value, &Context) -> Result<(), FilterError>;

///
/// FilterDef
///
/// One named, immutable rule describing how an input key maps to a
/// predicate. Immutable once its schema is built.
///

#[derive(Clone, Debug)]
pub struct FilterDef {
    pub(crate) name: String,
    pub(crate) field: Option<FieldPath>,
    pub(crate) operator: Operator,
    pub(crate) description: String,
    pub(crate) declared_type: Option<ScalarType>,
    pub(crate) kind: FilterKind,
}

impl FilterDef {
    fn new(kind: FilterKind, declared_type: Option<ScalarType>) -> Self {
        Self {
            name: String::new(),
            field: None,
            operator: Operator::default(),
            description: String::new(),
            declared_type,
            kind,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target field path; defaults to `[name]` once the schema is built.
    #[must_use]
    pub fn field_path(&self) -> FieldPath {
        self.field
            .clone()
            .unwrap_or_else(|| FieldPath::parse(&self.name))
    }

    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn declared_type(&self) -> Option<ScalarType> {
        self.declared_type
    }

    #[must_use]
    pub const fn kind(&self) -> &FilterKind {
        &self.kind
    }

    /// Whether the filter contributes even when its key is absent.
    #[must_use]
    pub const fn has_default(&self) -> bool {
        match &self.kind {
            FilterKind::Ordering(spec) => !spec.default.is_empty(),
            FilterKind::Limit(_) => true,
            _ => false,
        }
    }

    /// Declaration form name, as used in diagnostics and documentation.
    #[must_use]
    pub const fn form(&self) -> &'static str {
        match &self.kind {
            FilterKind::Value { generic: true } => "Filter",
            FilterKind::Value { generic: false } => match self.declared_type {
                Some(ScalarType::Text) => "CharFilter",
                Some(ScalarType::Number) => "NumberFilter",
                Some(ScalarType::DateTime) => "DateTimeFilter",
                Some(ScalarType::Time) => "TimeFilter",
                Some(ScalarType::Date) => "DateFilter",
                Some(ScalarType::Bool) => "BooleanFilter",
                Some(ScalarType::Uuid) => "UUIDFilter",
                None => "Filter",
            },
            FilterKind::Method { .. } => "MethodFilter",
            FilterKind::Search(_) => "SearchingFilter",
            FilterKind::Ordering(_) => "OrderingFilter",
            FilterKind::Offset => "OffsetFilter",
            FilterKind::Limit(_) => "LimitFilter",
        }
    }
}

///
/// FilterKind
///

#[derive(Clone)]
pub enum FilterKind {
    /// Single field, single operator. `generic` filters take their type
    /// from the bound model.
    Value { generic: bool },
    Method {
        method: MethodFn,
        value_type: Option<ScalarType>,
    },
    Search(SearchSpec),
    Ordering(OrderingSpec),
    Offset,
    Limit(LimitSpec),
}

impl fmt::Debug for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value { generic } => f.debug_struct("Value").field("generic", generic).finish(),
            Self::Method { value_type, .. } => f
                .debug_struct("Method")
                .field("value_type", value_type)
                .finish_non_exhaustive(),
            Self::Search(spec) => f.debug_tuple("Search").field(spec).finish(),
            Self::Ordering(spec) => f.debug_tuple("Ordering").field(spec).finish(),
            Self::Offset => f.write_str("Offset"),
            Self::Limit(spec) => f.debug_tuple("Limit").field(spec).finish(),
        }
    }
}

///
/// SearchSpec
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchSpec {
    pub fields: Vec<(FieldPath, Operator)>,
}

///
/// OrderingSpec
///
/// `fields` maps exposed parameter values to real field paths.
/// `default` holds exposed keys, optionally `-` prefixed.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderingSpec {
    pub fields: Vec<(String, FieldPath)>,
    pub default: Vec<String>,
}

impl OrderingSpec {
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&FieldPath> {
        self.fields
            .iter()
            .find(|(exposed, _)| exposed == key)
            .map(|(_, path)| path)
    }
}

///
/// LimitSpec
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LimitSpec {
    pub default: u64,
    pub maximum: Option<u64>,
}

impl LimitSpec {
    /// Effective limit for a requested value: clamped, never rejected.
    #[must_use]
    pub fn effective(&self, requested: Option<u64>) -> u64 {
        let limit = requested.unwrap_or(self.default);

        self.maximum.map_or(limit, |maximum| limit.min(maximum))
    }
}

impl Default for LimitSpec {
    fn default() -> Self {
        Self {
            default: DEFAULT_LIMIT,
            maximum: None,
        }
    }
}

// ----------------------------------------------------------------------
// Declaration forms
// ----------------------------------------------------------------------

// Common setters shared by every declaration form.
macro_rules! filter_form {
    ( $( $(#[$meta:meta])* $form:ident ),* $(,)? ) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug)]
            pub struct $form(FilterDef);

            impl $form {
                /// Target field path (dotted). Defaults to the filter name.
                #[must_use]
                pub fn field(mut self, path: &str) -> Self {
                    self.0.field = Some(FieldPath::parse(path));
                    self
                }

                #[must_use]
                pub fn description(mut self, description: impl Into<String>) -> Self {
                    self.0.description = description.into();
                    self
                }
            }

            impl From<$form> for FilterDef {
                fn from(form: $form) -> Self {
                    form.0
                }
            }
        )*
    };
}

// Single-field forms additionally take an operator.
macro_rules! value_filter_form {
    ( $( $(#[$meta:meta])* $form:ident => $ty:expr ),* $(,)? ) => {
        $(
            filter_form!($(#[$meta])* $form);

            impl $form {
                #[must_use]
                pub fn new() -> Self {
                    Self(FilterDef::new(FilterKind::Value { generic: false }, Some($ty)))
                }

                #[must_use]
                pub const fn operator(mut self, operator: Operator) -> Self {
                    self.0.operator = operator;
                    self
                }
            }

            impl Default for $form {
                fn default() -> Self {
                    Self::new()
                }
            }
        )*
    };
}

value_filter_form! {
    /// Text-valued filter.
    CharFilter => ScalarType::Text,
    /// Numeric filter; accepts integers and floats.
    NumberFilter => ScalarType::Number,
    /// RFC 3339 timestamp filter.
    DateTimeFilter => ScalarType::DateTime,
    /// `HH:MM[:SS]` time-of-day filter.
    TimeFilter => ScalarType::Time,
    /// `YYYY-MM-DD` calendar date filter.
    DateFilter => ScalarType::Date,
    BooleanFilter => ScalarType::Bool,
    UUIDFilter => ScalarType::Uuid,
}

filter_form! {
    /// Generic filter; its type comes from the bound model's field.
    Filter,
    /// Filter delegating predicate construction to a function.
    MethodFilter,
    /// One search term matched against several fields, OR-combined.
    SearchingFilter,
    /// Allow-listed ordering with an optional default.
    OrderingFilter,
    OffsetFilter,
    LimitFilter,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self(FilterDef::new(FilterKind::Value { generic: true }, None))
    }

    #[must_use]
    pub const fn operator(mut self, operator: Operator) -> Self {
        self.0.operator = operator;
        self
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodFilter {
    #[must_use]
    pub fn new(method: MethodFn) -> Self {
        Self(FilterDef::new(
            FilterKind::Method {
                method,
                value_type: None,
            },
            None,
        ))
    }

    /// Coerce the input to this type before the method sees it.
    #[must_use]
    pub fn value_type(mut self, ty: ScalarType) -> Self {
        if let FilterKind::Method { value_type, .. } = &mut self.0.kind {
            *value_type = Some(ty);
        }
        self.0.declared_type = Some(ty);
        self
    }
}

impl SearchingFilter {
    /// Plain field list. A `^` prefix searches with `startswith`, `=` with
    /// `eq`; everything else uses `contains`.
    #[must_use]
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = fields
            .into_iter()
            .map(|field| {
                let field = field.as_ref();
                if let Some(rest) = field.strip_prefix('^') {
                    (FieldPath::parse(rest), Operator::StartsWith)
                } else if let Some(rest) = field.strip_prefix('=') {
                    (FieldPath::parse(rest), Operator::Eq)
                } else {
                    (FieldPath::parse(field), Operator::Contains)
                }
            })
            .collect();

        Self::from_spec(SearchSpec { fields })
    }

    /// Explicit field path → operator mapping.
    #[must_use]
    pub fn with_operators<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Operator)>,
        S: AsRef<str>,
    {
        let fields = fields
            .into_iter()
            .map(|(field, op)| (FieldPath::parse(field.as_ref()), op))
            .collect();

        Self::from_spec(SearchSpec { fields })
    }

    fn from_spec(spec: SearchSpec) -> Self {
        Self(FilterDef::new(FilterKind::Search(spec), Some(ScalarType::Text)))
    }
}

impl OrderingFilter {
    /// Plain field list; each exposed key equals its field path.
    #[must_use]
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::mapped(fields.into_iter().map(|field| {
            let field = field.as_ref().to_string();
            (field.clone(), field)
        }))
    }

    /// Exposed key → field path mapping.
    #[must_use]
    pub fn mapped<I, K, P>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: AsRef<str>,
    {
        let fields = fields
            .into_iter()
            .map(|(key, path)| (key.into(), FieldPath::parse(path.as_ref())))
            .collect();

        Self(FilterDef::new(
            FilterKind::Ordering(OrderingSpec {
                fields,
                default: Vec::new(),
            }),
            Some(ScalarType::Text),
        ))
    }

    /// Ordering applied when the parameter is absent.
    #[must_use]
    pub fn with_default<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let FilterKind::Ordering(spec) = &mut self.0.kind {
            spec.default = keys.into_iter().map(Into::into).collect();
        }
        self
    }
}

impl OffsetFilter {
    #[must_use]
    pub fn new() -> Self {
        Self(FilterDef::new(FilterKind::Offset, Some(ScalarType::Number)))
    }
}

impl Default for OffsetFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl LimitFilter {
    #[must_use]
    pub fn new() -> Self {
        Self(FilterDef::new(
            FilterKind::Limit(LimitSpec::default()),
            Some(ScalarType::Number),
        ))
    }

    #[must_use]
    pub fn with_default(mut self, limit: u64) -> Self {
        if let FilterKind::Limit(spec) = &mut self.0.kind {
            spec.default = limit;
        }
        self
    }

    #[must_use]
    pub fn maximum(mut self, maximum: u64) -> Self {
        if let FilterKind::Limit(spec) = &mut self.0.kind {
            spec.maximum = Some(maximum);
        }
        self
    }
}

impl Default for LimitFilter {
    fn default() -> Self {
        Self::new()
    }
}
