use crate::{
    error::FilterError,
    query::{CompareOp, FieldRef, Predicate},
    value::{ScalarType, Value, coerce, coerce_list},
};
use regex::RegexBuilder;
use serde::Serialize;
use std::{fmt, str::FromStr};

///
/// Operator
///
/// Closed operator vocabulary a filter can be configured with.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[default]
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Like,
    Ilike,
    Contains,
    #[serde(rename = "startswith")]
    StartsWith,
    #[serde(rename = "endswith")]
    EndsWith,
    Regexp,
    Iregexp,
    In,
    NotIn,
    IsNull,
}

type BuildFn = fn(String, Value) -> Predicate;

///
/// OperatorClass
///
/// Value-shape family an operator validates its input against.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum OperatorClass {
    Equality,
    Ordering,
    Pattern,
    Regex,
    Membership,
    Null,
}

impl Operator {
    pub const ALL: [Self; 16] = [
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Gt,
        Self::Le,
        Self::Ge,
        Self::Like,
        Self::Ilike,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::Regexp,
        Self::Iregexp,
        Self::In,
        Self::NotIn,
        Self::IsNull,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::Le => "le",
            Self::Ge => "ge",
            Self::Like => "like",
            Self::Ilike => "ilike",
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::Regexp => "regexp",
            Self::Iregexp => "iregexp",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::IsNull => "is_null",
        }
    }

    /// Whether the operator only applies to text fields.
    #[must_use]
    pub const fn requires_text(self) -> bool {
        matches!(self.class(), OperatorClass::Pattern | OperatorClass::Regex)
    }

    const fn class(self) -> OperatorClass {
        match self {
            Self::Eq | Self::Ne => OperatorClass::Equality,
            Self::Lt | Self::Gt | Self::Le | Self::Ge => OperatorClass::Ordering,
            Self::Like | Self::Ilike | Self::Contains | Self::StartsWith | Self::EndsWith => {
                OperatorClass::Pattern
            }
            Self::Regexp | Self::Iregexp => OperatorClass::Regex,
            Self::In | Self::NotIn => OperatorClass::Membership,
            Self::IsNull => OperatorClass::Null,
        }
    }

    /// Predicate constructor for this operator. Inputs are already validated.
    fn builder(self) -> BuildFn {
        match self {
            Self::Eq => |field, value| match value {
                Value::Null => Predicate::is_null(field),
                value => Predicate::compare(field, CompareOp::Eq, value),
            },
            Self::Ne => |field, value| match value {
                Value::Null => Predicate::is_not_null(field),
                value => Predicate::compare(field, CompareOp::Ne, value),
            },
            Self::Lt => |field, value| Predicate::compare(field, CompareOp::Lt, value),
            Self::Gt => |field, value| Predicate::compare(field, CompareOp::Gt, value),
            Self::Le => |field, value| Predicate::compare(field, CompareOp::Lte, value),
            Self::Ge => |field, value| Predicate::compare(field, CompareOp::Gte, value),
            Self::Like => |field, value| Predicate::compare(field, CompareOp::Like, value),
            Self::Ilike => |field, value| Predicate::compare(field, CompareOp::ILike, value),
            Self::Contains => |field, value| Predicate::compare(field, CompareOp::Contains, value),
            Self::StartsWith => {
                |field, value| Predicate::compare(field, CompareOp::StartsWith, value)
            }
            Self::EndsWith => |field, value| Predicate::compare(field, CompareOp::EndsWith, value),
            Self::Regexp => |field, value| Predicate::compare(field, CompareOp::Regexp, value),
            Self::Iregexp => |field, value| Predicate::compare(field, CompareOp::IRegexp, value),
            Self::In => |field, value| Predicate::compare(field, CompareOp::In, value),
            Self::NotIn => |field, value| Predicate::compare(field, CompareOp::NotIn, value),
            Self::IsNull => |field, value| match value {
                Value::Bool(false) => Predicate::is_not_null(field),
                _ => Predicate::is_null(field),
            },
        }
    }

    /// Validate and coerce `value` for this operator against `field`, then
    /// construct the predicate.
    pub fn build(self, field: &FieldRef, value: Value) -> Result<Predicate, FilterError> {
        let value = self.prepare(field, value)?;

        Ok((self.builder())(field.path.clone(), value))
    }

    fn prepare(self, field: &FieldRef, value: Value) -> Result<Value, FilterError> {
        let path = field.path.as_str();
        let field_type = || {
            field
                .ty
                .ok_or_else(|| FilterError::type_mismatch(path, "typed field", "untyped field"))
        };

        match self.class() {
            // is_null only looks at presence, so the field type is irrelevant
            OperatorClass::Null => coerce(path, ScalarType::Bool, value),
            OperatorClass::Equality => match value {
                Value::Null => Ok(Value::Null),
                Value::List(_) => Err(FilterError::type_mismatch(
                    path,
                    field_type()?.to_string(),
                    "list",
                )),
                value => coerce(path, field_type()?, value),
            },
            OperatorClass::Ordering => {
                let ty = field_type()?;
                if !ty.is_orderable() {
                    return Err(FilterError::type_mismatch(
                        path,
                        "orderable field",
                        ty.to_string(),
                    ));
                }
                let value = coerce(path, ty, value)?;
                if value.is_orderable() {
                    Ok(value)
                } else {
                    Err(FilterError::type_mismatch(path, "orderable value", value.type_name()))
                }
            }
            OperatorClass::Pattern => text_operand(self, path, field_type()?, value),
            OperatorClass::Regex => {
                let value = text_operand(self, path, field_type()?, value)?;
                if let Value::Text(pattern) = &value {
                    RegexBuilder::new(pattern)
                        .case_insensitive(self == Self::Iregexp)
                        .build()
                        .map_err(|err| FilterError::invalid_value(path, err.to_string()))?;
                }
                Ok(value)
            }
            OperatorClass::Membership => coerce_list(path, field_type()?, value).map(Value::List),
        }
    }
}

// Pattern operators need a text field and a text operand.
fn text_operand(
    op: Operator,
    path: &str,
    ty: ScalarType,
    value: Value,
) -> Result<Value, FilterError> {
    if !ty.is_text() {
        return Err(FilterError::type_mismatch(
            path,
            format!("text field for '{op}'"),
            ty.to_string(),
        ));
    }

    coerce(path, ScalarType::Text, value)
}

///
/// Build a predicate for `field <op> value`.
///
pub fn build(field: &FieldRef, op: Operator, value: Value) -> Result<Predicate, FilterError> {
    op.build(field, value)
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "eq" | "==" => Self::Eq,
            "ne" | "!=" => Self::Ne,
            "lt" | "<" => Self::Lt,
            "gt" | ">" => Self::Gt,
            "le" | "lte" | "<=" => Self::Le,
            "ge" | "gte" | ">=" => Self::Ge,
            "like" | "%" => Self::Like,
            "ilike" | "**" => Self::Ilike,
            "contains" => Self::Contains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "regexp" => Self::Regexp,
            "iregexp" => Self::Iregexp,
            "in" | "<<" => Self::In,
            "not_in" => Self::NotIn,
            "is_null" | ">>" => Self::IsNull,
            other => {
                return Err(FilterError::UnsupportedOperator {
                    operator: other.to_string(),
                });
            }
        };

        Ok(op)
    }
}
