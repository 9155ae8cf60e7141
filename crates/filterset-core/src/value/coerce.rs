use crate::{
    error::FilterError,
    value::{ScalarType, Value},
};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset, macros::format_description};
use uuid::Uuid;

///
/// Coerce a raw value into the given semantic type.
///
/// Typed values pass through unchanged; text is parsed. Anything else is a
/// `TypeMismatch` naming `field`.
///
pub fn coerce(field: &str, ty: ScalarType, value: Value) -> Result<Value, FilterError> {
    let mismatch = |found: &Value| FilterError::type_mismatch(field, ty.to_string(), found.type_name());

    match (ty, value) {
        (ScalarType::Text, v @ Value::Text(_))
        | (ScalarType::Number, v @ (Value::Int(_) | Value::Float(_)))
        | (ScalarType::Bool, v @ Value::Bool(_))
        | (ScalarType::Date, v @ Value::Date(_))
        | (ScalarType::DateTime, v @ Value::DateTime(_))
        | (ScalarType::Time, v @ Value::Time(_))
        | (ScalarType::Uuid, v @ Value::Uuid(_)) => Ok(v),

        (ScalarType::Bool, Value::Int(0)) => Ok(Value::Bool(false)),
        (ScalarType::Bool, Value::Int(1)) => Ok(Value::Bool(true)),

        (_, Value::Text(text)) => parse_text(ty, text.trim()).ok_or_else(|| {
            FilterError::type_mismatch(field, ty.to_string(), format!("text '{text}'"))
        }),

        (_, other) => Err(mismatch(&other)),
    }
}

///
/// Coerce a membership value into a list of the given semantic type.
///
/// Text is split on `,` first so query-string style `a,b,c` is accepted.
/// Nested lists and nulls are rejected.
///
pub fn coerce_list(field: &str, ty: ScalarType, value: Value) -> Result<Vec<Value>, FilterError> {
    let items = match value {
        Value::List(items) => items,
        Value::Text(text) => text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::Text(s.to_string()))
            .collect(),
        other => {
            return Err(FilterError::type_mismatch(
                field,
                format!("list of {ty}"),
                other.type_name(),
            ));
        }
    };

    items
        .into_iter()
        .map(|item| {
            if item.is_scalar() {
                coerce(field, ty, item)
            } else {
                Err(FilterError::type_mismatch(
                    field,
                    format!("list of {ty}"),
                    format!("list containing {}", item.type_name()),
                ))
            }
        })
        .collect()
}

// Parse trimmed text into the semantic type; `None` when it does not fit.
fn parse_text(ty: ScalarType, text: &str) -> Option<Value> {
    match ty {
        ScalarType::Text => Some(Value::Text(text.to_string())),
        ScalarType::Number => parse_number(text),
        ScalarType::Bool => parse_bool(text).map(Value::Bool),
        ScalarType::Date => Date::parse(text, format_description!("[year]-[month]-[day]"))
            .ok()
            .map(Value::Date),
        ScalarType::DateTime => parse_datetime(text).map(Value::DateTime),
        ScalarType::Time => parse_time(text).map(Value::Time),
        ScalarType::Uuid => Uuid::parse_str(text).ok().map(Value::Uuid),
    }
}

// `HH:MM[:SS[.fff]]`.
fn parse_time(text: &str) -> Option<Time> {
    Time::parse(
        text,
        format_description!("[hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| Time::parse(text, format_description!("[hour]:[minute]:[second]")))
    .or_else(|_| Time::parse(text, format_description!("[hour]:[minute]")))
    .ok()
}

// `YYYY-MM-DD(T| )HH:MM[:SS[.fff]]` with an optional `Z` or `±HH[[:]MM]`
// suffix. A missing offset is taken as UTC.
fn parse_datetime(text: &str) -> Option<OffsetDateTime> {
    let text = match text.as_bytes().get(10) {
        Some(b' ') => format!("{}T{}", &text[..10], &text[11..]),
        _ => text.to_string(),
    };
    let time_start = text.find('T')?;

    let (local, offset) = if let Some(local) = text.strip_suffix(['Z', 'z']) {
        (local, UtcOffset::UTC)
    } else if let Some(pos) = text[time_start..].rfind(['+', '-']) {
        let (local, offset) = text.split_at(time_start + pos);
        (local, parse_offset(offset)?)
    } else {
        (text.as_str(), UtcOffset::UTC)
    };
    let local = local.trim_end();

    PrimitiveDateTime::parse(
        local,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            local,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(local, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    })
    .ok()
    .map(|local| local.assume_offset(offset))
}

fn parse_offset(text: &str) -> Option<UtcOffset> {
    UtcOffset::parse(
        text,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .or_else(|_| {
        UtcOffset::parse(
            text,
            format_description!("[offset_hour sign:mandatory][offset_minute]"),
        )
    })
    .or_else(|_| UtcOffset::parse(text, format_description!("[offset_hour sign:mandatory]")))
    .ok()
}

fn parse_number(text: &str) -> Option<Value> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::Int(n));
    }

    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(Value::Float)
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
