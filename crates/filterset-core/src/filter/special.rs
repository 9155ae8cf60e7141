use crate::{
    error::FilterError,
    filter::{LimitSpec, OrderingSpec, SearchSpec},
    query::{JoinHop, OrderDirection, OrderSpec, Predicate, Queryable},
    schema::{ResolveField, Resolver},
    value::{ScalarType, Value, coerce},
};

///
/// Apply a search term across every configured field, OR-combined.
///
/// Blank terms contribute nothing. Search fields are text fields (checked
/// when the schema is built), so any failure to build a field's predicate
/// is reported as is.
///
pub(crate) fn apply_search(
    name: &str,
    spec: &SearchSpec,
    resolver: &Resolver,
    query: &mut dyn Queryable,
    value: &Value,
) -> Result<(), FilterError> {
    let Value::Text(term) = coerce(name, ScalarType::Text, value.clone())? else {
        return Err(FilterError::type_mismatch(name, "text", value.type_name()));
    };
    let term = term.trim();
    if term.is_empty() {
        tracing::trace!(filter = name, "blank search term ignored");
        return Ok(());
    }

    let mut joins: Vec<JoinHop> = Vec::new();
    let mut disjuncts = Vec::with_capacity(spec.fields.len());

    for (path, op) in &spec.fields {
        let resolved = resolver.resolve(path, Some(ScalarType::Text))?;

        disjuncts.push(op.build(&resolved.terminal, Value::Text(term.to_string()))?);
        for hop in resolved.joins {
            if !joins.contains(&hop) {
                joins.push(hop);
            }
        }
    }

    for hop in &joins {
        query.join(hop);
    }
    let predicate = Predicate::any_of(disjuncts);
    tracing::debug!(filter = name, predicate = %predicate, "search applied");
    query.filter(predicate);

    Ok(())
}

///
/// Apply an ordering from the input, or the filter's default when absent.
///
/// Keys are exposed names, `-` prefixed for descending. Every key must be in
/// the allow-list; one unknown key rejects the whole ordering.
///
pub(crate) fn apply_ordering(
    name: &str,
    spec: &OrderingSpec,
    resolver: &Resolver,
    query: &mut dyn Queryable,
    value: Option<&Value>,
) -> Result<(), FilterError> {
    let mut keys = match value {
        Some(value) => ordering_keys(name, value)?,
        None => Vec::new(),
    };
    if keys.is_empty() {
        keys.clone_from(&spec.default);
    }
    if keys.is_empty() {
        return Ok(());
    }

    let mut fields = Vec::with_capacity(keys.len());
    for key in &keys {
        let (bare, direction) = match key.strip_prefix('-') {
            Some(bare) => (bare, OrderDirection::Desc),
            None => (key.as_str(), OrderDirection::Asc),
        };
        let path = spec
            .lookup(bare)
            .ok_or_else(|| FilterError::InvalidOrdering { key: key.clone() })?;

        let resolved = resolver.resolve(path, None)?;
        for hop in &resolved.joins {
            query.join(hop);
        }
        fields.push((resolved.terminal.path, direction));
    }

    let order = OrderSpec { fields };
    tracing::debug!(filter = name, order = %order, "ordering applied");
    query.order_by(order);

    Ok(())
}

// Comma separated text or a list of text keys.
fn ordering_keys(name: &str, value: &Value) -> Result<Vec<String>, FilterError> {
    let split = |text: &str| {
        text.split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    match value {
        Value::Text(text) => Ok(split(text)),
        Value::List(items) => {
            let mut keys = Vec::with_capacity(items.len());
            for item in items {
                let text = item
                    .as_text()
                    .ok_or_else(|| FilterError::type_mismatch(name, "ordering key", item.type_name()))?;
                keys.extend(split(text));
            }
            Ok(keys)
        }
        other => Err(FilterError::type_mismatch(
            name,
            "ordering keys",
            other.type_name(),
        )),
    }
}

pub(crate) fn apply_offset(
    name: &str,
    query: &mut dyn Queryable,
    value: &Value,
) -> Result<(), FilterError> {
    let offset = non_negative(name, value)?;
    tracing::debug!(filter = name, offset, "offset applied");
    query.offset(offset);

    Ok(())
}

///
/// Apply the requested limit, clamped to the maximum. Absent input falls
/// back to the filter's default, so a limit always contributes.
///
pub(crate) fn apply_limit(
    name: &str,
    spec: &LimitSpec,
    query: &mut dyn Queryable,
    value: Option<&Value>,
) -> Result<(), FilterError> {
    let requested = value.map(|value| non_negative(name, value)).transpose()?;
    let limit = spec.effective(requested);
    tracing::debug!(filter = name, ?requested, limit, "limit applied");
    query.limit(limit);

    Ok(())
}

// Offsets and limits are non-negative integers; integral floats are accepted.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn non_negative(name: &str, value: &Value) -> Result<u64, FilterError> {
    let negative = || FilterError::invalid_value(name, "must not be negative");

    match coerce(name, ScalarType::Number, value.clone())? {
        Value::Int(n) => u64::try_from(n).map_err(|_| negative()),
        Value::Float(f) if f.fract() == 0.0 => {
            if f < 0.0 {
                Err(negative())
            } else if f > u64::MAX as f64 {
                Err(FilterError::invalid_value(name, "out of range"))
            } else {
                Ok(f as u64)
            }
        }
        other => Err(FilterError::type_mismatch(
            name,
            "integer",
            other.to_string(),
        )),
    }
}
