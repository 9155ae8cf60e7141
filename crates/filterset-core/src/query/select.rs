use crate::{
    model::entity::EntityModel,
    query::{
        CompareOp, ComparePredicate, JoinHop, OrderDirection, OrderSpec, Predicate, Queryable,
        SelectAll,
    },
    value::Value,
};
use regex::{Regex, RegexBuilder};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    fmt,
};

///
/// Select
///
/// Default queryable: records the plan the apply engine builds. It can be
/// handed to a real backend for compilation, or evaluated in memory against
/// rows for tests and prototyping.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Select {
    pub model: Option<&'static str>,
    pub joins: Vec<JoinHop>,
    pub predicate: Option<Predicate>,
    pub order: Option<OrderSpec>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Select {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_model(model: &'static EntityModel) -> Self {
        Self {
            model: Some(model.name),
            ..Self::default()
        }
    }

    /// Whether a row satisfies the recorded predicate.
    #[must_use]
    pub fn matches<R: Row + ?Sized>(&self, row: &R) -> bool {
        self.predicate
            .as_ref()
            .is_none_or(|predicate| eval(row, predicate))
    }

    /// Evaluate the full plan (predicate, ordering, offset, limit) against
    /// in-memory rows. Rows expose joined fields under their dotted path.
    #[must_use]
    pub fn execute<'a, R: Row>(&self, rows: &'a [R]) -> Vec<&'a R> {
        let mut selected: Vec<&R> = rows.iter().filter(|row| self.matches(*row)).collect();

        if let Some(order) = &self.order {
            selected.sort_by(|a, b| compare_rows(*a, *b, order));
        }

        let offset = self.offset.map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX));
        let limit = self.limit.map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));

        selected.into_iter().skip(offset).take(limit).collect()
    }
}

impl Queryable for Select {
    fn filter(&mut self, predicate: Predicate) {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
    }

    fn join(&mut self, hop: &JoinHop) {
        if !self.joins.contains(hop) {
            self.joins.push(*hop);
        }
    }

    fn order_by(&mut self, order: OrderSpec) {
        self.order = Some(order);
    }

    fn limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    fn offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }
}

impl SelectAll for Select {
    fn select_all(model: &'static EntityModel) -> Self {
        Self::from_model(model)
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT * FROM {}", self.model.unwrap_or("<source>"))?;
        for hop in &self.joins {
            write!(f, " JOIN {hop}")?;
        }
        if let Some(predicate) = &self.predicate {
            write!(f, " WHERE {predicate}")?;
        }
        if let Some(order) = &self.order {
            write!(f, " ORDER BY {order}")?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {offset}")?;
        }

        Ok(())
    }
}

///
/// Row
///
/// Abstraction over a row-like value exposing fields by dotted path.
/// `None` means the field is missing; a present null is `Some(Value::Null)`.
///

pub trait Row {
    fn field(&self, path: &str) -> Option<Value>;
}

impl Row for BTreeMap<String, Value> {
    fn field(&self, path: &str) -> Option<Value> {
        self.get(path).cloned()
    }
}

impl<S: std::hash::BuildHasher> Row for HashMap<String, Value, S> {
    fn field(&self, path: &str) -> Option<Value> {
        self.get(path).cloned()
    }
}

// Missing and null sort first ascending, mirroring NULLS FIRST.
fn compare_rows<R: Row + ?Sized>(a: &R, b: &R, order: &OrderSpec) -> Ordering {
    for (field, direction) in &order.fields {
        let left = a.field(field).filter(|v| !v.is_null());
        let right = b.field(field).filter(|v| !v.is_null());

        let ordering = match (&left, &right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(l), Some(r)) => l.compare(r).unwrap_or(Ordering::Equal),
        };
        let ordering = match direction {
            OrderDirection::Asc => ordering,
            OrderDirection::Desc => ordering.reverse(),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

///
/// Evaluate a predicate against a single row.
///
/// Comparisons against missing or null fields never match, as in SQL.
/// Any unsupported comparison simply evaluates to `false`.
///
pub(crate) fn eval<R: Row + ?Sized>(row: &R, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::True => true,
        Predicate::False => false,
        Predicate::And(children) => children.iter().all(|child| eval(row, child)),
        Predicate::Or(children) => children.iter().any(|child| eval(row, child)),
        Predicate::Not(inner) => !eval(row, inner),
        Predicate::Compare(cmp) => match row.field(&cmp.field) {
            Some(Value::Null) | None => false,
            Some(actual) => eval_compare(&actual, cmp),
        },
        Predicate::IsNull { field } => matches!(row.field(field), None | Some(Value::Null)),
        Predicate::IsNotNull { field } => !matches!(row.field(field), None | Some(Value::Null)),
    }
}

fn eval_compare(actual: &Value, cmp: &ComparePredicate) -> bool {
    let ordering = || actual.compare(&cmp.value);

    match cmp.op {
        CompareOp::Eq => ordering() == Some(Ordering::Equal),
        CompareOp::Ne => ordering().is_some_and(Ordering::is_ne),
        CompareOp::Lt => ordering() == Some(Ordering::Less),
        CompareOp::Lte => ordering().is_some_and(Ordering::is_le),
        CompareOp::Gt => ordering() == Some(Ordering::Greater),
        CompareOp::Gte => ordering().is_some_and(Ordering::is_ge),
        CompareOp::In => in_list(actual, &cmp.value),
        CompareOp::NotIn => !in_list(actual, &cmp.value),
        CompareOp::Contains => text_pair(actual, &cmp.value).is_some_and(|(a, v)| a.contains(v)),
        CompareOp::StartsWith => {
            text_pair(actual, &cmp.value).is_some_and(|(a, v)| a.starts_with(v))
        }
        CompareOp::EndsWith => text_pair(actual, &cmp.value).is_some_and(|(a, v)| a.ends_with(v)),
        CompareOp::Like => pattern_matches(actual, &cmp.value, false, like_regex),
        CompareOp::ILike => pattern_matches(actual, &cmp.value, true, like_regex),
        CompareOp::Regexp => pattern_matches(actual, &cmp.value, false, str::to_string),
        CompareOp::IRegexp => pattern_matches(actual, &cmp.value, true, str::to_string),
    }
}

fn in_list(actual: &Value, list: &Value) -> bool {
    match list {
        Value::List(items) => items
            .iter()
            .any(|item| actual.compare(item) == Some(Ordering::Equal)),
        _ => false,
    }
}

fn text_pair<'a>(actual: &'a Value, value: &'a Value) -> Option<(&'a str, &'a str)> {
    Some((actual.as_text()?, value.as_text()?))
}

fn pattern_matches(
    actual: &Value,
    pattern: &Value,
    case_insensitive: bool,
    to_regex: fn(&str) -> String,
) -> bool {
    let Some((text, pattern)) = text_pair(actual, pattern) else {
        return false;
    };

    compile(&to_regex(pattern), case_insensitive).is_some_and(|re| re.is_match(text))
}

fn compile(pattern: &str, case_insensitive: bool) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .ok()
}

// Translate an SQL LIKE pattern (`%`, `_`, `\` escape) into an anchored regex.
fn like_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?s)^");

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    out.push('$');
    out
}
