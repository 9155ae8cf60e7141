//! Apply engine: folds one request's parameters onto a queryable.
mod plan;

#[cfg(test)]
mod tests;

use crate::{
    error::FilterError,
    filter::{FilterDef, FilterKind, apply_limit, apply_offset, apply_ordering, apply_search},
    query::{Queryable, SelectAll},
    schema::{FilterSchema, ResolveField},
    value::{Value, coerce},
};
use derive_more::{Deref, IntoIterator};
use plan::Plan;
use std::collections::BTreeMap;

// Shared shape of the two request-scoped maps.
macro_rules! value_map {
    ( $( $(#[$meta:meta])* $name:ident ),* $(,)? ) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug, Default, Deref, IntoIterator, PartialEq)]
            pub struct $name(#[into_iterator(owned, ref)] BTreeMap<String, Value>);

            impl $name {
                #[must_use]
                pub fn new() -> Self {
                    Self::default()
                }

                /// Builder-style insert.
                #[must_use]
                pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
                    self.insert(key, value);
                    self
                }

                pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
                    self.0.insert(key.into(), value.into());
                }

                /// Build from a JSON object; scalars and flat arrays only.
                pub fn from_json(json: serde_json::Value) -> Result<Self, FilterError> {
                    let serde_json::Value::Object(object) = json else {
                        return Err(FilterError::type_mismatch(
                            stringify!($name),
                            "object",
                            json_kind(&json),
                        ));
                    };

                    object
                        .into_iter()
                        .map(|(key, value)| {
                            let value = Value::from_json(&key, value)?;
                            Ok((key, value))
                        })
                        .collect::<Result<BTreeMap<_, _>, _>>()
                        .map(Self)
                }
            }

            impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for $name {
                fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                    Self(
                        iter.into_iter()
                            .map(|(key, value)| (key.into(), value.into()))
                            .collect(),
                    )
                }
            }
        )*
    };
}

value_map! {
    /// Request parameters, keyed by filter name. Read-only to the engine.
    InputValues,
    /// Caller-supplied extras handed to custom filter methods untouched.
    Context,
}

const fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "text",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}

///
/// FilterSet
///
/// One request's parameters bound to a schema. Applying never mutates the
/// schema; each call folds onto the queryable it is given.
///

#[derive(Clone, Debug)]
pub struct FilterSet<'s> {
    schema: &'s FilterSchema,
    input: InputValues,
    context: Context,
}

impl<'s> FilterSet<'s> {
    #[must_use]
    pub fn new(schema: &'s FilterSchema, input: InputValues) -> Self {
        Self {
            schema,
            input,
            context: Context::default(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub const fn schema(&self) -> &'s FilterSchema {
        self.schema
    }

    #[must_use]
    pub const fn input(&self) -> &InputValues {
        &self.input
    }

    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Start from "select all" for the bound model, then apply.
    pub fn apply_model<Q: SelectAll>(&self) -> Result<Q, FilterError> {
        let model = self.schema.model().ok_or(FilterError::Unbound)?;

        self.apply(Q::select_all(model))
    }

    /// Fold every present parameter, plus defaulted filters, onto `query`.
    ///
    /// Unknown parameters are rejected before anything is applied. Filters
    /// run in declaration order into a staged plan; `query` is only touched
    /// once every filter has succeeded, so a failed apply leaves it as given.
    pub fn apply<Q: Queryable>(&self, mut query: Q) -> Result<Q, FilterError> {
        self.check_parameters()?;

        let mut plan = Plan::default();
        for def in self.schema {
            let value = self.input.get(def.name()).filter(|value| !value.is_null());

            if value.is_none() && !def.has_default() {
                tracing::trace!(filter = def.name(), "filter absent; skipped");
                continue;
            }

            self.apply_filter(def, value, &mut plan)?;
        }

        plan.replay(&mut query);

        Ok(query)
    }

    fn check_parameters(&self) -> Result<(), FilterError> {
        match self.input.keys().find(|key| !self.schema.contains(key)) {
            Some(name) => Err(FilterError::UnknownParameter { name: name.clone() }),
            None => Ok(()),
        }
    }

    fn apply_filter(
        &self,
        def: &FilterDef,
        value: Option<&Value>,
        query: &mut dyn Queryable,
    ) -> Result<(), FilterError> {
        let name = def.name();
        let resolver = self.schema.resolver();

        match (def.kind(), value) {
            (FilterKind::Value { .. }, Some(value)) => {
                let resolved = resolver.resolve(&def.field_path(), def.declared_type())?;
                let predicate = def.operator().build(&resolved.terminal, value.clone())?;

                for hop in &resolved.joins {
                    query.join(hop);
                }
                tracing::debug!(filter = name, predicate = %predicate, "filter applied");
                query.filter(predicate);

                Ok(())
            }

            (FilterKind::Method { method, value_type }, Some(value)) => {
                let value = match value_type {
                    Some(ty) => coerce(name, *ty, value.clone())?,
                    None => value.clone(),
                };
                tracing::debug!(filter = name, value = %value, "filter method invoked");

                method(query, def.field_path().terminal(), &value, &self.context)
            }

            (FilterKind::Search(spec), Some(value)) => {
                apply_search(name, spec, resolver, query, value)
            }
            (FilterKind::Ordering(spec), value) => {
                apply_ordering(name, spec, resolver, query, value)
            }
            (FilterKind::Offset, Some(value)) => apply_offset(name, query, value),
            (FilterKind::Limit(spec), value) => apply_limit(name, spec, query, value),

            // absent and not defaulted; filtered out by the caller
            (_, None) => Ok(()),
        }
    }
}
