//! Filter schemas: the named, ordered, validated set of filter definitions
//! a `FilterSet` applies.
mod describe;
mod resolve;


use crate::{
    apply::{FilterSet, InputValues},
    error::{FilterError, SchemaError},
    filter::{Filter, FilterDef, FilterKind, LimitFilter, OffsetFilter},
    model::entity::EntityModel,
    query::Operator,
    value::ScalarType,
};
use std::collections::BTreeSet;

// re-exports
pub use describe::FilterDoc;
pub use resolve::{BoundResolver, ResolveField, ResolvedField, Resolver, UnboundResolver};

///
/// FilterSchema
///
/// Immutable once built. Filters keep declaration order, which is also the
/// order they are applied in.
///

#[derive(Clone, Debug)]
pub struct FilterSchema {
    filters: Vec<FilterDef>,
    model: Option<&'static EntityModel>,
    resolver: Resolver,
}

impl FilterSchema {
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Preset base schema exposing `limit` and `offset`.
    pub fn limit_offset() -> Result<Self, SchemaError> {
        Self::builder()
            .filter("limit", LimitFilter::new())
            .filter("offset", OffsetFilter::new())
            .build()
    }

    #[must_use]
    pub const fn model(&self) -> Option<&'static EntityModel> {
        self.model
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.model.is_some()
    }

    #[must_use]
    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FilterDef> {
        self.filters.iter().find(|def| def.name() == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Filters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FilterDef> {
        self.filters.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(FilterDef::name)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Bind request parameters to this schema.
    #[must_use]
    pub fn filter_set(&self, input: InputValues) -> FilterSet<'_> {
        FilterSet::new(self, input)
    }

    /// Per-filter documentation in declaration order.
    #[must_use]
    pub fn describe(&self) -> Vec<FilterDoc> {
        self.filters.iter().map(FilterDoc::from_def).collect()
    }
}

impl<'a> IntoIterator for &'a FilterSchema {
    type Item = &'a FilterDef;
    type IntoIter = std::slice::Iter<'a, FilterDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}

///
/// SchemaBuilder
///
/// Collects declarations; nothing is validated until `build`.
///

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    model: Option<&'static EntityModel>,
    inherited: Vec<FilterDef>,
    generated: Vec<String>,
    declared: Vec<FilterDef>,
    bound_base: bool,
}

impl SchemaBuilder {
    /// Bind the schema to a model, enabling traversal and generic filters.
    #[must_use]
    pub const fn model(mut self, model: &'static EntityModel) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub fn filter(mut self, name: impl Into<String>, filter: impl Into<FilterDef>) -> Self {
        let mut def = filter.into();
        def.name = name.into();
        self.declared.push(def);
        self
    }

    /// Auto-declare generic `eq` filters for model fields, unless a filter
    /// with the same name is declared explicitly.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generated.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Inherit every filter of an unbound base. Inherited filters come
    /// first; a declared filter of the same name replaces the inherited one
    /// in place.
    #[must_use]
    pub fn extend(mut self, base: &FilterSchema) -> Self {
        if base.is_bound() {
            self.bound_base = true;
        } else {
            self.inherited.extend(base.filters.iter().cloned());
        }
        self
    }

    pub fn build(self) -> Result<FilterSchema, SchemaError> {
        if self.bound_base {
            return Err(SchemaError::BoundBase);
        }

        let resolver = Resolver::for_model(self.model);
        let defs = self.merge()?;

        let filters = defs
            .into_iter()
            .map(|def| finalize(def, self.model, &resolver))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            filters = filters.len(),
            bound = self.model.is_some(),
            model = self.model.map_or("<unbound>", |model| model.name),
            "filter schema built"
        );

        Ok(FilterSchema {
            filters,
            model: self.model,
            resolver,
        })
    }

    // Inherited, then generated, then declared; names stay unique.
    fn merge(&self) -> Result<Vec<FilterDef>, SchemaError> {
        let mut merged = self.inherited.clone();
        let inherited_len = merged.len();
        let mut overridden = BTreeSet::new();

        for name in &self.generated {
            let explicit = self.declared.iter().any(|def| def.name() == name);
            if explicit || merged.iter().any(|def| def.name() == name) {
                continue;
            }
            let mut def = FilterDef::from(Filter::new().operator(Operator::Eq));
            def.name.clone_from(name);
            merged.push(def);
        }

        for def in &self.declared {
            match merged.iter().position(|existing| existing.name() == def.name()) {
                Some(pos) if pos < inherited_len && overridden.insert(pos) => {
                    merged[pos] = def.clone();
                }
                Some(_) => {
                    return Err(SchemaError::DuplicateFilter {
                        name: def.name().to_string(),
                    });
                }
                None => merged.push(def.clone()),
            }
        }

        Ok(merged)
    }
}

// Validate one filter and concretise generic filters against the model.
fn finalize(
    mut def: FilterDef,
    model: Option<&'static EntityModel>,
    resolver: &Resolver,
) -> Result<FilterDef, SchemaError> {
    let name = def.name().to_string();
    let invalid = |err: FilterError| SchemaError::invalid(name.clone(), err);

    match def.kind().clone() {
        FilterKind::Value { generic } => {
            if generic && model.is_none() {
                return Err(SchemaError::UntypedFilter { name });
            }

            let resolved = resolver
                .resolve(&def.field_path(), def.declared_type())
                .map_err(invalid)?;

            if model.is_some() {
                let Some(field_type) = resolved.terminal.ty else {
                    return Err(SchemaError::UnsuitableFilter {
                        name,
                        filter: def.form(),
                        kind: "unsupported".to_string(),
                    });
                };
                if generic {
                    def.declared_type = Some(field_type);
                } else if def.declared_type() != Some(field_type) {
                    return Err(SchemaError::UnsuitableFilter {
                        name,
                        filter: def.form(),
                        kind: field_type.to_string(),
                    });
                }
            }

            let ty = def.declared_type().unwrap_or(ScalarType::Text);
            if def.operator().requires_text() && !ty.is_text() {
                return Err(invalid(FilterError::type_mismatch(
                    resolved.terminal.path,
                    format!("text field for '{}'", def.operator()),
                    ty.to_string(),
                )));
            }
        }

        FilterKind::Method { .. } | FilterKind::Offset | FilterKind::Limit(_) => {}

        FilterKind::Search(spec) => {
            if spec.fields.is_empty() {
                return Err(SchemaError::MissingFields { name });
            }
            for (path, _) in &spec.fields {
                let resolved = resolver
                    .resolve(path, Some(ScalarType::Text))
                    .map_err(invalid)?;
                match resolved.terminal.ty {
                    Some(ty) if ty.is_text() => {}
                    ty => {
                        return Err(SchemaError::UnsuitableFilter {
                            name,
                            filter: def.form(),
                            kind: ty.map_or_else(
                                || "unsupported".to_string(),
                                |ty| ty.to_string(),
                            ),
                        });
                    }
                }
            }
        }

        FilterKind::Ordering(spec) => {
            if spec.fields.is_empty() {
                return Err(SchemaError::MissingFields { name });
            }
            for (_, path) in &spec.fields {
                resolver.resolve(path, None).map_err(invalid)?;
            }
            for key in &spec.default {
                let bare = key.strip_prefix('-').unwrap_or(key);
                if spec.lookup(bare).is_none() {
                    return Err(invalid(FilterError::InvalidOrdering { key: key.clone() }));
                }
            }
        }
    }

    Ok(def)
}
