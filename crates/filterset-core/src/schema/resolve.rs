use crate::{
    error::FilterError,
    model::entity::EntityModel,
    query::{FieldPath, FieldRef, JoinHop},
    value::ScalarType,
};

///
/// ResolvedField
///
/// Terminal field handle plus the relationship hops needed to reach it.
/// Produced fresh per resolution; never cached.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedField {
    pub terminal: FieldRef,
    pub joins: Vec<JoinHop>,
}

///
/// ResolveField
///
/// Turns a field path into a `ResolvedField`. `declared` is the filter's
/// explicit type, if any; bound resolvers defer to the model instead.
///

pub trait ResolveField {
    fn resolve(
        &self,
        path: &FieldPath,
        declared: Option<ScalarType>,
    ) -> Result<ResolvedField, FilterError>;
}

///
/// Resolver
///
/// Capability chosen when the schema is built: full model introspection, or
/// flat type-tagged lookup without traversal.
///

#[derive(Clone, Copy, Debug)]
pub enum Resolver {
    Bound(BoundResolver),
    Unbound(UnboundResolver),
}

impl Resolver {
    #[must_use]
    pub const fn for_model(model: Option<&'static EntityModel>) -> Self {
        match model {
            Some(model) => Self::Bound(BoundResolver::new(model)),
            None => Self::Unbound(UnboundResolver),
        }
    }
}

impl ResolveField for Resolver {
    fn resolve(
        &self,
        path: &FieldPath,
        declared: Option<ScalarType>,
    ) -> Result<ResolvedField, FilterError> {
        match self {
            Self::Bound(resolver) => resolver.resolve(path, declared),
            Self::Unbound(resolver) => resolver.resolve(path, declared),
        }
    }
}

///
/// BoundResolver
///
/// Walks relationship fields of the bound model; every hop appends a join.
///

#[derive(Clone, Copy, Debug)]
pub struct BoundResolver {
    model: &'static EntityModel,
}

impl BoundResolver {
    #[must_use]
    pub const fn new(model: &'static EntityModel) -> Self {
        Self { model }
    }
}

impl ResolveField for BoundResolver {
    fn resolve(
        &self,
        path: &FieldPath,
        _declared: Option<ScalarType>,
    ) -> Result<ResolvedField, FilterError> {
        let unknown = |entity: &EntityModel, field: &str| FilterError::UnknownField {
            entity: entity.name.to_string(),
            field: field.to_string(),
        };

        let Some((terminal, hops)) = path.split_last() else {
            return Err(unknown(self.model, ""));
        };

        let mut current = self.model;
        let mut joins = Vec::with_capacity(hops.len());

        for hop in hops {
            let field = current.field(hop).ok_or_else(|| unknown(current, hop))?;
            // a scalar in the middle of a path is not a relationship
            let target = field
                .kind
                .relation_target()
                .ok_or_else(|| unknown(current, hop))?;

            joins.push(JoinHop {
                source: current.name,
                field: field.name,
                target: target.name,
            });
            current = target;
        }

        let field = current
            .field(terminal)
            .ok_or_else(|| unknown(current, terminal))?;

        if field.kind.relation_target().is_some() {
            return Err(FilterError::type_mismatch(
                path.to_string(),
                "scalar field",
                field.kind.to_string(),
            ));
        }

        Ok(ResolvedField {
            terminal: FieldRef::new(path.to_string(), field.kind.scalar_type()),
            joins,
        })
    }
}

///
/// UnboundResolver
///
/// Single-segment paths only; the type is whatever the filter declares.
///

#[derive(Clone, Copy, Debug)]
pub struct UnboundResolver;

impl ResolveField for UnboundResolver {
    fn resolve(
        &self,
        path: &FieldPath,
        declared: Option<ScalarType>,
    ) -> Result<ResolvedField, FilterError> {
        if path.is_nested() {
            return Err(FilterError::UnsupportedTraversal {
                path: path.to_string(),
            });
        }

        let terminal = path.terminal();
        if terminal.is_empty() {
            return Err(FilterError::UnknownField {
                entity: "<unbound>".to_string(),
                field: String::new(),
            });
        }

        Ok(ResolvedField {
            terminal: FieldRef::new(terminal, declared),
            joins: Vec::new(),
        })
    }
}
