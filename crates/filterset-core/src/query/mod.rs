//! Query-side vocabulary: the predicate AST, the operator table, and the
//! queryable capability the apply engine folds predicates onto.
mod field;
mod operator;
mod predicate;
mod select;


use crate::model::entity::EntityModel;
use std::fmt;

// re-exports
pub use field::{FieldPath, FieldRef};
pub use operator::{Operator, build};
pub use predicate::{CompareOp, ComparePredicate, Predicate};
pub use select::{Row, Select};

///
/// Queryable
///
/// Minimal capability the engine needs from a query representation.
/// Object safe so custom filter methods can receive `&mut dyn Queryable`.
///
/// CONTRACT: successive `filter` calls are conjunctive.
///

pub trait Queryable {
    /// Conjoin a predicate with everything already applied.
    fn filter(&mut self, predicate: Predicate);

    /// Make a relationship reachable for subsequent predicates.
    fn join(&mut self, hop: &JoinHop);

    fn order_by(&mut self, order: OrderSpec);

    fn limit(&mut self, limit: u64);

    fn offset(&mut self, offset: u64);
}

impl<Q: Queryable + ?Sized> Queryable for &mut Q {
    fn filter(&mut self, predicate: Predicate) {
        (**self).filter(predicate);
    }

    fn join(&mut self, hop: &JoinHop) {
        (**self).join(hop);
    }

    fn order_by(&mut self, order: OrderSpec) {
        (**self).order_by(order);
    }

    fn limit(&mut self, limit: u64) {
        (**self).limit(limit);
    }

    fn offset(&mut self, offset: u64) {
        (**self).offset(offset);
    }
}

///
/// SelectAll
///
/// Queryables that can be created as "select everything" for a model.
///

pub trait SelectAll: Queryable + Sized {
    fn select_all(model: &'static EntityModel) -> Self;
}

///
/// JoinHop
///
/// One relationship crossing on the way to a terminal field.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JoinHop {
    /// Entity the relation is declared on.
    pub source: &'static str,
    /// Relation field name on `source`.
    pub field: &'static str,
    /// Entity reached through the relation.
    pub target: &'static str,
}

impl fmt::Display for JoinHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} -> {}", self.source, self.field, self.target)
    }
}

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

///
/// OrderSpec
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderSpec {
    pub fields: Vec<(String, OrderDirection)>,
}

impl fmt::Display for OrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, direction)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match direction {
                OrderDirection::Asc => write!(f, "{field} ASC")?,
                OrderDirection::Desc => write!(f, "{field} DESC")?,
            }
        }

        Ok(())
    }
}
