//! Core runtime for FilterSet: values, runtime model metadata, the predicate
//! AST and operator table, field resolution, filter schemas, and the apply
//! engine that folds request parameters onto a queryable.
#![warn(unreachable_pub)]

pub mod apply;
pub mod error;
pub mod filter;
pub mod model;
pub mod query;
pub mod schema;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use apply::{Context, FilterSet, InputValues};
pub use error::{FilterError, SchemaError};

///
/// CONSTANTS
///

/// Default page size contributed by a `LimitFilter` without explicit config.
pub const DEFAULT_LIMIT: u64 = 100;

///
/// Prelude
///
/// Prelude contains only declaration and apply vocabulary.
/// Errors, resolvers, and evaluation helpers are not re-exported here.
///

pub mod prelude {
    pub use crate::{
        apply::{Context, FilterSet, InputValues},
        filter::{
            BooleanFilter, CharFilter, DateFilter, DateTimeFilter, Filter, FilterDef,
            LimitFilter, MethodFilter, NumberFilter, OffsetFilter, OrderingFilter,
            SearchingFilter, TimeFilter, UUIDFilter,
        },
        model::{entity::EntityModel, field::FieldKind, field::FieldModel},
        query::{Operator, Predicate, Queryable, Select, SelectAll},
        schema::FilterSchema,
        value::{ScalarType, Value},
    };
}
