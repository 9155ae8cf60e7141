//! Runtime model metadata.
//!
//! Static descriptions of entities and their fields, standing in for the host
//! ORM's introspection. A bound `FilterSchema` resolves field paths against
//! these; an unbound schema never touches them.
pub mod entity;
pub mod field;
