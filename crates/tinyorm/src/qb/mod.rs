//! Query building: the shared renderer plus one module per statement kind.

pub(crate) mod builder;
mod delete;
mod insert;
mod select;
mod update;

pub use delete::Deletor;
pub use insert::{Inserter, Upsert, UpsertBuilder};
pub use select::Selector;
pub use update::Updater;

use crate::Value;

/// A built statement: the SQL text and its bound arguments, in placeholder
/// order. Immutable once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub args: Vec<Value>,
}
