//! Row binding and field extraction strategies.
//!
//! Two interchangeable implementations of the same contract: read one field
//! off an entity by name, or populate an entity from a cursor row. Result
//! columns are matched to fields by name, so column order never matters, and
//! an unknown result column is an error rather than a skip.

mod accessor;
mod direct;

pub use accessor::AccessorValuer;
pub use direct::DirectValuer;

use crate::{Entity, Model, OrmError, OrmResult, Value};

/// A cursor that reports a different number of values than columns is
/// malformed; truncating silently would bind a row misaligned with its
/// names.
pub(crate) fn check_row_width(columns: &[String], row: &[Value]) -> OrmResult<()> {
    if columns.len() != row.len() {
        return Err(OrmError::session(format!(
            "result row has {} values for {} columns",
            row.len(),
            columns.len()
        )));
    }
    Ok(())
}

/// How entities are read and written during statement execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Go through the generated match-by-name accessors. Safe, the default.
    #[default]
    Accessor,
    /// Go through raw pointers at precomputed field offsets.
    Direct,
}

/// The extraction/binding contract both strategies satisfy.
///
/// `model` must be the registered model of `T`; the strategies trust its
/// field metadata (the direct one trusts the byte offsets).
pub trait Valuer<T: Entity> {
    /// The current value of one field, by struct field name.
    fn field(model: &Model, entity: &T, name: &str) -> OrmResult<Value>;

    /// Populate `entity` from one cursor row, matching result columns to
    /// fields by name.
    fn bind_row(
        model: &Model,
        entity: &mut T,
        columns: &[String],
        row: Vec<Value>,
    ) -> OrmResult<()>;
}

impl AccessMode {
    pub(crate) fn field<T: Entity>(
        self,
        model: &Model,
        entity: &T,
        name: &str,
    ) -> OrmResult<Value> {
        match self {
            AccessMode::Accessor => AccessorValuer::field(model, entity, name),
            AccessMode::Direct => DirectValuer::field(model, entity, name),
        }
    }

    pub(crate) fn bind_row<T: Entity>(
        self,
        model: &Model,
        entity: &mut T,
        columns: &[String],
        row: Vec<Value>,
    ) -> OrmResult<()> {
        match self {
            AccessMode::Accessor => AccessorValuer::bind_row(model, entity, columns, row),
            AccessMode::Direct => DirectValuer::bind_row(model, entity, columns, row),
        }
    }
}
