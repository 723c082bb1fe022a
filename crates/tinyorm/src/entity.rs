//! The `Entity` trait: the static schema descriptor a struct exposes.
//!
//! Implemented by `#[derive(Entity)]`. The derive resolves column names and
//! the table name at compile time (tag parsing errors are compile errors) and
//! records each field's byte offset, which the direct-offset row binder
//! combines with a live base pointer at access time.

use crate::{FieldKind, OrmResult, Value};

/// Static metadata for one mapped struct field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// The struct field name.
    pub name: &'static str,
    /// The physical column name (explicit override or derived snake_case).
    pub column: &'static str,
    /// Semantic type of the field.
    pub kind: FieldKind,
    /// Whether the field is an `Option` and accepts NULL.
    pub nullable: bool,
    /// Byte offset of the field within the struct layout.
    pub offset: usize,
}

/// A struct that maps onto a table.
///
/// All the metadata is static; the registry materializes it into a cached
/// [`Model`](crate::Model) so runtime options (table/column renames) can be
/// applied without touching the type.
pub trait Entity: Send + Sync + 'static {
    /// The table name: an `#[orm(table = "...")]` override, or the
    /// snake_cased type name.
    fn table_name() -> &'static str;

    /// Field descriptors in declaration order.
    fn fields() -> &'static [FieldDef];

    /// A zeroed instance for row binding.
    fn blank() -> Self;

    /// Read one field by name. `None` for a name that is not a field.
    fn get(&self, field: &str) -> Option<Value>;

    /// Write one field by name, coercing the value into the field's
    /// representation. Fails with `UnknownField` or `Decode`.
    fn set(&mut self, field: &str, value: Value) -> OrmResult<()>;
}
