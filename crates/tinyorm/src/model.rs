//! The materialized schema descriptor for an entity type.

use std::any::TypeId;
use std::collections::HashMap;

use crate::{Entity, FieldKind, OrmError, OrmResult};

/// Metadata for one mapped field, owned by a [`Model`].
#[derive(Debug, Clone)]
pub struct FieldMeta {
    /// The struct field name.
    pub name: String,
    /// The physical column name.
    pub column: String,
    /// Semantic type of the field.
    pub kind: FieldKind,
    /// Whether the field accepts NULL.
    pub nullable: bool,
    /// Byte offset of the field within the struct layout.
    pub offset: usize,
}

/// Derived table/column metadata for one entity type.
///
/// Immutable once published to the registry. `fields` preserves declaration
/// order (the insert column order); `by_name` and `by_column` index into the
/// same slice, so every field is reachable from both maps.
#[derive(Debug)]
pub struct Model {
    entity_type: TypeId,
    table_name: String,
    fields: Vec<FieldMeta>,
    by_name: HashMap<String, usize>,
    by_column: HashMap<String, usize>,
}

/// A mutation applied to a freshly derived model before it is published.
pub type ModelOpt = Box<dyn FnOnce(&mut Model) -> OrmResult<()>>;

/// Override the derived table name.
pub fn with_table_name(table: impl Into<String>) -> ModelOpt {
    let table = table.into();
    Box::new(move |m| {
        if !table.is_empty() {
            m.table_name = table;
        }
        Ok(())
    })
}

/// Override the derived column name of one field.
///
/// Fails with [`OrmError::UnknownField`] if the field does not exist.
pub fn with_column_name(field: impl Into<String>, column: impl Into<String>) -> ModelOpt {
    let field = field.into();
    let column = column.into();
    Box::new(move |m| m.set_column(&field, column))
}

impl Model {
    /// Materialize the static descriptor of `T`.
    pub fn of<T: Entity>() -> Model {
        let defs = T::fields();
        let mut fields = Vec::with_capacity(defs.len());
        let mut by_name = HashMap::with_capacity(defs.len());
        let mut by_column = HashMap::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            fields.push(FieldMeta {
                name: def.name.to_string(),
                column: def.column.to_string(),
                kind: def.kind,
                nullable: def.nullable,
                offset: def.offset,
            });
            by_name.insert(def.name.to_string(), i);
            by_column.insert(def.column.to_string(), i);
        }
        Model {
            entity_type: TypeId::of::<T>(),
            table_name: T::table_name().to_string(),
            fields,
            by_name,
            by_column,
        }
    }

    /// The `TypeId` of the entity type this model was derived from. The
    /// direct-offset binder checks it before trusting the byte offsets.
    pub fn entity_type(&self) -> TypeId {
        self.entity_type
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    /// Look up a field by its struct field name.
    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Look up a field by its physical column name.
    pub fn field_by_column(&self, column: &str) -> Option<&FieldMeta> {
        self.by_column.get(column).map(|&i| &self.fields[i])
    }

    /// Rename one field's column, keeping both indices consistent.
    fn set_column(&mut self, field: &str, column: String) -> OrmResult<()> {
        let &i = self
            .by_name
            .get(field)
            .ok_or_else(|| OrmError::unknown_field(field))?;
        self.by_column.remove(&self.fields[i].column);
        self.by_column.insert(column.clone(), i);
        self.fields[i].column = column;
        Ok(())
    }
}
