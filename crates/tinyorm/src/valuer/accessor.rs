use super::Valuer;
use crate::{Entity, Model, OrmError, OrmResult, Value};

/// The safe strategy: everything goes through the accessors generated by
/// `#[derive(Entity)]`.
pub struct AccessorValuer;

impl<T: Entity> Valuer<T> for AccessorValuer {
    fn field(_model: &Model, entity: &T, name: &str) -> OrmResult<Value> {
        entity
            .get(name)
            .ok_or_else(|| OrmError::unknown_field(name))
    }

    fn bind_row(
        model: &Model,
        entity: &mut T,
        columns: &[String],
        row: Vec<Value>,
    ) -> OrmResult<()> {
        super::check_row_width(columns, &row)?;
        for (column, value) in columns.iter().zip(row) {
            let meta = model
                .field_by_column(column)
                .ok_or_else(|| OrmError::unknown_column(column))?;
            entity.set(&meta.name, value)?;
        }
        Ok(())
    }
}
