use std::any::TypeId;

use super::Valuer;
use crate::model::FieldMeta;
use crate::{Entity, FieldKind, FromValue, Model, OrmError, OrmResult, Value};

/// The unsafe strategy: fields are read and written through raw pointers at
/// the byte offsets recorded by the derive.
///
/// The base pointer is recomputed from the live reference on every access,
/// never cached, so the entity is free to move between calls. Soundness
/// rests on `model` being the model of `T`; both entry points verify the
/// model's recorded entity type against `T` and refuse a mismatch, so by
/// the time any raw access happens the offsets and kinds are known to
/// describe the types sitting at those addresses.
pub struct DirectValuer;

/// Refuse a model derived from some other entity type.
fn check_model<T: Entity>(model: &Model) -> OrmResult<()> {
    if model.entity_type() != TypeId::of::<T>() {
        return Err(OrmError::ModelMismatch);
    }
    Ok(())
}

/// Expands to one arm per `(FieldKind, nullable)` pair, invoking `$with`
/// with the concrete field type.
macro_rules! dispatch_kind {
    ($kind:expr, $nullable:expr, $with:ident) => {
        match ($kind, $nullable) {
            (FieldKind::Bool, false) => $with!(bool),
            (FieldKind::Bool, true) => $with!(Option<bool>),
            (FieldKind::I8, false) => $with!(i8),
            (FieldKind::I8, true) => $with!(Option<i8>),
            (FieldKind::I16, false) => $with!(i16),
            (FieldKind::I16, true) => $with!(Option<i16>),
            (FieldKind::I32, false) => $with!(i32),
            (FieldKind::I32, true) => $with!(Option<i32>),
            (FieldKind::I64, false) => $with!(i64),
            (FieldKind::I64, true) => $with!(Option<i64>),
            (FieldKind::U8, false) => $with!(u8),
            (FieldKind::U8, true) => $with!(Option<u8>),
            (FieldKind::U16, false) => $with!(u16),
            (FieldKind::U16, true) => $with!(Option<u16>),
            (FieldKind::U32, false) => $with!(u32),
            (FieldKind::U32, true) => $with!(Option<u32>),
            (FieldKind::U64, false) => $with!(u64),
            (FieldKind::U64, true) => $with!(Option<u64>),
            (FieldKind::F32, false) => $with!(f32),
            (FieldKind::F32, true) => $with!(Option<f32>),
            (FieldKind::F64, false) => $with!(f64),
            (FieldKind::F64, true) => $with!(Option<f64>),
            (FieldKind::Text, false) => $with!(String),
            (FieldKind::Text, true) => $with!(Option<String>),
            (FieldKind::Bytes, false) => $with!(Vec<u8>),
            (FieldKind::Bytes, true) => $with!(Option<Vec<u8>>),
        }
    };
}

/// SAFETY: `ptr` must point at a live field of the type described by `meta`.
unsafe fn read_field(ptr: *const u8, meta: &FieldMeta) -> Value {
    macro_rules! read_as {
        ($ty:ty) => {
            Value::from(unsafe { (*(ptr as *const $ty)).clone() })
        };
    }
    dispatch_kind!(meta.kind, meta.nullable, read_as)
}

/// SAFETY: `ptr` must point at a live, initialized field of the type
/// described by `meta`. Writes by deref-assignment, dropping the previous
/// value in place.
unsafe fn write_field(ptr: *mut u8, meta: &FieldMeta, value: Value) -> Result<(), String> {
    macro_rules! write_as {
        ($ty:ty) => {{
            unsafe { *(ptr as *mut $ty) = <$ty as FromValue>::from_value(value)? };
        }};
    }
    dispatch_kind!(meta.kind, meta.nullable, write_as);
    Ok(())
}

impl<T: Entity> Valuer<T> for DirectValuer {
    fn field(model: &Model, entity: &T, name: &str) -> OrmResult<Value> {
        check_model::<T>(model)?;
        let meta = model
            .field(name)
            .ok_or_else(|| OrmError::unknown_field(name))?;
        let base = entity as *const T as *const u8;
        // SAFETY: `meta.offset` came from `offset_of!` on `T`, so the sum
        // points at the field of the kind recorded in `meta`.
        Ok(unsafe { read_field(base.add(meta.offset), meta) })
    }

    fn bind_row(
        model: &Model,
        entity: &mut T,
        columns: &[String],
        row: Vec<Value>,
    ) -> OrmResult<()> {
        check_model::<T>(model)?;
        super::check_row_width(columns, &row)?;
        for (column, value) in columns.iter().zip(row) {
            let meta = model
                .field_by_column(column)
                .ok_or_else(|| OrmError::unknown_column(column))?;
            let base = entity as *mut T as *mut u8;
            // SAFETY: as in `field`; the target is initialized (entities
            // start from `blank()`), so deref-assignment is sound.
            unsafe { write_field(base.add(meta.offset), meta, value) }
                .map_err(|msg| OrmError::decode(column, msg))?;
        }
        Ok(())
    }
}
