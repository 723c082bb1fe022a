//! # tinyorm
//!
//! A small multi-dialect ORM core.
//!
//! ## Features
//!
//! - **Derived schemas**: `#[derive(Entity)]` maps a struct to a table; the
//!   registry caches one immutable `Model` per type
//! - **Expression-tree builders**: typed predicates, aggregates and raw-SQL
//!   escape hatches render to byte-stable SQL with `?` placeholders
//! - **Multi-dialect upserts**: MySQL `ON DUPLICATE KEY UPDATE` and the
//!   SQLite/Postgres `ON CONFLICT` grammar behind one API
//! - **Driver-agnostic**: statements run through the `Session` trait; the
//!   core links no database driver
//! - **Two row binders**: generated safe accessors, or direct field access
//!   through precomputed byte offsets
//!
//! ## Query builder (qb)
//!
//! ```ignore
//! use tinyorm::{assign, col, Db};
//!
//! let db = Db::new(my_session);
//!
//! // SELECT
//! let adults = db
//!     .select::<User>()
//!     .filter(col("age").gt(18))
//!     .fetch_all()
//!     .await?;
//!
//! // INSERT ... upsert
//! db.insert::<User>()
//!     .values(vec![user])
//!     .on_duplicate_key()
//!     .update(vec![assign("age", 19).into()])
//!     .exec()
//!     .await?;
//!
//! // UPDATE
//! db.update::<User>()
//!     .set(assign("age", 19))
//!     .filter(col("id").eq(12))
//!     .exec()
//!     .await?;
//!
//! // DELETE
//! db.delete::<User>()
//!     .filter(col("id").eq(12))
//!     .exec()
//!     .await?;
//! ```

// The derive generates `tinyorm::`-prefixed paths; this makes them resolve
// inside this crate too.
extern crate self as tinyorm;

pub mod db;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod expr;
pub mod model;
pub mod qb;
pub mod registry;
pub mod session;
pub mod transaction;
pub mod value;
pub mod valuer;

#[cfg(test)]
pub(crate) mod test_support;

pub use db::Db;
pub use dialect::Dialect;
pub use entity::{Entity, FieldDef};
pub use error::{OrmError, OrmResult};
pub use expr::{
    asc, assign, avg, col, count, desc, max, min, not, raw, sum, Aggregate, Assignable,
    Assignment, Column, Expr, Op, OrderBy, Predicate, RawExpr, Selectable,
};
pub use model::{with_column_name, with_table_name, FieldMeta, Model, ModelOpt};
pub use qb::{Deletor, Inserter, Query, Selector, Updater, Upsert, UpsertBuilder};
pub use registry::Registry;
pub use session::{ExecResult, RowCursor, Session, Transaction};
pub use value::{FieldKind, FromValue, Value};
pub use valuer::{AccessMode, AccessorValuer, DirectValuer, Valuer};

/// The `#[derive(Entity)]` macro.
#[cfg(feature = "derive")]
pub use tinyorm_derive::Entity;

// Used by the `transaction!` macro expansion.
#[doc(hidden)]
pub use tracing;
