//! The capability boundary to an actual database connection.
//!
//! The core never links a driver. Callers hand a [`Session`] to
//! [`Db::new`](crate::Db::new) (a pooled client, a single connection, a test
//! fake); builders only ever see this trait. Rows come back as name-keyed
//! [`Value`] vectors, so result column order is irrelevant to the binder.
//!
//! Cancellation is structural: dropping a statement future abandons the call.
//! The core imposes no timeout of its own.

use async_trait::async_trait;

use crate::{OrmResult, Value};

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Engine-assigned id of the last inserted row, when the driver
    /// reports one.
    pub last_insert_id: Option<u64>,
}

/// A forward-only result set.
pub trait RowCursor: Send {
    /// Result column names, in result order.
    fn columns(&self) -> &[String];

    /// The next row, with values in [`columns`](RowCursor::columns) order,
    /// or `None` once exhausted.
    fn next_row(&mut self) -> OrmResult<Option<Vec<Value>>>;
}

/// Something statements can be executed against.
#[async_trait]
pub trait Session: Send + Sync {
    /// Run a row-returning statement.
    async fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Box<dyn RowCursor>>;

    /// Run a statement that returns no rows.
    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<ExecResult>;

    /// Open a transaction. Statements issued through the returned handle
    /// run inside it.
    async fn begin(&self) -> OrmResult<Box<dyn Transaction>>;
}

/// An open transaction. Also a [`Session`], so every builder can run
/// through it unchanged.
///
/// Implementations must roll back from `Drop` (best effort) when neither
/// [`commit`](Transaction::commit) nor [`rollback`](Transaction::rollback)
/// ran, so an early return, a panic, or a dropped future inside a
/// transaction block can never leak an open transaction. Drivers
/// typically get this for free from their native transaction guard.
#[async_trait]
pub trait Transaction: Session {
    async fn commit(&mut self) -> OrmResult<()>;
    async fn rollback(&mut self) -> OrmResult<()>;
}
