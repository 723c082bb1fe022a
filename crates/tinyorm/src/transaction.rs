//! Transaction helpers.
//!
//! Builders accept a transaction through `.via(&*tx)`, so repository code
//! composes the same way with or without one. For commit/rollback handling,
//! use the [`transaction!`] macro.
//!
//! # Example
//!
//! ```ignore
//! use tinyorm::{assign, col, Db, OrmResult};
//!
//! # async fn demo(db: &Db) -> OrmResult<()> {
//! tinyorm::transaction!(db, tx, {
//!     db.update::<Account>()
//!         .set(assign("balance", 0))
//!         .filter(col("id").eq(1))
//!         .via(&*tx)
//!         .exec()
//!         .await?;
//!     Ok(())
//! })?;
//! # Ok(()) }
//! ```

/// Runs the given block inside a database transaction.
///
/// - Begins a transaction via `$db.begin().await`.
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)`; if the rollback itself fails, both errors are
///   returned together as [`OrmError::Rollback`](crate::OrmError::Rollback).
///
/// The block must evaluate to `tinyorm::OrmResult<T>`. If the block panics
/// or its future is dropped mid-flight, the transaction handle is dropped
/// uncommitted and the [`Transaction`](crate::Transaction) drop contract
/// rolls it back.
#[macro_export]
macro_rules! transaction {
    ($db:expr, $tx:ident, $body:block) => {{
        let mut $tx = ($db).begin().await?;

        let __tinyorm_tx_body_result = async { $body }.await;
        match __tinyorm_tx_body_result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(error) => match $tx.rollback().await {
                Ok(()) => Err(error),
                Err(rollback_err) => {
                    $crate::tracing::warn!(
                        rollback_error = %rollback_err,
                        "transaction rollback failed"
                    );
                    Err($crate::OrmError::Rollback {
                        source: Box::new(error),
                        rollback: Box::new(rollback_err),
                    })
                }
            },
        }
    }};
}
