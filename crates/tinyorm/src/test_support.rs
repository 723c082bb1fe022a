//! Shared fixtures for the in-crate builder tests.

use async_trait::async_trait;

use crate::{Db, ExecResult, OrmError, OrmResult, RowCursor, Session, Transaction, Value};

/// A session that refuses to execute anything. Builder tests only need
/// `build()`; reaching the database is a test bug.
pub(crate) struct NopSession;

#[async_trait]
impl Session for NopSession {
    async fn query(&self, _sql: &str, _args: &[Value]) -> OrmResult<Box<dyn RowCursor>> {
        Err(OrmError::session("no database behind this session"))
    }

    async fn execute(&self, _sql: &str, _args: &[Value]) -> OrmResult<ExecResult> {
        Err(OrmError::session("no database behind this session"))
    }

    async fn begin(&self) -> OrmResult<Box<dyn Transaction>> {
        Err(OrmError::session("no database behind this session"))
    }
}

pub(crate) fn test_db() -> Db {
    Db::new(NopSession)
}

#[derive(crate::Entity)]
pub(crate) struct TestModel {
    pub(crate) id: i64,
    pub(crate) first_name: String,
    pub(crate) age: i8,
    pub(crate) last_name: Option<String>,
}
