//! DELETE statements.

use std::marker::PhantomData;

use crate::expr::Predicate;
use crate::qb::builder::SqlBuilder;
use crate::session::{ExecResult, Session};
use crate::{Db, Entity, OrmResult, Query};

/// Builds and runs `DELETE` statements for one entity type.
pub struct Deletor<'a, T: Entity> {
    db: &'a Db,
    sess: &'a dyn Session,
    table: Option<String>,
    filters: Vec<Predicate>,
    _entity: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> Deletor<'a, T> {
    pub(crate) fn new(db: &'a Db, sess: &'a dyn Session) -> Self {
        Deletor {
            db,
            sess,
            table: None,
            filters: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Run this statement through another session, typically an open
    /// transaction.
    pub fn via(mut self, sess: &'a dyn Session) -> Self {
        self.sess = sess;
        self
    }

    /// Override the FROM target, written verbatim; an empty string falls
    /// back to the model's table name.
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add a WHERE predicate. Multiple calls are ANDed left to right.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn build(&self) -> OrmResult<Query> {
        let model = self.db.registry().get::<T>();
        let mut b = SqlBuilder::new(model, self.db.dialect());

        b.push("DELETE FROM ");
        match self.table.as_deref() {
            Some(table) if !table.is_empty() => b.push(table),
            _ => {
                let table = b.model.table_name().to_string();
                b.quote_ident(&table);
            }
        }

        if !self.filters.is_empty() {
            b.push(" WHERE ");
            b.write_predicates(&self.filters)?;
        }

        let query = b.into_query();
        tracing::debug!(sql = %query.sql, "built delete");
        Ok(query)
    }

    /// Run the statement.
    pub async fn exec(&self) -> OrmResult<ExecResult> {
        let query = self.build()?;
        self.sess.execute(&query.sql, &query.args).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{test_db, TestModel};
    use crate::{col, OrmError, Value};

    #[test]
    fn no_where() {
        let db = test_db();
        let query = db.delete::<TestModel>().build().unwrap();
        assert_eq!(query.sql, "DELETE FROM `test_model`;");
        assert!(query.args.is_empty());
    }

    #[test]
    fn with_from() {
        let db = test_db();
        let query = db
            .delete::<TestModel>()
            .from("`test_model_t`")
            .build()
            .unwrap();
        assert_eq!(query.sql, "DELETE FROM `test_model_t`;");
    }

    #[test]
    fn with_where() {
        let db = test_db();
        let query = db
            .delete::<TestModel>()
            .filter(col("id").eq(16))
            .build()
            .unwrap();
        assert_eq!(query.sql, "DELETE FROM `test_model` WHERE `id` = ?;");
        assert_eq!(query.args, vec![Value::I32(16)]);
    }

    #[test]
    fn unknown_field_fails() {
        let db = test_db();
        let err = db
            .delete::<TestModel>()
            .filter(col("phantom").eq(1))
            .build()
            .unwrap_err();
        assert_eq!(err, OrmError::unknown_field("phantom"));
    }
}
