//! UPDATE statements.

use std::marker::PhantomData;

use crate::expr::{Assignment, Predicate};
use crate::qb::builder::SqlBuilder;
use crate::session::{ExecResult, Session};
use crate::{Db, Entity, OrmError, OrmResult, Query};

/// Builds and runs `UPDATE` statements for one entity type.
///
/// Assignments bind fresh values only; the carry-the-incoming-row form of
/// [`Assignable`](crate::Assignable) exists for upserts, where it has a row
/// to carry from.
pub struct Updater<'a, T: Entity> {
    db: &'a Db,
    sess: &'a dyn Session,
    assigns: Vec<Assignment>,
    filters: Vec<Predicate>,
    _entity: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> Updater<'a, T> {
    pub(crate) fn new(db: &'a Db, sess: &'a dyn Session) -> Self {
        Updater {
            db,
            sess,
            assigns: Vec::new(),
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

    /// Add one SET assignment. Building with zero assignments is an error.
    pub fn set(mut self, assignment: Assignment) -> Self {
        self.assigns.push(assignment);
        self
    }

    /// Add a WHERE predicate. Multiple calls are ANDed left to right.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn build(&self) -> OrmResult<Query> {
        if self.assigns.is_empty() {
            return Err(OrmError::UpdateZeroAssignments);
        }

        let model = self.db.registry().get::<T>();
        let mut b = SqlBuilder::new(model, self.db.dialect());

        b.push("UPDATE ");
        let table = b.model.table_name().to_string();
        b.quote_ident(&table);

        b.push(" SET ");
        for (i, assign) in self.assigns.iter().enumerate() {
            if i > 0 {
                b.push_char(',');
            }
            b.write_field(&assign.field)?;
            b.push_char('=');
            b.push_arg(assign.value.clone());
        }

        if !self.filters.is_empty() {
            b.push(" WHERE ");
            b.write_predicates(&self.filters)?;
        }

        let query = b.into_query();
        tracing::debug!(sql = %query.sql, "built update");
        Ok(query)
    }

    /// Run the statement.
    pub async fn exec(&self) -> OrmResult<ExecResult> {
        let query = self.build()?;
        self.sess.execute(&query.sql, &query.args).await
    }
}
