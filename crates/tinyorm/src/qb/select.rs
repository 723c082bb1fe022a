//! SELECT statements.

use std::marker::PhantomData;

use crate::expr::{OrderBy, Predicate, Selectable};
use crate::qb::builder::SqlBuilder;
use crate::session::Session;
use crate::{Db, Entity, OrmError, OrmResult, Query, Value};

/// Builds and runs `SELECT` statements for one entity type.
///
/// Obtained from [`Db::select`]. Every method consumes and returns the
/// builder; [`build`](Selector::build) renders into a fresh buffer each
/// call, so a `Selector` can be built repeatedly.
pub struct Selector<'a, T: Entity> {
    db: &'a Db,
    sess: &'a dyn Session,
    table: Option<String>,
    items: Vec<Selectable>,
    filters: Vec<Predicate>,
    group_by: Vec<String>,
    having: Vec<Predicate>,
    order_by: Vec<OrderBy>,
    limit: Option<i64>,
    offset: Option<i64>,
    _entity: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> Selector<'a, T> {
    pub(crate) fn new(db: &'a Db, sess: &'a dyn Session) -> Self {
        Selector {
            db,
            sess,
            table: None,
            items: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            _entity: PhantomData,
        }
    }

    /// Run this statement through another session, typically an open
    /// transaction.
    pub fn via(mut self, sess: &'a dyn Session) -> Self {
        self.sess = sess;
        self
    }

    /// Add one select-list item. With no items the list renders as `*`.
    pub fn select(mut self, item: impl Into<Selectable>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Override the FROM target. The string is written verbatim (it may be
    /// pre-quoted or database-qualified); an empty string falls back to the
    /// model's table name.
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add a WHERE predicate. Multiple calls are ANDed left to right.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Add a GROUP BY field.
    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by.push(field.into());
        self
    }

    /// Add a HAVING predicate. Multiple calls are ANDed left to right.
    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having.push(predicate);
        self
    }

    /// Add an ORDER BY term ([`asc`](crate::asc) / [`desc`](crate::desc)).
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// LIMIT, bound as an argument.
    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    /// OFFSET, bound as an argument.
    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Render the statement. Fails on the first unknown field; a failed
    /// build returns no partial SQL.
    pub fn build(&self) -> OrmResult<Query> {
        let model = self.db.registry().get::<T>();
        let mut b = SqlBuilder::new(model, self.db.dialect());

        b.push("SELECT ");
        if self.items.is_empty() {
            b.push("*");
        } else {
            for (i, item) in self.items.iter().enumerate() {
                if i > 0 {
                    b.push_char(',');
                }
                b.write_selectable(item)?;
            }
        }

        b.push(" FROM ");
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

        if !self.group_by.is_empty() {
            b.push(" GROUP BY ");
            for (i, field) in self.group_by.iter().enumerate() {
                if i > 0 {
                    b.push_char(',');
                }
                b.write_field(field)?;
            }
        }

        if !self.having.is_empty() {
            b.push(" HAVING ");
            b.write_predicates(&self.having)?;
        }

        if !self.order_by.is_empty() {
            b.push(" ORDER BY ");
            for (i, order) in self.order_by.iter().enumerate() {
                if i > 0 {
                    b.push_char(',');
                }
                b.write_order(order)?;
            }
        }

        if let Some(n) = self.limit {
            b.push(" LIMIT ");
            b.push_arg(Value::I64(n));
        }
        if let Some(n) = self.offset {
            b.push(" OFFSET ");
            b.push_arg(Value::I64(n));
        }

        let query = b.into_query();
        tracing::debug!(sql = %query.sql, "built select");
        Ok(query)
    }

    /// Run the statement and bind the first row, or `NoRows`.
    pub async fn get(&self) -> OrmResult<T> {
        let query = self.build()?;
        let mut cursor = self.sess.query(&query.sql, &query.args).await?;
        let columns = cursor.columns().to_vec();
        match cursor.next_row()? {
            Some(row) => {
                let model = self.db.registry().get::<T>();
                let mut entity = T::blank();
                self.db
                    .access_mode()
                    .bind_row(&model, &mut entity, &columns, row)?;
                Ok(entity)
            }
            None => Err(OrmError::NoRows),
        }
    }

    /// Run the statement and bind every row. Zero rows is an empty vec,
    /// not an error.
    pub async fn fetch_all(&self) -> OrmResult<Vec<T>> {
        let query = self.build()?;
        let mut cursor = self.sess.query(&query.sql, &query.args).await?;
        let columns = cursor.columns().to_vec();
        let model = self.db.registry().get::<T>();
        let mut out = Vec::new();
        while let Some(row) = cursor.next_row()? {
            let mut entity = T::blank();
            self.db
                .access_mode()
                .bind_row(&model, &mut entity, &columns, row)?;
            out.push(entity);
        }
        Ok(out)
    }
}
