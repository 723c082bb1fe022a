//! INSERT statements, including per-dialect upserts.

use crate::expr::{col, Assignable, Column};
use crate::qb::builder::SqlBuilder;
use crate::session::{ExecResult, Session};
use crate::{Db, Entity, OrmError, OrmResult, Query};

/// Builds and runs `INSERT` statements for one entity type.
///
/// Obtained from [`Db::insert`]. Placeholders follow the model's field
/// declaration order, or the explicit [`columns`](Inserter::columns) order
/// when one is given; argument extraction walks that same list, so SQL and
/// args can never disagree on order.
pub struct Inserter<'a, T: Entity> {
    db: &'a Db,
    sess: &'a dyn Session,
    rows: Vec<T>,
    columns: Option<Vec<String>>,
    upsert: Option<Upsert>,
}

/// The upsert tail: conflict columns (ON CONFLICT grammars only) and the
/// update assignments. Rendered by the active [`Dialect`](crate::Dialect).
pub struct Upsert {
    pub(crate) conflict_columns: Vec<Column>,
    pub(crate) assigns: Vec<Assignable>,
}

/// Intermediate builder returned by [`Inserter::on_duplicate_key`].
pub struct UpsertBuilder<'a, T: Entity> {
    inserter: Inserter<'a, T>,
    conflict_columns: Vec<Column>,
}

impl<'a, T: Entity> UpsertBuilder<'a, T> {
    /// Name the conflict target columns. MySQL ignores these; the
    /// ON CONFLICT dialects render them.
    pub fn conflict_columns(mut self, columns: &[&str]) -> Self {
        self.conflict_columns = columns.iter().map(|c| col(*c)).collect();
        self
    }

    /// Set the update assignments and return to the inserter.
    pub fn update(self, assigns: Vec<Assignable>) -> Inserter<'a, T> {
        let mut inserter = self.inserter;
        inserter.upsert = Some(Upsert {
            conflict_columns: self.conflict_columns,
            assigns,
        });
        inserter
    }
}

impl<'a, T: Entity> Inserter<'a, T> {
    pub(crate) fn new(db: &'a Db, sess: &'a dyn Session) -> Self {
        Inserter {
            db,
            sess,
            rows: Vec::new(),
            columns: None,
            upsert: None,
        }
    }

    /// Run this statement through another session, typically an open
    /// transaction.
    pub fn via(mut self, sess: &'a dyn Session) -> Self {
        self.sess = sess;
        self
    }

    /// Add rows to insert. Building with zero rows is an error.
    pub fn values(mut self, rows: Vec<T>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Restrict the insert to a subset of fields, in the given order.
    pub fn columns(mut self, fields: &[&str]) -> Self {
        self.columns = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Turn the insert into an upsert.
    pub fn on_duplicate_key(self) -> UpsertBuilder<'a, T> {
        UpsertBuilder {
            inserter: self,
            conflict_columns: Vec::new(),
        }
    }

    pub fn build(&self) -> OrmResult<Query> {
        if self.rows.is_empty() {
            return Err(OrmError::InsertZeroRows);
        }

        let model = self.db.registry().get::<T>();

        // Resolve the field list up front so SQL and argument extraction
        // walk the exact same ordered slice.
        let fields: Vec<(String, String)> = match &self.columns {
            Some(names) => names
                .iter()
                .map(|name| {
                    model
                        .field(name)
                        .map(|f| (f.name.clone(), f.column.clone()))
                        .ok_or_else(|| OrmError::unknown_field(name))
                })
                .collect::<OrmResult<_>>()?,
            None => model
                .fields()
                .iter()
                .map(|f| (f.name.clone(), f.column.clone()))
                .collect(),
        };

        let mut b = SqlBuilder::new(model.clone(), self.db.dialect());
        b.push("INSERT INTO ");
        let table = model.table_name().to_string();
        b.quote_ident(&table);

        b.push_char('(');
        for (i, (_, column)) in fields.iter().enumerate() {
            if i > 0 {
                b.push_char(',');
            }
            b.quote_ident(column);
        }
        b.push_char(')');

        b.push(" VALUES ");
        let mode = self.db.access_mode();
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                b.push_char(',');
            }
            b.push_char('(');
            for (j, (name, _)) in fields.iter().enumerate() {
                if j > 0 {
                    b.push_char(',');
                }
                let value = mode.field(&model, row, name)?;
                b.push_arg(value);
            }
            b.push_char(')');
        }

        if let Some(upsert) = &self.upsert {
            self.db.dialect().upsert(&mut b, upsert)?;
        }

        let query = b.into_query();
        tracing::debug!(sql = %query.sql, rows = self.rows.len(), "built insert");
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
    use crate::{assign, col, AccessMode, Dialect, OrmError, Value};

    fn tom() -> TestModel {
        TestModel {
            id: 12,
            first_name: "Tom".to_string(),
            age: 18,
            last_name: Some("Cat".to_string()),
        }
    }

    fn jerry() -> TestModel {
        TestModel {
            id: 13,
            first_name: "Jerry".to_string(),
            age: 17,
            last_name: None,
        }
    }

    fn tom_args() -> Vec<Value> {
        vec![
            Value::I64(12),
            Value::Text("Tom".to_string()),
            Value::I8(18),
            Value::Text("Cat".to_string()),
        ]
    }

    #[test]
    fn zero_rows() {
        let db = test_db();
        let err = db.insert::<TestModel>().build().unwrap_err();
        assert_eq!(err, OrmError::InsertZeroRows);
    }

    #[test]
    fn single_row() {
        let db = test_db();
        let query = db.insert::<TestModel>().values(vec![tom()]).build().unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?);"
        );
        assert_eq!(query.args, tom_args());
    }

    #[test]
    fn multiple_rows() {
        let db = test_db();
        let query = db
            .insert::<TestModel>()
            .values(vec![tom(), jerry()])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?),(?,?,?,?);"
        );
        let mut expected = tom_args();
        expected.extend(vec![
            Value::I64(13),
            Value::Text("Jerry".to_string()),
            Value::I8(17),
            Value::Null,
        ]);
        assert_eq!(query.args, expected);
    }

    #[test]
    fn named_columns_in_caller_order() {
        let db = test_db();
        let query = db
            .insert::<TestModel>()
            .values(vec![tom()])
            .columns(&["age", "first_name"])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `test_model`(`age`,`first_name`) VALUES (?,?);"
        );
        assert_eq!(
            query.args,
            vec![Value::I8(18), Value::Text("Tom".to_string())]
        );
    }

    #[test]
    fn unknown_column() {
        let db = test_db();
        let err = db
            .insert::<TestModel>()
            .values(vec![tom()])
            .columns(&["nickname"])
            .build()
            .unwrap_err();
        assert_eq!(err, OrmError::unknown_field("nickname"));
    }

    #[test]
    fn mysql_upsert_assignment() {
        let db = test_db();
        let query = db
            .insert::<TestModel>()
            .values(vec![tom()])
            .on_duplicate_key()
            .update(vec![assign("first_name", "Deng").into()])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?) ON DUPLICATE KEY UPDATE `first_name`=?;"
        );
        let mut expected = tom_args();
        expected.push(Value::Text("Deng".to_string()));
        assert_eq!(query.args, expected);
    }

    #[test]
    fn mysql_upsert_carries_incoming_columns() {
        let db = test_db();
        let query = db
            .insert::<TestModel>()
            .values(vec![tom()])
            .on_duplicate_key()
            .update(vec![col("first_name").into(), col("last_name").into()])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?) ON DUPLICATE KEY UPDATE `first_name`=VALUES(`first_name`),`last_name`=VALUES(`last_name`);"
        );
        assert_eq!(query.args, tom_args());
    }

    #[test]
    fn sqlite_upsert_assignment() {
        let db = test_db().with_dialect(Dialect::Sqlite);
        let query = db
            .insert::<TestModel>()
            .values(vec![tom()])
            .on_duplicate_key()
            .conflict_columns(&["id"])
            .update(vec![assign("first_name", "Deng").into()])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?) ON CONFLICT(`id`) DO UPDATE SET `first_name`=?;"
        );
    }

    #[test]
    fn sqlite_upsert_carries_incoming_columns() {
        let db = test_db().with_dialect(Dialect::Sqlite);
        let query = db
            .insert::<TestModel>()
            .values(vec![tom()])
            .on_duplicate_key()
            .conflict_columns(&["id", "age"])
            .update(vec![col("first_name").into()])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?) ON CONFLICT(`id`,`age`) DO UPDATE SET `first_name`=excluded.`first_name`;"
        );
    }

    #[test]
    fn postgres_upsert_uses_on_conflict() {
        let db = test_db().with_dialect(Dialect::Postgres);
        let query = db
            .insert::<TestModel>()
            .values(vec![tom()])
            .on_duplicate_key()
            .conflict_columns(&["id"])
            .update(vec![col("age").into()])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?) ON CONFLICT(`id`) DO UPDATE SET `age`=excluded.`age`;"
        );
    }

    #[test]
    fn upsert_unknown_assignment_field() {
        let db = test_db();
        let err = db
            .insert::<TestModel>()
            .values(vec![tom()])
            .on_duplicate_key()
            .update(vec![assign("nickname", "x").into()])
            .build()
            .unwrap_err();
        assert_eq!(err, OrmError::unknown_field("nickname"));
    }

    #[test]
    fn direct_mode_extracts_identical_args() {
        let accessor = test_db();
        let direct = test_db().with_access_mode(AccessMode::Direct);
        let a = accessor
            .insert::<TestModel>()
            .values(vec![tom(), jerry()])
            .build()
            .unwrap();
        let d = direct
            .insert::<TestModel>()
            .values(vec![tom(), jerry()])
            .build()
            .unwrap();
        assert_eq!(a, d);
    }
}
