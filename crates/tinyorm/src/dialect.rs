//! Engine dialects.
//!
//! A closed set: the only points of variation are the identifier quote
//! character and the upsert grammar. Each `Db` carries one dialect, chosen at
//! construction and shared by every builder it hands out.

use crate::expr::Assignable;
use crate::qb::builder::SqlBuilder;
use crate::qb::Upsert;
use crate::OrmResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    MySql,
    Sqlite,
    Postgres,
}

impl Dialect {
    pub(crate) fn quoter(self) -> char {
        match self {
            Dialect::MySql | Dialect::Sqlite | Dialect::Postgres => '`',
        }
    }

    /// Render the upsert tail of an INSERT.
    pub(crate) fn upsert(self, b: &mut SqlBuilder, upsert: &Upsert) -> OrmResult<()> {
        match self {
            Dialect::MySql => {
                b.push(" ON DUPLICATE KEY UPDATE ");
                Self::write_assigns(b, &upsert.assigns, |b, field| {
                    b.push("=VALUES(");
                    b.write_field(field)?;
                    b.push_char(')');
                    Ok(())
                })
            }
            // SQLite and Postgres share the ON CONFLICT grammar.
            Dialect::Sqlite | Dialect::Postgres => {
                b.push(" ON CONFLICT(");
                for (i, col) in upsert.conflict_columns.iter().enumerate() {
                    if i > 0 {
                        b.push_char(',');
                    }
                    b.write_field(&col.name)?;
                }
                b.push(") DO UPDATE SET ");
                Self::write_assigns(b, &upsert.assigns, |b, field| {
                    b.push("=excluded.");
                    b.write_field(field)
                })
            }
        }
    }

    fn write_assigns(
        b: &mut SqlBuilder,
        assigns: &[Assignable],
        mut carry_incoming: impl FnMut(&mut SqlBuilder, &str) -> OrmResult<()>,
    ) -> OrmResult<()> {
        for (i, assign) in assigns.iter().enumerate() {
            if i > 0 {
                b.push_char(',');
            }
            match assign {
                Assignable::Set(a) => {
                    b.write_field(&a.field)?;
                    b.push_char('=');
                    b.push_arg(a.value.clone());
                }
                Assignable::Col(c) => {
                    b.write_field(&c.name)?;
                    carry_incoming(b, &c.name)?;
                }
            }
        }
        Ok(())
    }
}
