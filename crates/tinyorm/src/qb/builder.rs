//! The shared statement renderer.
//!
//! Every statement builder drives one [`SqlBuilder`] per `build()` call, so a
//! failed build never leaks partial SQL. Rendering walks the expression tree
//! depth-first; literal values become `?` placeholders and are appended to
//! `args` strictly left to right, which is what keeps `Query::args` aligned
//! with the placeholders.

use std::sync::Arc;

use crate::expr::{Aggregate, Column, Expr, OrderBy, Predicate, Selectable};
use crate::qb::Query;
use crate::{Dialect, Model, OrmError, OrmResult, Value};

pub(crate) struct SqlBuilder {
    sql: String,
    args: Vec<Value>,
    pub(crate) model: Arc<Model>,
    quote: char,
}

impl SqlBuilder {
    pub(crate) fn new(model: Arc<Model>, dialect: Dialect) -> Self {
        SqlBuilder {
            sql: String::new(),
            args: Vec::new(),
            model,
            quote: dialect.quoter(),
        }
    }

    pub(crate) fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub(crate) fn push_char(&mut self, c: char) {
        self.sql.push(c);
    }

    pub(crate) fn push_arg(&mut self, value: Value) {
        self.sql.push('?');
        self.args.push(value);
    }

    pub(crate) fn quote_ident(&mut self, ident: &str) {
        self.sql.push(self.quote);
        self.sql.push_str(ident);
        self.sql.push(self.quote);
    }

    /// Resolve a struct field name to its quoted physical column.
    pub(crate) fn write_field(&mut self, name: &str) -> OrmResult<()> {
        let column = self
            .model
            .field(name)
            .map(|f| f.column.clone())
            .ok_or_else(|| OrmError::unknown_field(name))?;
        self.quote_ident(&column);
        Ok(())
    }

    fn write_aggregate(&mut self, agg: &Aggregate, with_alias: bool) -> OrmResult<()> {
        self.sql.push_str(agg.func);
        self.sql.push('(');
        self.write_field(&agg.arg)?;
        self.sql.push(')');
        if with_alias {
            if let Some(alias) = &agg.alias {
                self.sql.push_str(" AS ");
                self.quote_ident(alias);
            }
        }
        Ok(())
    }

    /// Render one expression node. Aliases are never emitted here; a column
    /// inside a predicate renders as its bare quoted name.
    pub(crate) fn write_expr(&mut self, expr: &Expr) -> OrmResult<()> {
        match expr {
            Expr::Pred(p) => {
                if let Some(left) = &p.left {
                    self.write_operand(left)?;
                }
                if let Some(op) = p.op {
                    if p.left.is_some() {
                        self.sql.push(' ');
                    }
                    self.sql.push_str(op.as_str());
                }
                if let Some(right) = &p.right {
                    self.sql.push(' ');
                    self.write_operand(right)?;
                }
                Ok(())
            }
            Expr::Col(c) => self.write_field(&c.name),
            Expr::Lit(v) => {
                self.push_arg(v.clone());
                Ok(())
            }
            Expr::Raw(r) => {
                self.sql.push('(');
                self.sql.push_str(&r.sql);
                self.sql.push(')');
                self.args.extend(r.args.iter().cloned());
                Ok(())
            }
            Expr::Agg(a) => self.write_aggregate(a, false),
        }
    }

    /// Predicate operands that are themselves predicates get parenthesized.
    fn write_operand(&mut self, expr: &Expr) -> OrmResult<()> {
        if matches!(expr, Expr::Pred(_)) {
            self.sql.push('(');
            self.write_expr(expr)?;
            self.sql.push(')');
            Ok(())
        } else {
            self.write_expr(expr)
        }
    }

    /// Fold a clause list left-associatively with AND and render it.
    pub(crate) fn write_predicates(&mut self, predicates: &[Predicate]) -> OrmResult<()> {
        let mut iter = predicates.iter().cloned();
        let Some(mut folded) = iter.next() else {
            return Ok(());
        };
        for p in iter {
            folded = folded.and(p);
        }
        self.write_expr(&Expr::Pred(Box::new(folded)))
    }

    /// Render a select-list item. This is the only place aliases are
    /// emitted; raw fragments appear verbatim, unparenthesized.
    pub(crate) fn write_selectable(&mut self, item: &Selectable) -> OrmResult<()> {
        match item {
            Selectable::Col(c) => self.write_column(c),
            Selectable::Agg(a) => self.write_aggregate(a, true),
            Selectable::Raw(r) => {
                self.sql.push_str(&r.sql);
                self.args.extend(r.args.iter().cloned());
                Ok(())
            }
        }
    }

    fn write_column(&mut self, column: &Column) -> OrmResult<()> {
        self.write_field(&column.name)?;
        if let Some(alias) = &column.alias {
            self.sql.push_str(" AS ");
            self.quote_ident(alias);
        }
        Ok(())
    }

    pub(crate) fn write_order(&mut self, order: &OrderBy) -> OrmResult<()> {
        self.write_field(&order.field)?;
        self.sql.push_str(if order.desc { " DESC" } else { " ASC" });
        Ok(())
    }

    pub(crate) fn into_query(mut self) -> Query {
        self.sql.push(';');
        Query {
            sql: self.sql,
            args: self.args,
        }
    }
}
