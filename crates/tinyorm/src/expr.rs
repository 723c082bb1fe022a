//! The expression AST: columns, predicates, literals, aggregates, raw SQL.
//!
//! A closed family of immutable value types. Every combinator returns a new
//! value; nothing mutates its receiver. The renderer in
//! [`qb::builder`](crate::qb) matches exhaustively over [`Expr`], so adding a
//! variant is a compile error rather than a silent fallthrough.

use crate::Value;

/// One node of a renderable SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Pred(Box<Predicate>),
    Col(Column),
    Lit(Value),
    Raw(RawExpr),
    Agg(Aggregate),
}

/// A binary (or unary NOT) boolean expression node.
///
/// `op` is absent for a bare wrapped expression, as produced by
/// [`RawExpr::as_predicate`]; `left` is absent for NOT.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub(crate) left: Option<Expr>,
    pub(crate) op: Option<Op>,
    pub(crate) right: Option<Expr>,
}

/// Comparison and boolean operator tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lt,
    Gt,
    And,
    Or,
    Not,
}

impl Op {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Not => "NOT",
        }
    }
}

impl Predicate {
    fn binary(left: Predicate, op: Op, right: Predicate) -> Predicate {
        Predicate {
            left: Some(Expr::Pred(Box::new(left))),
            op: Some(op),
            right: Some(Expr::Pred(Box::new(right))),
        }
    }

    /// `(self) AND (right)`
    pub fn and(self, right: Predicate) -> Predicate {
        Predicate::binary(self, Op::And, right)
    }

    /// `(self) OR (right)`
    pub fn or(self, right: Predicate) -> Predicate {
        Predicate::binary(self, Op::Or, right)
    }
}

/// `NOT (p)`
pub fn not(p: Predicate) -> Predicate {
    Predicate {
        left: None,
        op: Some(Op::Not),
        right: Some(Expr::Pred(Box::new(p))),
    }
}

/// A reference to an entity field, optionally aliased.
///
/// The name is the struct field name; the builder resolves it to the physical
/// column through the model and fails with `UnknownField` if it is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
}

/// Reference a field: `col("age")`.
pub fn col(name: impl Into<String>) -> Column {
    Column {
        name: name.into(),
        alias: None,
    }
}

impl Column {
    /// Attach an output alias. Aliases are only emitted in select lists;
    /// inside predicates they are stripped.
    pub fn alias(self, alias: impl Into<String>) -> Column {
        Column {
            name: self.name,
            alias: Some(alias.into()),
        }
    }

    fn compare(self, op: Op, value: impl Into<Value>) -> Predicate {
        Predicate {
            left: Some(Expr::Col(self)),
            op: Some(op),
            right: Some(Expr::Lit(value.into())),
        }
    }

    /// `col = ?`
    pub fn eq(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Eq, value)
    }

    /// `col > ?`
    pub fn gt(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Gt, value)
    }

    /// `col < ?`
    pub fn lt(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Lt, value)
    }
}

/// A raw SQL fragment with its bound arguments: the escape hatch.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExpr {
    pub(crate) sql: String,
    pub(crate) args: Vec<Value>,
}

/// Build a raw fragment: `raw("`id` IN (?, ?)", vec![1.into(), 2.into()])`.
pub fn raw(sql: impl Into<String>, args: Vec<Value>) -> RawExpr {
    RawExpr {
        sql: sql.into(),
        args,
    }
}

impl RawExpr {
    /// Use the fragment as a WHERE/HAVING predicate. It renders
    /// parenthesized, with its arguments appended in order.
    pub fn as_predicate(self) -> Predicate {
        Predicate {
            left: Some(Expr::Raw(self)),
            op: None,
            right: None,
        }
    }
}

/// An aggregate call over one field: `AVG(`age`)`, optionally aliased.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub(crate) func: &'static str,
    pub(crate) arg: String,
    pub(crate) alias: Option<String>,
}

macro_rules! aggregate_fn {
    ($($(#[$doc:meta])* $name:ident => $func:literal),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(field: impl Into<String>) -> Aggregate {
                Aggregate {
                    func: $func,
                    arg: field.into(),
                    alias: None,
                }
            }
        )*
    };
}

aggregate_fn! {
    /// `AVG(field)`
    avg => "AVG",
    /// `SUM(field)`
    sum => "SUM",
    /// `COUNT(field)`
    count => "COUNT",
    /// `MAX(field)`
    max => "MAX",
    /// `MIN(field)`
    min => "MIN",
}

impl Aggregate {
    /// Attach an output alias (select lists only).
    pub fn alias(self, alias: impl Into<String>) -> Aggregate {
        Aggregate {
            func: self.func,
            arg: self.arg,
            alias: Some(alias.into()),
        }
    }

    fn compare(self, op: Op, value: impl Into<Value>) -> Predicate {
        Predicate {
            left: Some(Expr::Agg(self)),
            op: Some(op),
            right: Some(Expr::Lit(value.into())),
        }
    }

    /// `FN(field) = ?` — for HAVING clauses.
    pub fn eq(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Eq, value)
    }

    /// `FN(field) > ?`
    pub fn gt(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Gt, value)
    }

    /// `FN(field) < ?`
    pub fn lt(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Lt, value)
    }
}

/// Anything that can appear in a SELECT column list.
#[derive(Debug, Clone, PartialEq)]
pub enum Selectable {
    Col(Column),
    Agg(Aggregate),
    Raw(RawExpr),
}

impl From<Column> for Selectable {
    fn from(c: Column) -> Self {
        Selectable::Col(c)
    }
}

impl From<Aggregate> for Selectable {
    fn from(a: Aggregate) -> Self {
        Selectable::Agg(a)
    }
}

impl From<RawExpr> for Selectable {
    fn from(r: RawExpr) -> Self {
        Selectable::Raw(r)
    }
}

/// A `SET`-style assignment: `col = ?` with a fresh bound value.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub(crate) field: String,
    pub(crate) value: Value,
}

/// Assign a new value to a field: `assign("age", 19)`.
pub fn assign(field: impl Into<String>, value: impl Into<Value>) -> Assignment {
    Assignment {
        field: field.into(),
        value: value.into(),
    }
}

/// The right-hand side of an upsert update clause.
///
/// `Set` binds a fresh value; `Col` copies the incoming row's value for that
/// column (`VALUES(col)` in MySQL, `excluded.col` in SQLite/Postgres). The
/// set is closed: dialects match exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignable {
    Set(Assignment),
    Col(Column),
}

impl From<Assignment> for Assignable {
    fn from(a: Assignment) -> Self {
        Assignable::Set(a)
    }
}

impl From<Column> for Assignable {
    fn from(c: Column) -> Self {
        Assignable::Col(c)
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub(crate) field: String,
    pub(crate) desc: bool,
}

/// Order ascending by a field.
pub fn asc(field: impl Into<String>) -> OrderBy {
    OrderBy {
        field: field.into(),
        desc: false,
    }
}

/// Order descending by a field.
pub fn desc(field: impl Into<String>) -> OrderBy {
    OrderBy {
        field: field.into(),
        desc: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinators_return_new_values() {
        let age = col("age");
        let p = age.clone().eq(18);
        // The source column is untouched and reusable.
        let q = age.gt(10);
        assert_ne!(p, q);
        assert_eq!(
            p.clone().and(q.clone()),
            Predicate::binary(p, Op::And, q)
        );
    }

    #[test]
    fn alias_does_not_mutate() {
        let c = col("age");
        let aliased = c.clone().alias("a");
        assert_eq!(c.alias, None);
        assert_eq!(aliased.alias.as_deref(), Some("a"));
    }

    #[test]
    fn not_has_no_left_operand() {
        let p = not(col("age").eq(18));
        assert!(p.left.is_none());
        assert_eq!(p.op, Some(Op::Not));
    }
}
