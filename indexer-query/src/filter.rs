// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Pre-validated filters.
//!
//! Filters are passed through to SQL unchanged. Predicates always reference
//! qualified catalog columns, never select-list aliases.

use crate::catalog::Column;
use crate::error::Result;
use crate::field::{json_path, validate_path};
use crate::statement::{Arg, StatementBuilder};

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Column, Arg),
    Ne(Column, Arg),
    Gt(Column, Arg),
    Ge(Column, Arg),
    Lt(Column, Arg),
    Le(Column, Arg),
    /// Inclusive range.
    Between(Column, Arg, Arg),
    In(Column, Vec<Arg>),
    NotIn(Column, Vec<Arg>),
    IsNull(Column),
    NotNull(Column),
    /// Scalar at a JSON sub-path equals the value.
    JsonEq {
        column: Column,
        path: String,
        value: Arg,
    },
    /// Any of the columns equals the value (e.g. sender or target).
    AnyOf { columns: Vec<Column>, value: Arg },
    Or(Vec<Condition>),
}

impl Condition {
    /// `column` at dot-separated `path` equals `value`.
    pub fn json_eq<A: Into<Arg>>(
        column: Column,
        path: &str,
        value: A,
    ) -> Result<Self> {
        let segments: Vec<&str> = path.split('.').collect();
        validate_path(path, &segments)?;
        Ok(Condition::JsonEq {
            column,
            path: json_path(&segments),
            value: value.into(),
        })
    }

    fn push_predicate(&self, b: &mut StatementBuilder) {
        match self {
            Condition::Eq(c, v) => push_cmp(b, c, " = ", v),
            Condition::Ne(c, v) => push_cmp(b, c, " != ", v),
            Condition::Gt(c, v) => push_cmp(b, c, " > ", v),
            Condition::Ge(c, v) => push_cmp(b, c, " >= ", v),
            Condition::Lt(c, v) => push_cmp(b, c, " < ", v),
            Condition::Le(c, v) => push_cmp(b, c, " <= ", v),
            Condition::Between(c, from, to) => {
                b.push(c.expr())
                    .push(" BETWEEN ")
                    .push_bind(from.clone())
                    .push(" AND ")
                    .push_bind(to.clone());
            }
            Condition::In(_, values) if values.is_empty() => {
                b.push("0");
            }
            Condition::NotIn(_, values) if values.is_empty() => {
                b.push("1");
            }
            Condition::In(c, values) => {
                b.push(c.expr())
                    .push(" IN (")
                    .push_bind_list(values.iter().cloned())
                    .push(")");
            }
            Condition::NotIn(c, values) => {
                b.push(c.expr())
                    .push(" NOT IN (")
                    .push_bind_list(values.iter().cloned())
                    .push(")");
            }
            Condition::IsNull(c) => {
                b.push(c.expr()).push(" IS NULL");
            }
            Condition::NotNull(c) => {
                b.push(c.expr()).push(" IS NOT NULL");
            }
            Condition::JsonEq {
                column,
                path,
                value,
            } => {
                b.push("json_extract(")
                    .push(column.json_expr())
                    .push(", ")
                    .push_bind(path.as_str())
                    .push(") = ")
                    .push_bind(value.clone());
            }
            Condition::AnyOf { columns, .. } if columns.is_empty() => {
                b.push("0");
            }
            Condition::AnyOf { columns, value } => {
                b.push("(");
                for (i, c) in columns.iter().enumerate() {
                    if i > 0 {
                        b.push(" OR ");
                    }
                    b.push(c.expr()).push(" = ").push_bind(value.clone());
                }
                b.push(")");
            }
            Condition::Or(conditions) if conditions.is_empty() => {
                b.push("0");
            }
            Condition::Or(conditions) => {
                b.push("(");
                for (i, c) in conditions.iter().enumerate() {
                    if i > 0 {
                        b.push(" OR ");
                    }
                    c.push_predicate(b);
                }
                b.push(")");
            }
        }
    }
}

fn push_cmp(b: &mut StatementBuilder, column: &Column, op: &str, arg: &Arg) {
    b.push(column.expr()).push(op).push_bind(arg.clone());
}

/// Conjunction of conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Vec<Condition>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.0.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.0.push(condition);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.0
    }

    pub(crate) fn push_predicate(&self, b: &mut StatementBuilder) {
        for (i, condition) in self.0.iter().enumerate() {
            if i > 0 {
                b.push(" AND ");
            }
            condition.push_predicate(b);
        }
    }
}

impl From<Vec<Condition>> for Filter {
    fn from(conditions: Vec<Condition>) -> Self {
        Self(conditions)
    }
}
