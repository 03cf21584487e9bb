// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! SQL statements handed to the store.
//!
//! Identifiers only ever come from catalogs, values and JSON paths are always
//! bound as `?` parameters in placeholder order.

use crate::columns::ColumnSet;
use crate::filter::Filter;
use crate::sort::{Order, Page, SortExpr};

/// A bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<u64> for Arg {
    fn from(v: u64) -> Self {
        Arg::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Real(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Text(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Text(v)
    }
}

impl From<Vec<u8>> for Arg {
    fn from(v: Vec<u8>) -> Self {
        Arg::Blob(v)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Arg>,
}

/// Incrementally builds a [`Statement`], keeping SQL text and arguments in
/// step.
#[derive(Debug, Default)]
pub struct StatementBuilder {
    sql: String,
    args: Vec<Arg>,
}

impl StatementBuilder {
    pub fn new<T: AsRef<str>>(init: T) -> Self {
        Self {
            sql: init.as_ref().to_string(),
            args: vec![],
        }
    }

    pub fn push<T: AsRef<str>>(&mut self, sql: T) -> &mut Self {
        self.sql.push_str(sql.as_ref());
        self
    }

    pub fn push_bind<A: Into<Arg>>(&mut self, arg: A) -> &mut Self {
        self.sql.push('?');
        self.args.push(arg.into());
        self
    }

    /// `?, ?, ?` for every item.
    pub fn push_bind_list<A, I>(&mut self, items: I) -> &mut Self
    where
        A: Into<Arg>,
        I: IntoIterator<Item = A>,
    {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_bind(item);
        }
        self
    }

    pub fn build(self) -> Statement {
        Statement {
            sql: self.sql,
            args: self.args,
        }
    }
}

/// Assemble the primary projection query.
pub fn select(
    from: &str,
    columns: &ColumnSet,
    filter: &Filter,
    order: &Order,
    page: Page,
) -> Statement {
    let mut b = StatementBuilder::new("SELECT ");
    columns.push_select_list(&mut b);
    b.push(" FROM ").push(from);

    if !filter.is_empty() {
        b.push(" WHERE ");
        filter.push_predicate(&mut b);
    }

    b.push(" ORDER BY ");
    push_sort_expr(&mut b, order);
    b.push(" ").push(order.direction.sql());
    if !order.key.is_unique() {
        b.push(", ")
            .push(order.key.tie_break.expr())
            .push(" ")
            .push(order.direction.sql());
    }

    b.push(" LIMIT ").push_bind(page.limit);
    b.push(" OFFSET ").push_bind(page.offset);
    b.build()
}

fn push_sort_expr(b: &mut StatementBuilder, order: &Order) {
    if order.cast.is_some() {
        b.push("CAST(");
    }
    match &order.key.column {
        SortExpr::Column(column) => {
            b.push(column.expr());
        }
        SortExpr::Path { column, path } => {
            b.push("json_extract(")
                .push(column.json_expr())
                .push(", ")
                .push_bind(path.as_str())
                .push(")");
        }
    }
    if let Some(cast) = order.cast {
        b.push(" AS ").push(cast.sql()).push(")");
    }
}
