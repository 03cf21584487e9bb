// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Follow-up lookups keyed by ids found in the primary rows.
//!
//! Ids are collected over the whole result set first and resolved with a
//! single `IN (...)` statement per [`BatchDef`], then joined back by id.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde_json::Value as Json;
use tracing::debug;

use crate::catalog::Column;
use crate::error::Result;
use crate::statement::{Statement, StatementBuilder};
use crate::store::Store;
use crate::value::Row;

pub type BatchValueFn = fn(&Row) -> Json;

pub struct BatchDef {
    pub name: &'static str,
    /// Column of the primary row holding the foreign id.
    pub key: Column,
    /// FROM clause of the follow-up statement.
    pub from: &'static str,
    /// Column of the follow-up table matched against the collected ids.
    pub id: Column,
    pub columns: &'static [Column],
    /// Order of the follow-up rows sharing one id.
    pub order: Column,
    /// Whether one id maps to many rows, collected into an array.
    pub many: bool,
    pub value: BatchValueFn,
}

impl fmt::Debug for BatchDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchDef")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("from", &self.from)
            .field("id", &self.id)
            .field("many", &self.many)
            .finish()
    }
}

impl BatchDef {
    /// Distinct non-null foreign ids referenced by `rows`.
    pub fn ids(&self, rows: &[Row]) -> BTreeSet<i64> {
        rows.iter().filter_map(|r| r.i64(self.key.alias)).collect()
    }

    /// The follow-up statement, `None` when there is nothing to look up.
    pub fn statement(&self, ids: &BTreeSet<i64>) -> Option<Statement> {
        if ids.is_empty() {
            return None;
        }
        let mut b = StatementBuilder::new("SELECT ");
        b.push(self.id.expr())
            .push(r#" AS ""#)
            .push(self.id.alias)
            .push(r#"""#);
        for column in self.columns.iter().filter(|c| **c != self.id) {
            b.push(", ")
                .push(column.expr())
                .push(r#" AS ""#)
                .push(column.alias)
                .push(r#"""#);
        }
        b.push(" FROM ")
            .push(self.from)
            .push(" WHERE ")
            .push(self.id.expr())
            .push(" IN (")
            .push_bind_list(ids.iter().copied())
            .push(") ORDER BY ")
            .push(self.id.expr())
            .push(", ")
            .push(self.order.expr());
        Some(b.build())
    }

    fn collect(&self, rows: Vec<Row>) -> HashMap<i64, Json> {
        let mut values: HashMap<i64, Json> = HashMap::new();
        for row in rows {
            let Some(id) = row.i64(self.id.alias) else {
                continue;
            };
            let value = (self.value)(&row);
            if self.many {
                let entry =
                    values.entry(id).or_insert_with(|| Json::Array(vec![]));
                if let Json::Array(items) = entry {
                    items.push(value);
                }
            } else {
                values.entry(id).or_insert(value);
            }
        }
        values
    }
}

/// Results of every follow-up lookup of one query, by batch and id.
#[derive(Debug, Default)]
pub struct Batches(HashMap<&'static str, HashMap<i64, Json>>);

impl Batches {
    /// Resolve every distinct batch definition against the primary rows.
    pub async fn fetch<S, I>(store: &S, defs: I, rows: &[Row]) -> Result<Self>
    where
        S: Store + ?Sized,
        I: IntoIterator<Item = &'static BatchDef>,
    {
        let mut batches = Self::default();
        for def in defs {
            if batches.0.contains_key(def.name) {
                continue;
            }
            let ids = def.ids(rows);
            let values = match def.statement(&ids) {
                Some(stmt) => {
                    let found = store.fetch(&stmt).await?;
                    debug!(
                        event = "batch lookup",
                        batch = def.name,
                        ids = ids.len(),
                        rows = found.len()
                    );
                    def.collect(found)
                }
                None => HashMap::new(),
            };
            batches.0.insert(def.name, values);
        }
        Ok(batches)
    }

    pub fn get(&self, def: &BatchDef, id: i64) -> Option<&Json> {
        self.0.get(def.name)?.get(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
