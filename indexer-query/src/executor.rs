// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Projection executor.
//!
//! Every request runs exactly one primary statement, plus one statement per
//! batch definition its fields need. Rows are projected into one of three
//! shapes, all going through the same per-field extraction:
//!
//! - full objects, typed by the entity
//! - a single column, `value[row]`
//! - a row-major table, `value[row][field]` in the caller's field order

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::batch::{BatchDef, Batches};
use crate::catalog::{Catalog, ExtractCtx};
use crate::columns::{ColumnSet, ResolvedField, Source};
use crate::conf::Params;
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::field::FieldSpec;
use crate::filter::Filter;
use crate::lookup::{Lookups, Symbol};
use crate::sort::{Direction, Order, Page, ResolvedSort, SortSpec};
use crate::statement::{self, Statement};
use crate::store::Store;
use crate::value::Row;

/// Everything about a request except the selected fields.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Filter,
    pub sort: Option<SortSpec>,
    pub page: Page,
    /// Symbol quotes are reported in, for fields that carry one.
    pub quote: Option<Symbol>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    pub fn quote(mut self, symbol: Symbol) -> Self {
        self.quote = Some(symbol);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Select {
    /// The full-object shape.
    All,
    Field(String),
    Fields(Vec<String>),
}

impl Select {
    /// `?select=` semantics: nothing selects full objects, a single name a
    /// column, several names a table.
    pub fn parse(select: Option<&str>) -> Self {
        let mut fields: Vec<String> = select
            .map(FieldSpec::parse_list)
            .unwrap_or_default()
            .into_iter()
            .map(|f| f.name().to_string())
            .collect();
        match fields.len() {
            0 => Select::All,
            1 => Select::Field(fields.remove(0)),
            _ => Select::Fields(fields),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Projection<T> {
    Objects(Vec<T>),
    Column(Vec<Json>),
    Table(Vec<Vec<Json>>),
}

impl<T> Projection<T> {
    pub fn len(&self) -> usize {
        match self {
            Projection::Objects(v) => v.len(),
            Projection::Column(v) => v.len(),
            Projection::Table(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Projector<S> {
    store: S,
    lookups: Lookups,
    params: Params,
}

impl<S: Store> Projector<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            lookups: Lookups::default(),
            params: Params::default(),
        }
    }

    pub fn with_lookups(mut self, lookups: Lookups) -> Self {
        self.lookups = lookups;
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn project<E: Entity>(
        &self,
        query: &Query,
        select: &Select,
    ) -> Result<Projection<E::Object>> {
        match select {
            Select::All => self.objects::<E>(query).await.map(Projection::Objects),
            Select::Field(field) => {
                self.column::<E>(query, field).await.map(Projection::Column)
            }
            Select::Fields(fields) => {
                self.table::<E, _>(query, fields.as_slice())
                    .await
                    .map(Projection::Table)
            }
        }
    }

    /// Every matched row as a full object.
    pub async fn objects<E: Entity>(
        &self,
        query: &Query,
    ) -> Result<Vec<E::Object>> {
        let catalog = E::catalog();
        let (columns, fields) = ColumnSet::full(catalog);
        let order = resolve_order(catalog, query.sort.as_ref())?;
        let batches = fields.iter().filter_map(|f| f.batch);

        let (rows, batches) =
            self.run(catalog, query, &columns, &order, batches).await?;
        let ctx = self.ctx(&batches, query);

        rows.iter()
            .map(|row| {
                let mut object = Map::new();
                for field in &fields {
                    insert_path(&mut object, field.name, field.extract(row, &ctx));
                }
                serde_json::from_value(Json::Object(object)).map_err(Error::from)
            })
            .collect()
    }

    /// Values of a single field, in row order.
    pub async fn column<E: Entity>(
        &self,
        query: &Query,
        field: &str,
    ) -> Result<Vec<Json>> {
        let catalog = E::catalog();
        let (columns, fields) =
            ColumnSet::resolve(catalog, vec![FieldSpec::parse(field)])?;
        let order = resolve_order(catalog, query.sort.as_ref())?;

        if columns.is_empty() {
            debug!(event = "short-circuit", entity = catalog.entity, field);
            return Ok(vec![]);
        }

        let (rows, batches) = self
            .run(catalog, query, &columns, &order, batch_defs(&fields))
            .await?;
        let ctx = self.ctx(&batches, query);

        let field = &fields[0];
        Ok(rows.iter().map(|row| field.extract(row, &ctx)).collect())
    }

    /// Row-major table of the requested fields, in the caller's order.
    ///
    /// Unknown fields among known ones yield a `null` column.
    pub async fn table<E: Entity, T: AsRef<str>>(
        &self,
        query: &Query,
        fields: &[T],
    ) -> Result<Vec<Vec<Json>>> {
        let catalog = E::catalog();
        let specs = fields.iter().map(|f| FieldSpec::parse(f.as_ref())).collect();
        let (columns, fields) = ColumnSet::resolve(catalog, specs)?;
        let order = resolve_order(catalog, query.sort.as_ref())?;

        if columns.is_empty() {
            debug!(
                event = "short-circuit",
                entity = catalog.entity,
                fields = fields.len()
            );
            return Ok(vec![]);
        }

        let (rows, batches) = self
            .run(catalog, query, &columns, &order, batch_defs(&fields))
            .await?;
        let ctx = self.ctx(&batches, query);

        let mut table = vec![vec![Json::Null; fields.len()]; rows.len()];
        for (i, field) in fields.iter().enumerate() {
            if !field.is_known() {
                continue;
            }
            for (row, out) in rows.iter().zip(table.iter_mut()) {
                out[i] = field.extract(row, &ctx);
            }
        }
        Ok(table)
    }

    fn ctx<'a>(&'a self, batches: &'a Batches, query: &Query) -> ExtractCtx<'a> {
        ExtractCtx {
            lookups: &self.lookups,
            batches,
            quote: query.quote,
        }
    }

    /// The primary statement followed by its batch lookups.
    ///
    /// Both run inside the caller's future, dropping it before the primary
    /// statement completes means no follow-up is ever issued.
    async fn run<I>(
        &self,
        catalog: &Catalog,
        query: &Query,
        columns: &ColumnSet,
        order: &Order,
        batches: I,
    ) -> Result<(Vec<Row>, Batches)>
    where
        I: IntoIterator<Item = &'static BatchDef>,
    {
        let stmt = statement::select(
            catalog.from,
            columns,
            &query.filter,
            order,
            query.page,
        );
        debug!(
            event = "projection",
            entity = catalog.entity,
            columns = columns.len(),
            sql = %stmt.sql
        );

        let store = Deadline {
            store: &self.store,
            timeout: self.params.query_timeout,
        };
        let rows = store.fetch(&stmt).await?;
        debug!(event = "projection rows", entity = catalog.entity, rows = rows.len());

        let batches = Batches::fetch(&store, batches, &rows).await?;
        Ok((rows, batches))
    }
}

fn batch_defs(
    fields: &[ResolvedField],
) -> impl Iterator<Item = &'static BatchDef> + '_ {
    fields.iter().filter_map(|f| match f.source {
        Source::Field(def) => def.batch,
        _ => None,
    })
}

fn resolve_order(catalog: &Catalog, sort: Option<&SortSpec>) -> Result<Order> {
    Ok(match sort {
        Some(sort) => Order {
            key: catalog.resolve_sort(&sort.field)?,
            direction: sort.direction,
            cast: sort.cast,
        },
        None => Order {
            key: ResolvedSort::by(catalog.primary_key),
            direction: Direction::Asc,
            cast: None,
        },
    })
}

/// Insert `value` at dotted `path`, creating intermediate objects.
fn insert_path(object: &mut Map<String, Json>, path: &str, value: Json) {
    match path.split_once('.') {
        None => {
            object.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = object
                .entry(head)
                .or_insert_with(|| Json::Object(Map::new()));
            if !child.is_object() {
                *child = Json::Object(Map::new());
            }
            if let Json::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}

/// Applies the configured deadline to every statement.
struct Deadline<'a, S> {
    store: &'a S,
    timeout: Option<Duration>,
}

#[async_trait]
impl<'a, S: Store> Store for Deadline<'a, S> {
    async fn fetch(&self, stmt: &Statement) -> Result<Vec<Row>> {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.store.fetch(stmt))
                .await
                .map_err(|_| Error::Timeout(timeout))?,
            None => self.store.fetch(stmt).await,
        }
    }
}
