// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions,
    SqliteRow,
};
use sqlx::query::Query;
use sqlx::{Column as _, Row as _, Sqlite, TypeInfo, ValueRef};
use tracing::{debug, info};

use crate::conf::Params;
use crate::error::Result;
use crate::statement::{Arg, Statement};
use crate::store::Store;
use crate::value::{Row, Value};

/// Read-only store over a SQLite archive database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the archive database at `path` with a read-only reader pool.
    pub async fn open<P: AsRef<Path> + std::fmt::Debug>(
        path: P,
        params: &Params,
    ) -> Result<Self> {
        info!("Opening SQLite archive db in {path:?} ({params})");

        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .read_only(true)
            .busy_timeout(params.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(params.reader_max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap a pool the caller already owns.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn bind<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    arg: &Arg,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match arg {
        Arg::Null => query.bind(None::<i64>),
        Arg::Int(v) => query.bind(*v),
        Arg::Real(v) => query.bind(*v),
        Arg::Text(v) => query.bind(v.clone()),
        Arg::Blob(v) => query.bind(v.clone()),
    }
}

/// Convert every cell by its runtime storage class.
fn to_row(row: &SqliteRow) -> Result<Row> {
    let mut out = Row::new();
    for column in row.columns() {
        let i = column.ordinal();
        let raw = row.try_get_raw(i)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let storage = raw.type_info().name().to_string();
            match storage.as_str() {
                "INTEGER" => Value::Int(row.try_get(i)?),
                "REAL" => Value::Real(row.try_get(i)?),
                "BLOB" => Value::Blob(row.try_get(i)?),
                _ => Value::Text(row.try_get(i)?),
            }
        };
        out.insert(column.name(), value);
    }
    Ok(out)
}

#[async_trait]
impl Store for SqliteStore {
    async fn fetch(&self, stmt: &Statement) -> Result<Vec<Row>> {
        let query = stmt
            .args
            .iter()
            .fold(sqlx::query(&stmt.sql), |query, arg| bind(query, arg));

        let rows = query.fetch_all(&self.pool).await?;
        debug!(event = "sqlite fetch", rows = rows.len());

        rows.iter().map(to_row).collect()
    }
}
