// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use indexer_query::lookup::{AliasCache, QuoteCache, TimeCache};
use indexer_query::{
    Alias, Lookups, Projector, Result, Row, SqliteStore, Statement, Store,
    Symbol,
};
use parking_lot::Mutex;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

const SCHEMA: &str = r#"
CREATE TABLE "Accounts" (
    "Id" INTEGER PRIMARY KEY,
    "Address" TEXT NOT NULL,
    "Balance" INTEGER NOT NULL,
    "Staked" INTEGER NOT NULL,
    "Counter" INTEGER,
    "FirstLevel" INTEGER,
    "LastLevel" INTEGER,
    "Activated" INTEGER,
    "DeactivationLevel" INTEGER,
    "DelegateId" INTEGER,
    "Metadata" TEXT
);
CREATE TABLE "Contracts" (
    "Id" INTEGER PRIMARY KEY,
    "Address" TEXT NOT NULL,
    "Kind" INTEGER NOT NULL,
    "Balance" INTEGER NOT NULL,
    "CreatorId" INTEGER,
    "FirstLevel" INTEGER,
    "LastLevel" INTEGER,
    "StorageId" INTEGER,
    "Metadata" TEXT
);
CREATE TABLE "Tickets" (
    "Id" INTEGER PRIMARY KEY,
    "TicketerId" INTEGER NOT NULL,
    "JsonContentType" TEXT,
    "JsonContent" TEXT,
    "FirstLevel" INTEGER NOT NULL,
    "LastLevel" INTEGER NOT NULL,
    "TotalSupply" TEXT,
    "HoldersCount" INTEGER,
    "Metadata" TEXT
);
CREATE TABLE "TicketBalances" (
    "Id" INTEGER PRIMARY KEY,
    "TicketId" INTEGER NOT NULL,
    "AccountId" INTEGER NOT NULL,
    "Balance" TEXT,
    "FirstLevel" INTEGER NOT NULL,
    "LastLevel" INTEGER NOT NULL
);
CREATE TABLE "Tokens" (
    "Id" INTEGER PRIMARY KEY,
    "ContractId" INTEGER NOT NULL,
    "TokenId" TEXT NOT NULL,
    "Tags" INTEGER,
    "FirstLevel" INTEGER NOT NULL,
    "LastLevel" INTEGER NOT NULL,
    "TotalSupply" TEXT,
    "HoldersCount" INTEGER,
    "Metadata" TEXT
);
CREATE TABLE "BigMapKeys" (
    "Id" INTEGER PRIMARY KEY,
    "BigMapPtr" INTEGER NOT NULL,
    "Active" INTEGER NOT NULL,
    "KeyHash" TEXT NOT NULL,
    "JsonKey" TEXT,
    "RawKey" BLOB,
    "JsonValue" TEXT,
    "FirstLevel" INTEGER NOT NULL,
    "LastLevel" INTEGER NOT NULL,
    "Updates" INTEGER NOT NULL
);
CREATE TABLE "Transactions" (
    "Id" INTEGER PRIMARY KEY,
    "Level" INTEGER NOT NULL,
    "OpHash" TEXT NOT NULL,
    "SenderId" INTEGER,
    "TargetId" INTEGER,
    "Amount" INTEGER NOT NULL,
    "Status" INTEGER,
    "StorageId" INTEGER,
    "JsonParameters" TEXT
);
CREATE TABLE "Storages" (
    "Id" INTEGER PRIMARY KEY,
    "JsonValue" TEXT
);
CREATE TABLE "BigMapUpdates" (
    "Id" INTEGER PRIMARY KEY,
    "TransactionId" INTEGER NOT NULL,
    "BigMapPtr" INTEGER NOT NULL,
    "Action" INTEGER NOT NULL,
    "JsonKey" TEXT,
    "JsonValue" TEXT
);
"#;

const FIXTURES: &str = r#"
INSERT INTO "Accounts" VALUES
    (1, 'tz1one', 100, 1, 5, 3, 10, 1, 50, NULL, '{"symbol":"AAA","decimals":"8"}'),
    (2, 'tz1two', 7, 0, 2, 3, 12, NULL, 80, 1, NULL),
    (3, 'tz1three', 7, 0, 0, 1, 4, 0, NULL, 1, '{"symbol":"CCC","tags":["x","y"]}'),
    (4, 'tz1four', 30, 1, 9, 3, 9, 1, NULL, NULL, 'not json');

INSERT INTO "Contracts" VALUES
    (10, 'KT1ten', 1, 500, 1, 2, 20, 1, '{"name":"Ten"}'),
    (11, 'KT1eleven', 2, 0, 2, 5, 5, 2, NULL),
    (12, 'KT1twelve', 0, 3, NULL, 6, 6, 99, NULL);

INSERT INTO "Tickets" VALUES
    (1, 10, '{"prim":"string"}', '"hello"', 10, 20, '1000', 2, '{"symbol":"FOO","decimals":"6"}'),
    (2, 10, '{"prim":"nat"}', '{"int":"1"}', 11, 11, '5', 1, '{"symbol":"BAR","decimals":"12"}'),
    (3, 11, '{"prim":"unit"}', NULL, 11, 15, '0', 0, NULL);

INSERT INTO "TicketBalances" VALUES
    (1, 1, 1, '600', 10, 20),
    (2, 1, 2, '400', 12, 15),
    (3, 2, 1, '5', 11, 11);

INSERT INTO "Tokens" VALUES
    (1, 10, '0', 1, 2, 20, '1000000', 3, '{"symbol":"TEN","decimals":"6"}'),
    (2, 11, '0', 2, 5, 5, '1', 1, '{"0":"zero"}'),
    (3, 11, '1', 6, 5, 7, '2', 1, '{"symbol":"NFT"}');

INSERT INTO "BigMapKeys" VALUES
    (1, 7, 1, 'exprA', '"alice"', X'0100a1', '{"balance":"10"}', 4, 8, 2),
    (2, 7, 0, 'exprB', '"bob"', NULL, NULL, 5, 9, 3);

INSERT INTO "Storages" VALUES
    (1, '{"counter":"1"}'),
    (2, '{"counter":"2"}'),
    (3, '{"counter":"3"}');

INSERT INTO "Transactions" VALUES
    (1, 1, 'op1', 1, 10, 5, 1, 1, '{"entrypoint":"default","value":{"prim":"Unit"}}'),
    (2, 2, 'op2', 2, 10, 0, 1, 2, NULL),
    (3, 2, 'op3', 1, 11, 7, 4, 3, NULL),
    (4, 3, 'op4', 3, 10, 1, 1, 1, NULL),
    (5, 4, 'op5', 2, 11, 9, 1, 2, NULL),
    (6, 5, 'op6', 1, 10, 2, 2, 3, NULL),
    (7, 6, 'op7', 4, 10, 4, 1, 1, NULL),
    (8, 7, 'op8', 1, 12, 3, 1, 2, NULL),
    (9, 8, 'op9', 2, 10, 8, 3, 3, NULL),
    (10, 9, 'op10', 3, 11, 6, 1, 1, NULL),
    (11, 10, 'op11', 1, 2, 100, 1, NULL, NULL);

INSERT INTO "BigMapUpdates" VALUES
    (1, 1, 7, 1, '"alice"', '{"balance":"10"}'),
    (2, 1, 7, 1, '"bob"', '{"balance":"3"}'),
    (3, 4, 7, 2, '"alice"', '{"balance":"9"}'),
    (4, 6, 7, 3, '"bob"', NULL);
"#;

/// In-memory archive with the full schema and fixtures loaded.
pub async fn create_test_pool() -> SqlitePool {
    // Every connection to `sqlite::memory:` is a separate database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();
    sqlx::raw_sql(FIXTURES).execute(&pool).await.unwrap();

    pool
}

/// Forwards to the inner store, remembering every statement.
pub struct Recorder<S> {
    inner: S,
    statements: Mutex<Vec<Statement>>,
}

impl<S> Recorder<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            statements: Mutex::new(vec![]),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn calls(&self) -> usize {
        self.statements.lock().len()
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().clone()
    }

    pub fn clear(&self) {
        self.statements.lock().clear();
    }
}

#[async_trait]
impl<S: Store> Store for Recorder<S> {
    async fn fetch(&self, stmt: &Statement) -> Result<Vec<Row>> {
        self.statements.lock().push(stmt.clone());
        self.inner.fetch(stmt).await
    }
}

pub fn lookups() -> Lookups {
    let aliases = Arc::new(AliasCache::default());
    for (id, name, address) in [
        (1, Some("Foundation"), "tz1one"),
        (2, None, "tz1two"),
        (3, Some("Baker"), "tz1three"),
        (10, Some("Ten"), "KT1ten"),
        (11, None, "KT1eleven"),
    ] {
        aliases.insert(
            id,
            Alias {
                name: name.map(String::from),
                address: address.into(),
            },
        );
    }

    let genesis = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let times = Arc::new(TimeCache::new(
        (0..100)
            .map(|level| genesis + chrono::Duration::seconds(level * 30))
            .collect(),
    ));

    let quotes = Arc::new(QuoteCache::default());
    quotes.insert(0, Symbol::Usd, 1.0);
    quotes.insert(5, Symbol::Usd, 2.5);
    quotes.insert(0, Symbol::Eur, 0.9);

    Lookups::default()
        .with_aliases(aliases)
        .with_times(times)
        .with_quotes(quotes)
}

pub type TestProjector = Projector<Arc<Recorder<SqliteStore>>>;

pub async fn projector() -> TestProjector {
    let store = SqliteStore::from_pool(create_test_pool().await);
    Projector::new(Arc::new(Recorder::new(store))).with_lookups(lookups())
}

/// The select list of a recorded statement, one item per column.
pub fn select_list(stmt: &Statement) -> Vec<String> {
    let list = stmt
        .sql
        .strip_prefix("SELECT ")
        .and_then(|rest| rest.split_once(" FROM "))
        .map(|(list, _)| list)
        .unwrap_or_default();
    list.split(", ").map(String::from).collect()
}
