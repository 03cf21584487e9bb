// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Transaction operations.
//!
//! `storage` and `diffs` live in separate tables and are resolved with one
//! batched lookup each, `quote` uses the symbol requested with the query.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::{Entity, DIFFS, STORAGES};
use crate::catalog::{Catalog, Column, ExtractCtx, FieldDef, Kind, NestedDef};
use crate::lookup::Alias;
use crate::value::Row;

const ID: Column = Column::new("o", "Id", Kind::Int);
const LEVEL: Column = Column::new("o", "Level", Kind::Int);
const HASH: Column = Column::new("o", "OpHash", Kind::Text);
const SENDER_ID: Column = Column::new("o", "SenderId", Kind::Int);
const TARGET_ID: Column = Column::new("o", "TargetId", Kind::Int);
const AMOUNT: Column = Column::new("o", "Amount", Kind::Int);
const STATUS: Column = Column::new("o", "Status", Kind::Int);
const STORAGE_ID: Column = Column::new("o", "StorageId", Kind::Int);
const PARAMETER: Column = Column::new("o", "JsonParameters", Kind::Json);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub level: i64,
    pub timestamp: Option<String>,
    pub hash: String,
    pub sender: Option<Alias>,
    pub target: Option<Alias>,
    pub amount: i64,
    pub status: Option<String>,
    pub parameter: Option<Json>,
    pub storage: Option<Json>,
    pub diffs: Option<Json>,
    pub quote: Option<f64>,
}

fn timestamp(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.timestamp(row.i64(LEVEL.alias))
}

fn sender(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.alias(row.i64(SENDER_ID.alias))
}

fn target(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.alias(row.i64(TARGET_ID.alias))
}

fn status(row: &Row, _: &ExtractCtx<'_>) -> Json {
    let status = match row.i64(STATUS.alias) {
        Some(1) => "applied",
        Some(2) => "backtracked",
        Some(3) => "skipped",
        Some(4) => "failed",
        _ => return Json::Null,
    };
    Json::from(status)
}

fn storage(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.batched(&STORAGES, row.i64(STORAGE_ID.alias))
}

fn diffs(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.batched(&DIFFS, row.i64(ID.alias))
}

fn quote(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.quote(row.i64(LEVEL.alias))
}

static CATALOG: Catalog = Catalog {
    entity: "transactions",
    from: r#""Transactions" AS o"#,
    primary_key: ID,
    fields: &[
        FieldDef::direct("id", &[ID]).sortable(),
        FieldDef::direct("level", &[LEVEL]).sortable(),
        FieldDef::derived("timestamp", &[LEVEL], timestamp).sortable(),
        FieldDef::direct("hash", &[HASH]),
        FieldDef::derived("sender", &[SENDER_ID], sender),
        FieldDef::derived("target", &[TARGET_ID], target),
        FieldDef::direct("amount", &[AMOUNT]).sortable(),
        FieldDef::derived("status", &[STATUS], status),
        FieldDef::direct("parameter", &[PARAMETER]),
        FieldDef::derived("storage", &[STORAGE_ID], storage).batched(&STORAGES),
        FieldDef::derived("diffs", &[ID], diffs).batched(&DIFFS),
        FieldDef::derived("quote", &[LEVEL], quote),
    ],
    nested: &[NestedDef {
        prefix: "parameter",
        column: PARAMETER,
    }],
};

pub struct Transactions;

impl Entity for Transactions {
    type Object = Transaction;

    fn catalog() -> &'static Catalog {
        &CATALOG
    }
}
