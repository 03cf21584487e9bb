// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::{Entity, STORAGES};
use crate::catalog::{Catalog, Column, ExtractCtx, FieldDef, Kind, NestedDef};
use crate::lookup::Alias;
use crate::value::Row;

const ID: Column = Column::new("o", "Id", Kind::Int);
const ADDRESS: Column = Column::new("o", "Address", Kind::Text);
const KIND: Column = Column::new("o", "Kind", Kind::Int);
const BALANCE: Column = Column::new("o", "Balance", Kind::Int);
const CREATOR_ID: Column = Column::new("o", "CreatorId", Kind::Int);
const FIRST_LEVEL: Column = Column::new("o", "FirstLevel", Kind::Int);
const LAST_LEVEL: Column = Column::new("o", "LastLevel", Kind::Int);
const STORAGE_ID: Column = Column::new("o", "StorageId", Kind::Int);
const METADATA: Column = Column::new("o", "Metadata", Kind::Json);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: i64,
    pub address: String,
    pub alias: Option<String>,
    pub kind: Option<String>,
    pub balance: i64,
    pub creator: Option<Alias>,
    pub first_activity: Option<i64>,
    pub first_activity_time: Option<String>,
    pub last_activity: Option<i64>,
    pub storage: Option<Json>,
    pub metadata: Option<Json>,
}

fn alias(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.alias_name(row.i64(ID.alias))
}

fn kind(row: &Row, _: &ExtractCtx<'_>) -> Json {
    let kind = match row.i64(KIND.alias) {
        Some(0) => "delegator_contract",
        Some(1) => "smart_contract",
        Some(2) => "asset",
        _ => return Json::Null,
    };
    Json::from(kind)
}

fn creator(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.alias(row.i64(CREATOR_ID.alias))
}

fn first_activity_time(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.timestamp(row.i64(FIRST_LEVEL.alias))
}

fn storage(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.batched(&STORAGES, row.i64(STORAGE_ID.alias))
}

static CATALOG: Catalog = Catalog {
    entity: "contracts",
    from: r#""Contracts" AS o"#,
    primary_key: ID,
    fields: &[
        FieldDef::direct("id", &[ID]).sortable(),
        FieldDef::direct("address", &[ADDRESS]),
        FieldDef::derived("alias", &[ID], alias),
        FieldDef::derived("kind", &[KIND], kind),
        FieldDef::direct("balance", &[BALANCE]).sortable(),
        FieldDef::derived("creator", &[CREATOR_ID], creator),
        FieldDef::direct("firstActivity", &[FIRST_LEVEL]).sortable(),
        FieldDef::derived("firstActivityTime", &[FIRST_LEVEL], first_activity_time)
            .sortable(),
        FieldDef::direct("lastActivity", &[LAST_LEVEL]).sortable(),
        FieldDef::derived("storage", &[STORAGE_ID], storage).batched(&STORAGES),
        FieldDef::direct("metadata", &[METADATA]),
    ],
    nested: &[NestedDef {
        prefix: "metadata",
        column: METADATA,
    }],
};

pub struct Contracts;

impl Entity for Contracts {
    type Object = Contract;

    fn catalog() -> &'static Catalog {
        &CATALOG
    }
}
