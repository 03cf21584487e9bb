// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::Entity;
use crate::catalog::{Catalog, Column, ExtractCtx, FieldDef, Kind, NestedDef};
use crate::lookup::Alias;
use crate::value::Row;

const ID: Column = Column::new("o", "Id", Kind::Int);
const ADDRESS: Column = Column::new("o", "Address", Kind::Text);
const BALANCE: Column = Column::new("o", "Balance", Kind::Int);
const STAKED: Column = Column::new("o", "Staked", Kind::Bool);
const COUNTER: Column = Column::new("o", "Counter", Kind::Int);
const FIRST_LEVEL: Column = Column::new("o", "FirstLevel", Kind::Int);
const LAST_LEVEL: Column = Column::new("o", "LastLevel", Kind::Int);
const ACTIVATED: Column = Column::new("o", "Activated", Kind::Bool);
const DEACTIVATION_LEVEL: Column =
    Column::new("o", "DeactivationLevel", Kind::Int);
const DELEGATE_ID: Column = Column::new("o", "DelegateId", Kind::Int);
const METADATA: Column = Column::new("o", "Metadata", Kind::Json);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub address: String,
    pub alias: Option<String>,
    pub balance: i64,
    pub staked: Option<bool>,
    pub counter: Option<i64>,
    pub first_activity: Option<i64>,
    pub first_activity_time: Option<String>,
    pub last_activity: Option<i64>,
    pub last_activity_time: Option<String>,
    pub num_activations: i64,
    pub deactivation_level: Option<i64>,
    pub deactivation_time: Option<String>,
    pub delegate: Option<Alias>,
    pub metadata: Option<Json>,
}

fn alias(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.alias_name(row.i64(ID.alias))
}

fn first_activity_time(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.timestamp(row.i64(FIRST_LEVEL.alias))
}

fn last_activity_time(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.timestamp(row.i64(LAST_LEVEL.alias))
}

fn num_activations(row: &Row, _: &ExtractCtx<'_>) -> Json {
    match row.bool(ACTIVATED.alias) {
        Some(true) => Json::from(1),
        _ => Json::from(0),
    }
}

/// Baking accounts that are still staked have no deactivation level.
fn active_deactivation_level(row: &Row) -> Option<i64> {
    match row.bool(STAKED.alias) {
        Some(true) => None,
        _ => row.i64(DEACTIVATION_LEVEL.alias),
    }
}

fn deactivation_level(row: &Row, _: &ExtractCtx<'_>) -> Json {
    active_deactivation_level(row).map_or(Json::Null, Json::from)
}

fn deactivation_time(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.timestamp(active_deactivation_level(row))
}

fn delegate(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.alias(row.i64(DELEGATE_ID.alias))
}

static CATALOG: Catalog = Catalog {
    entity: "accounts",
    from: r#""Accounts" AS o"#,
    primary_key: ID,
    fields: &[
        FieldDef::direct("id", &[ID]).sortable(),
        FieldDef::direct("address", &[ADDRESS]),
        FieldDef::derived("alias", &[ID], alias),
        FieldDef::direct("balance", &[BALANCE]).sortable(),
        FieldDef::direct("staked", &[STAKED]),
        FieldDef::direct("counter", &[COUNTER]).sortable(),
        FieldDef::direct("firstActivity", &[FIRST_LEVEL]).sortable(),
        FieldDef::derived("firstActivityTime", &[FIRST_LEVEL], first_activity_time)
            .sortable(),
        FieldDef::direct("lastActivity", &[LAST_LEVEL]).sortable(),
        FieldDef::derived("lastActivityTime", &[LAST_LEVEL], last_activity_time)
            .sortable(),
        FieldDef::derived("numActivations", &[ACTIVATED], num_activations),
        FieldDef::derived(
            "deactivationLevel",
            &[DEACTIVATION_LEVEL, STAKED],
            deactivation_level,
        )
        .sortable(),
        FieldDef::derived(
            "deactivationTime",
            &[DEACTIVATION_LEVEL, STAKED],
            deactivation_time,
        )
        .sortable(),
        FieldDef::derived("delegate", &[DELEGATE_ID], delegate),
        FieldDef::direct("metadata", &[METADATA]),
    ],
    nested: &[NestedDef {
        prefix: "metadata",
        column: METADATA,
    }],
};

pub struct Accounts;

impl Entity for Accounts {
    type Object = Account;

    fn catalog() -> &'static Catalog {
        &CATALOG
    }
}
