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
const TICKETER_ID: Column = Column::new("o", "TicketerId", Kind::Int);
const CONTENT_TYPE: Column = Column::new("o", "JsonContentType", Kind::Json);
const CONTENT: Column = Column::new("o", "JsonContent", Kind::Json);
const FIRST_LEVEL: Column = Column::new("o", "FirstLevel", Kind::Int);
const LAST_LEVEL: Column = Column::new("o", "LastLevel", Kind::Int);
const TOTAL_SUPPLY: Column = Column::new("o", "TotalSupply", Kind::Text);
const HOLDERS_COUNT: Column = Column::new("o", "HoldersCount", Kind::Int);
const METADATA: Column = Column::new("o", "Metadata", Kind::Json);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub ticketer: Option<Alias>,
    pub content_type: Option<Json>,
    pub content: Option<Json>,
    pub first_level: i64,
    pub first_time: Option<String>,
    pub last_level: i64,
    pub total_supply: Option<String>,
    pub holders_count: Option<i64>,
    pub metadata: Option<Json>,
}

fn ticketer(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.alias(row.i64(TICKETER_ID.alias))
}

fn first_time(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.timestamp(row.i64(FIRST_LEVEL.alias))
}

// Ids are allocated in level order, so sorting by first level is sorting by
// id.
static CATALOG: Catalog = Catalog {
    entity: "tickets",
    from: r#""Tickets" AS o"#,
    primary_key: ID,
    fields: &[
        FieldDef::direct("id", &[ID]).sortable(),
        FieldDef::derived("ticketer", &[TICKETER_ID], ticketer),
        FieldDef::direct("contentType", &[CONTENT_TYPE]),
        FieldDef::direct("content", &[CONTENT]),
        FieldDef::direct("firstLevel", &[FIRST_LEVEL]).sort_by(ID, None),
        FieldDef::derived("firstTime", &[FIRST_LEVEL], first_time).sort_by(ID, None),
        FieldDef::direct("lastLevel", &[LAST_LEVEL]).sortable(),
        FieldDef::direct("totalSupply", &[TOTAL_SUPPLY]),
        FieldDef::direct("holdersCount", &[HOLDERS_COUNT]).sortable(),
        FieldDef::direct("metadata", &[METADATA]),
    ],
    nested: &[NestedDef {
        prefix: "metadata",
        column: METADATA,
    }],
};

pub struct Tickets;

impl Entity for Tickets {
    type Object = Ticket;

    fn catalog() -> &'static Catalog {
        &CATALOG
    }
}
