// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::Entity;
use crate::catalog::{Catalog, Column, FieldDef, Kind, NestedDef};

const ID: Column = Column::new("o", "Id", Kind::Int);
const BIGMAP: Column = Column::new("o", "BigMapPtr", Kind::Int);
const ACTIVE: Column = Column::new("o", "Active", Kind::Bool);
const KEY_HASH: Column = Column::new("o", "KeyHash", Kind::Text);
const KEY: Column = Column::new("o", "JsonKey", Kind::Json);
const RAW_KEY: Column = Column::new("o", "RawKey", Kind::Hex);
const VALUE: Column = Column::new("o", "JsonValue", Kind::Json);
const FIRST_LEVEL: Column = Column::new("o", "FirstLevel", Kind::Int);
const LAST_LEVEL: Column = Column::new("o", "LastLevel", Kind::Int);
const UPDATES: Column = Column::new("o", "Updates", Kind::Int);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BigMapKey {
    pub id: i64,
    pub bigmap: i64,
    pub active: bool,
    pub hash: String,
    pub key: Option<Json>,
    pub value: Option<Json>,
    pub first_level: i64,
    pub last_level: i64,
    pub updates: i64,
}

static CATALOG: Catalog = Catalog {
    entity: "big_map_keys",
    from: r#""BigMapKeys" AS o"#,
    primary_key: ID,
    fields: &[
        FieldDef::direct("id", &[ID]).sortable(),
        FieldDef::direct("bigmap", &[BIGMAP]).sortable(),
        FieldDef::direct("active", &[ACTIVE]),
        FieldDef::direct("hash", &[KEY_HASH]),
        FieldDef::direct("key", &[KEY]),
        FieldDef::direct("rawKey", &[RAW_KEY]).on_demand(),
        FieldDef::direct("value", &[VALUE]),
        FieldDef::direct("firstLevel", &[FIRST_LEVEL]).sortable(),
        FieldDef::direct("lastLevel", &[LAST_LEVEL]).sortable(),
        FieldDef::direct("updates", &[UPDATES]).sortable(),
    ],
    nested: &[
        NestedDef {
            prefix: "key",
            column: KEY,
        },
        NestedDef {
            prefix: "value",
            column: VALUE,
        },
    ],
};

pub struct BigMapKeys;

impl Entity for BigMapKeys {
    type Object = BigMapKey;

    fn catalog() -> &'static Catalog {
        &CATALOG
    }
}
