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
const CONTRACT_ID: Column = Column::new("o", "ContractId", Kind::Int);
const TOKEN_ID: Column = Column::new("o", "TokenId", Kind::Text);
const TAGS: Column = Column::new("o", "Tags", Kind::Int);
const FIRST_LEVEL: Column = Column::new("o", "FirstLevel", Kind::Int);
const LAST_LEVEL: Column = Column::new("o", "LastLevel", Kind::Int);
const TOTAL_SUPPLY: Column = Column::new("o", "TotalSupply", Kind::Text);
const HOLDERS_COUNT: Column = Column::new("o", "HoldersCount", Kind::Int);
const METADATA: Column = Column::new("o", "Metadata", Kind::Json);

const TAG_FA12: i64 = 0b01;
const TAG_FA2: i64 = 0b10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: i64,
    pub contract: Option<Alias>,
    pub token_id: String,
    pub standard: Option<String>,
    pub first_level: i64,
    pub first_time: Option<String>,
    pub last_level: i64,
    pub total_supply: Option<String>,
    pub holders_count: Option<i64>,
    pub metadata: Option<Json>,
}

fn contract(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.alias(row.i64(CONTRACT_ID.alias))
}

fn standard(row: &Row, _: &ExtractCtx<'_>) -> Json {
    match row.i64(TAGS.alias) {
        Some(tags) if tags & TAG_FA2 != 0 => Json::from("fa2"),
        Some(tags) if tags & TAG_FA12 != 0 => Json::from("fa1.2"),
        _ => Json::Null,
    }
}

fn first_time(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.timestamp(row.i64(FIRST_LEVEL.alias))
}

static CATALOG: Catalog = Catalog {
    entity: "tokens",
    from: r#""Tokens" AS o"#,
    primary_key: ID,
    fields: &[
        FieldDef::direct("id", &[ID]).sortable(),
        FieldDef::derived("contract", &[CONTRACT_ID], contract),
        FieldDef::direct("tokenId", &[TOKEN_ID]),
        FieldDef::derived("standard", &[TAGS], standard),
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

pub struct Tokens;

impl Entity for Tokens {
    type Object = Token;

    fn catalog() -> &'static Catalog {
        &CATALOG
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::batch::Batches;
    use crate::lookup::Lookups;
    use crate::value::Value;

    #[test]
    fn test_standard_from_tags() {
        let lookups = Lookups::default();
        let batches = Batches::default();
        let ctx = ExtractCtx {
            lookups: &lookups,
            batches: &batches,
            quote: None,
        };
        let tags = |v: Value| standard(&Row::from([("Tags", v)]), &ctx);

        assert_eq!(tags(Value::Int(TAG_FA12)), json!("fa1.2"));
        assert_eq!(tags(Value::Int(TAG_FA2 | 0b100)), json!("fa2"));
        assert_eq!(tags(Value::Int(0)), Json::Null);
        assert_eq!(tags(Value::Null), Json::Null);
    }
}
