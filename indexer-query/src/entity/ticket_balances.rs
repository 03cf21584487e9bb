// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Ticket balances, joined with the ticket they hold.
//!
//! Ticket columns come from the join and are read back under `Ticket*`
//! aliases so they never shadow the balance's own columns.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::Entity;
use crate::catalog::{Catalog, Column, ExtractCtx, FieldDef, Kind, NestedDef};
use crate::lookup::Alias;
use crate::value::Row;

const ID: Column = Column::new("o", "Id", Kind::Int);
const ACCOUNT_ID: Column = Column::new("o", "AccountId", Kind::Int);
const BALANCE: Column = Column::new("o", "Balance", Kind::Text);
const FIRST_LEVEL: Column = Column::new("o", "FirstLevel", Kind::Int);
const LAST_LEVEL: Column = Column::new("o", "LastLevel", Kind::Int);
const TICKET_ID: Column = Column::new("o", "TicketId", Kind::Int);
const TICKETER_ID: Column =
    Column::aliased("t", "TicketerId", "TicketTicketerId", Kind::Int);
const CONTENT_TYPE: Column =
    Column::aliased("t", "JsonContentType", "TicketContentType", Kind::Json);
const CONTENT: Column =
    Column::aliased("t", "JsonContent", "TicketContent", Kind::Json);
const METADATA: Column =
    Column::aliased("t", "Metadata", "TicketMetadata", Kind::Json);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketInfo {
    pub id: i64,
    pub ticketer: Option<Alias>,
    pub content_type: Option<Json>,
    pub content: Option<Json>,
    pub metadata: Option<Json>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketBalance {
    pub id: i64,
    pub account: Option<Alias>,
    pub balance: Option<String>,
    pub first_level: i64,
    pub last_level: i64,
    pub ticket: TicketInfo,
}

fn account(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.alias(row.i64(ACCOUNT_ID.alias))
}

fn ticketer(row: &Row, ctx: &ExtractCtx<'_>) -> Json {
    ctx.alias(row.i64(TICKETER_ID.alias))
}

static CATALOG: Catalog = Catalog {
    entity: "ticket_balances",
    from: r#""TicketBalances" AS o INNER JOIN "Tickets" AS t ON t."Id" = o."TicketId""#,
    primary_key: ID,
    fields: &[
        FieldDef::direct("id", &[ID]).sortable(),
        FieldDef::derived("account", &[ACCOUNT_ID], account),
        FieldDef::direct("balance", &[BALANCE]),
        FieldDef::direct("firstLevel", &[FIRST_LEVEL]).sort_by(ID, None),
        FieldDef::direct("lastLevel", &[LAST_LEVEL]).sortable(),
        FieldDef::direct("ticket.id", &[TICKET_ID]).sortable(),
        FieldDef::derived("ticket.ticketer", &[TICKETER_ID], ticketer),
        FieldDef::direct("ticket.contentType", &[CONTENT_TYPE]),
        FieldDef::direct("ticket.content", &[CONTENT]),
        FieldDef::direct("ticket.metadata", &[METADATA]),
    ],
    nested: &[NestedDef {
        prefix: "ticket.metadata",
        column: METADATA,
    }],
};

pub struct TicketBalances;

impl Entity for TicketBalances {
    type Object = TicketBalance;

    fn catalog() -> &'static Catalog {
        &CATALOG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnSet;
    use crate::field::FieldSpec;

    #[test]
    fn test_ticket_metadata_is_nested_over_join() {
        let specs = vec![
            FieldSpec::parse("ticket.metadata.symbol"),
            FieldSpec::parse("ticket.id"),
        ];
        let (set, fields) = ColumnSet::resolve(&CATALOG, specs).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(fields[0].resolved_column(), Some("c0"));
        assert!(CATALOG.resolve_columns("ticket.metadata.$where").is_err());
    }

    #[test]
    fn test_bare_ticket_metadata_is_a_field() {
        assert_eq!(
            CATALOG.resolve_columns("ticket.metadata").unwrap(),
            vec![METADATA]
        );
        assert!(CATALOG.resolve_columns("ticket.bogus").unwrap().is_empty());
    }
}
