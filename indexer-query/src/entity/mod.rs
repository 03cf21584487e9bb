// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Catalogs of the archive entities.
//!
//! Each module declares the columns of its table, the typed object returned
//! in the full-object shape and a `static` [`Catalog`] tying them together.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value as Json};

use crate::batch::BatchDef;
use crate::catalog::{Catalog, Column, Kind};
use crate::value::Row;

pub mod accounts;
pub mod big_map_keys;
pub mod contracts;
pub mod ticket_balances;
pub mod tickets;
pub mod tokens;
pub mod transactions;

pub use accounts::{Account, Accounts};
pub use big_map_keys::{BigMapKey, BigMapKeys};
pub use contracts::{Contract, Contracts};
pub use ticket_balances::{TicketBalance, TicketBalances};
pub use tickets::{Ticket, Tickets};
pub use tokens::{Token, Tokens};
pub use transactions::{Transaction, Transactions};

/// An entity the projector can query.
pub trait Entity {
    /// The full-object shape.
    type Object: DeserializeOwned + Serialize + Send;

    fn catalog() -> &'static Catalog;
}

/// Every catalog, by entity name.
pub fn catalogs() -> [&'static Catalog; 7] {
    [
        Accounts::catalog(),
        Contracts::catalog(),
        Tickets::catalog(),
        TicketBalances::catalog(),
        Tokens::catalog(),
        BigMapKeys::catalog(),
        Transactions::catalog(),
    ]
}

const STORAGE_ID: Column = Column::new("s", "Id", Kind::Int);
const STORAGE_VALUE: Column =
    Column::aliased("s", "JsonValue", "StorageValue", Kind::Json);

fn storage_value(row: &Row) -> Json {
    row.json(STORAGE_VALUE.alias).unwrap_or(Json::Null)
}

/// Storage snapshots referenced by `StorageId`.
pub static STORAGES: BatchDef = BatchDef {
    name: "storages",
    key: Column::new("o", "StorageId", Kind::Int),
    from: r#""Storages" AS s"#,
    id: STORAGE_ID,
    columns: &[STORAGE_ID, STORAGE_VALUE],
    order: STORAGE_ID,
    many: false,
    value: storage_value,
};

const DIFF_TX: Column = Column::new("u", "TransactionId", Kind::Int);
const DIFF_ID: Column = Column::aliased("u", "Id", "UpdateId", Kind::Int);
const DIFF_PTR: Column = Column::new("u", "BigMapPtr", Kind::Int);
const DIFF_ACTION: Column = Column::new("u", "Action", Kind::Int);
const DIFF_KEY: Column = Column::new("u", "JsonKey", Kind::Json);
const DIFF_VALUE: Column = Column::new("u", "JsonValue", Kind::Json);

fn diff_action(code: Option<i64>) -> Option<&'static str> {
    match code? {
        0 => Some("allocate"),
        1 => Some("add_key"),
        2 => Some("update_key"),
        3 => Some("remove_key"),
        4 => Some("remove"),
        _ => None,
    }
}

fn diff_value(row: &Row) -> Json {
    json!({
        "bigmap": row.i64(DIFF_PTR.alias),
        "action": diff_action(row.i64(DIFF_ACTION.alias)),
        "content": {
            "key": row.json(DIFF_KEY.alias),
            "value": row.json(DIFF_VALUE.alias),
        },
    })
}

/// Big map updates made by an operation, in update order.
pub static DIFFS: BatchDef = BatchDef {
    name: "diffs",
    key: Column::new("o", "Id", Kind::Int),
    from: r#""BigMapUpdates" AS u"#,
    id: DIFF_TX,
    columns: &[DIFF_TX, DIFF_ID, DIFF_PTR, DIFF_ACTION, DIFF_KEY, DIFF_VALUE],
    order: DIFF_ID,
    many: true,
    value: diff_value,
};
