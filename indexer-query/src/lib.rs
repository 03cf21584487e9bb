// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Dynamic field-projection over the archive database.
//!
//! Callers request any subset of an entity's fields; the [`Projector`]
//! selects only the columns those fields need, runs one statement and
//! projects the rows into full objects, a single column or a table.

pub mod batch;
pub mod catalog;
pub mod columns;
pub mod conf;
pub mod entity;
mod error;
pub mod executor;
pub mod field;
pub mod filter;
pub mod lookup;
pub mod sort;
pub mod sqlite;
pub mod statement;
pub mod store;
pub mod value;

pub use catalog::{Catalog, Column, FieldDef, Kind};
pub use entity::Entity;
pub use error::{Error, Result};
pub use executor::{Projection, Projector, Query, Select};
pub use filter::{Condition, Filter};
pub use lookup::{Alias, Lookups, Symbol};
pub use sort::{Direction, Page, SortCast, SortSpec};
pub use sqlite::SqliteStore;
pub use statement::{Arg, Statement};
pub use store::Store;
pub use value::{Row, Value};
