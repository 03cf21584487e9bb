// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Field catalogs.
//!
//! A [`Catalog`] is the single source of truth for one entity: for every
//! requestable field it names the columns the field needs, how the final
//! value is computed from them and which key sorting by the field uses.
//! Catalogs are `static` data, built once and never mutated.

use std::hash::{Hash, Hasher};

use serde_json::Value as Json;

use crate::batch::{BatchDef, Batches};
use crate::error::Result;
use crate::field::{json_path, validate_path, FieldSpec};
use crate::lookup::{Lookups, Symbol};
use crate::sort::{ResolvedSort, SortExpr};
use crate::value::{Row, Value};

/// How a stored cell is turned into an output value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Int,
    Real,
    Bool,
    Text,
    /// Text cell holding a JSON document.
    Json,
    /// Binary cell rendered as lowercase hex.
    Hex,
}

impl Kind {
    pub fn to_json(self, value: &Value) -> Json {
        match (self, value) {
            (_, Value::Null) => Json::Null,
            (Kind::Int, v) => v.as_i64().map_or(Json::Null, Json::from),
            (Kind::Real, v) | (Kind::Json, v @ Value::Real(_)) => v
                .as_f64()
                .and_then(serde_json::Number::from_f64)
                .map_or(Json::Null, Json::Number),
            (Kind::Bool, v) => v.as_bool().map_or(Json::Null, Json::Bool),
            (Kind::Text | Kind::Hex, Value::Text(s)) => Json::String(s.clone()),
            (Kind::Text, Value::Int(v)) => Json::String(v.to_string()),
            (Kind::Text, Value::Real(v)) => Json::String(v.to_string()),
            (Kind::Text, Value::Blob(b)) => {
                Json::String(String::from_utf8_lossy(b).into_owned())
            }
            (Kind::Json, Value::Text(s)) => {
                serde_json::from_str(s).unwrap_or(Json::Null)
            }
            (Kind::Json, Value::Int(v)) => Json::from(*v),
            (Kind::Json, Value::Blob(b)) => {
                serde_json::from_slice(b).unwrap_or(Json::Null)
            }
            (Kind::Hex, Value::Blob(b)) => Json::String(hex::encode(b)),
            (Kind::Hex, _) => Json::Null,
        }
    }
}

/// A closed SQL column reference: `source."name"`, read back as `alias`.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub source: &'static str,
    pub name: &'static str,
    pub alias: &'static str,
    pub kind: Kind,
}

impl Column {
    pub const fn new(source: &'static str, name: &'static str, kind: Kind) -> Self {
        Self {
            source,
            name,
            alias: name,
            kind,
        }
    }

    pub const fn aliased(
        source: &'static str,
        name: &'static str,
        alias: &'static str,
        kind: Kind,
    ) -> Self {
        Self {
            source,
            name,
            alias,
            kind,
        }
    }

    /// The expression text, used both in SQL and as the dedup key.
    pub fn expr(&self) -> String {
        format!(r#"{}."{}""#, self.source, self.name)
    }

    /// The expression as a JSON document, `NULL` where the cell does not
    /// hold valid JSON, so path lookups never fail on malformed data.
    pub fn json_expr(&self) -> String {
        let expr = self.expr();
        format!("CASE WHEN json_valid({expr}) THEN {expr} END")
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.name == other.name
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.name.hash(state);
    }
}

/// Everything a derived field may consult besides its own row.
pub struct ExtractCtx<'a> {
    pub lookups: &'a Lookups,
    pub batches: &'a Batches,
    pub quote: Option<Symbol>,
}

impl ExtractCtx<'_> {
    /// `{ name, address }` of the account with the given id.
    pub fn alias(&self, id: Option<i64>) -> Json {
        id.and_then(|id| self.lookups.alias(id))
            .and_then(|alias| serde_json::to_value(alias).ok())
            .unwrap_or(Json::Null)
    }

    /// Display name of the account with the given id, if it has one.
    pub fn alias_name(&self, id: Option<i64>) -> Json {
        id.and_then(|id| self.lookups.alias(id))
            .and_then(|alias| alias.name)
            .map_or(Json::Null, Json::String)
    }

    /// RFC 3339 timestamp of the block at the given level.
    pub fn timestamp(&self, level: Option<i64>) -> Json {
        level
            .and_then(|level| self.lookups.timestamp(level))
            .map_or(Json::Null, |ts| {
                Json::String(
                    ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                )
            })
    }

    /// Price at the given level in the symbol requested by the caller.
    pub fn quote(&self, level: Option<i64>) -> Json {
        match (self.quote, level) {
            (Some(symbol), Some(level)) => self
                .lookups
                .quote(symbol, level)
                .and_then(serde_json::Number::from_f64)
                .map_or(Json::Null, Json::Number),
            _ => Json::Null,
        }
    }

    /// Value fetched by a batched follow-up query, joined by id.
    pub fn batched(&self, def: &BatchDef, id: Option<i64>) -> Json {
        id.and_then(|id| self.batches.get(def, id))
            .cloned()
            .unwrap_or(Json::Null)
    }
}

pub type DeriveFn = fn(&Row, &ExtractCtx<'_>) -> Json;

#[derive(Clone, Copy)]
pub enum Extract {
    /// Copy the single column through its [`Kind`].
    Direct,
    /// Compute the value from all declared columns.
    Derived(DeriveFn),
}

impl std::fmt::Debug for Extract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Extract::Direct => write!(f, "Direct"),
            Extract::Derived(_) => write!(f, "Derived"),
        }
    }
}

/// Sort column plus the tie-break that makes the order total.
///
/// A `None` tie-break means the catalog's primary key.
#[derive(Debug, Clone, Copy)]
pub struct SortKey {
    pub column: Column,
    pub tie_break: Option<Column>,
}

#[derive(Debug)]
pub struct FieldDef {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub extract: Extract,
    pub sort: Option<SortKey>,
    pub batch: Option<&'static BatchDef>,
    /// Whether the field is part of the full-object shape.
    pub full: bool,
}

impl FieldDef {
    pub const fn direct(name: &'static str, columns: &'static [Column]) -> Self {
        Self {
            name,
            columns,
            extract: Extract::Direct,
            sort: None,
            batch: None,
            full: true,
        }
    }

    pub const fn derived(
        name: &'static str,
        columns: &'static [Column],
        derive: DeriveFn,
    ) -> Self {
        Self {
            name,
            columns,
            extract: Extract::Derived(derive),
            sort: None,
            batch: None,
            full: true,
        }
    }

    /// Sortable by its first column, primary key tie-break.
    pub const fn sortable(self) -> Self {
        let column = self.columns[0];
        self.sort_by(column, None)
    }

    pub const fn sort_by(self, column: Column, tie_break: Option<Column>) -> Self {
        Self {
            sort: Some(SortKey { column, tie_break }),
            ..self
        }
    }

    pub const fn batched(self, batch: &'static BatchDef) -> Self {
        Self {
            batch: Some(batch),
            ..self
        }
    }

    /// Only returned when explicitly selected.
    pub const fn on_demand(self) -> Self {
        Self {
            full: false,
            ..self
        }
    }

    /// The one extraction routine shared by every output shape.
    pub fn extract(&self, row: &Row, ctx: &ExtractCtx<'_>) -> Json {
        match self.extract {
            Extract::Direct => match self.columns.first() {
                Some(column) => column
                    .kind
                    .to_json(row.get(column.alias).unwrap_or(&Value::Null)),
                None => Json::Null,
            },
            Extract::Derived(derive) => derive(row, ctx),
        }
    }
}

/// Wildcard entry for arbitrary JSON sub-paths below `prefix`.
#[derive(Debug, Clone, Copy)]
pub struct NestedDef {
    pub prefix: &'static str,
    pub column: Column,
}

#[derive(Debug)]
pub struct Catalog {
    pub entity: &'static str,
    /// FROM clause, including joins. Column sources refer to its aliases.
    pub from: &'static str,
    pub primary_key: Column,
    pub fields: &'static [FieldDef],
    pub nested: &'static [NestedDef],
}

impl Catalog {
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        let fields: &'static [FieldDef] = self.fields;
        fields.iter().find(|f| f.name == name)
    }

    /// The nested entry with the longest prefix `field` lives under, with
    /// the path segments below that prefix.
    pub fn nested_for<'f>(
        &self,
        field: &'f FieldSpec,
    ) -> Option<(&'static NestedDef, Vec<&'f str>)> {
        let nested: &'static [NestedDef] = self.nested;
        nested
            .iter()
            .filter_map(|n| field.strip_prefix(n.prefix).map(|rest| (n, rest)))
            .max_by_key(|(n, _)| n.prefix.len())
    }

    pub fn full_fields(&self) -> impl Iterator<Item = &'static FieldDef> {
        let fields: &'static [FieldDef] = self.fields;
        fields.iter().filter(|f| f.full)
    }

    /// Column references needed by `name`.
    ///
    /// Unknown names resolve to nothing. Nested names resolve to the JSON
    /// column the path is read from; invalid nested segments are an error.
    pub fn resolve_columns(&self, name: &str) -> Result<Vec<Column>> {
        let field = FieldSpec::parse(name);
        if let Some(def) = self.field(field.name()) {
            return Ok(def.columns.to_vec());
        }
        match self.nested_for(&field) {
            Some((nested, segments)) => {
                validate_path(field.name(), &segments)?;
                Ok(vec![nested.column])
            }
            None => Ok(vec![]),
        }
    }

    /// Sort expression and tie-break for `name`.
    ///
    /// Every name resolves: unrecognised keys fall back to the primary key so
    /// the order is always deterministic.
    pub fn resolve_sort(&self, name: &str) -> Result<ResolvedSort> {
        let field = FieldSpec::parse(name);
        if let Some(key) = self.field(field.name()).and_then(|f| f.sort) {
            return Ok(ResolvedSort {
                column: SortExpr::Column(key.column),
                tie_break: key.tie_break.unwrap_or(self.primary_key),
            });
        }
        if let Some((nested, segments)) = self.nested_for(&field) {
            validate_path(field.name(), &segments)?;
            return Ok(ResolvedSort {
                column: SortExpr::Path {
                    column: nested.column,
                    path: json_path(&segments),
                },
                tie_break: self.primary_key,
            });
        }
        Ok(ResolvedSort::by(self.primary_key))
    }
}
