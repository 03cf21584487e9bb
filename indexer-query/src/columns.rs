// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Per-query column sets.
//!
//! A [`ColumnSet`] and its [`ResolvedField`]s are built from scratch for every
//! query and dropped once the rows are projected.

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::catalog::{Catalog, Column, ExtractCtx, FieldDef, Kind};
use crate::error::Result;
use crate::field::{json_path, validate_path, FieldSpec};
use crate::statement::StatementBuilder;
use crate::value::{Row, Value};

/// Prefix of aliases generated for nested JSON lookups. Catalog columns are
/// always selected under their own names, so `c0`, `c1`, ... stay unique.
const NESTED_ALIAS_PREFIX: &str = "c";

/// One entry of the select list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Column(Column),
    /// `column -> path`, read back as JSON text under a generated alias.
    Path {
        column: Column,
        path: String,
        alias: String,
    },
}

impl SelectItem {
    pub fn alias(&self) -> &str {
        match self {
            SelectItem::Column(column) => column.alias,
            SelectItem::Path { alias, .. } => alias,
        }
    }

    fn push(&self, b: &mut StatementBuilder) {
        match self {
            SelectItem::Column(column) => {
                b.push(column.expr());
            }
            SelectItem::Path { column, path, .. } => {
                b.push(column.json_expr())
                    .push(" -> ")
                    .push_bind(path.as_str());
            }
        }
        b.push(r#" AS ""#).push(self.alias()).push(r#"""#);
    }
}

/// What a requested name turned out to be for this query.
#[derive(Debug, Clone)]
pub enum Source {
    Field(&'static FieldDef),
    /// Dynamic JSON lookup, `alias` is the column generated for it.
    Nested { alias: String },
    Unknown,
}

#[derive(Debug, Clone)]
pub struct ResolvedField {
    pub spec: FieldSpec,
    pub source: Source,
}

impl ResolvedField {
    pub fn is_known(&self) -> bool {
        !matches!(self.source, Source::Unknown)
    }

    /// The generated column this field reads, for nested lookups.
    pub fn resolved_column(&self) -> Option<&str> {
        match &self.source {
            Source::Nested { alias } => Some(alias),
            _ => None,
        }
    }

    pub fn extract(&self, row: &Row, ctx: &ExtractCtx<'_>) -> Json {
        match &self.source {
            Source::Field(def) => def.extract(row, ctx),
            Source::Nested { alias } => {
                Kind::Json.to_json(row.get(alias).unwrap_or(&Value::Null))
            }
            Source::Unknown => Json::Null,
        }
    }
}

/// Deduplicated select list for one query.
#[derive(Debug, Default)]
pub struct ColumnSet {
    items: IndexMap<(String, Option<String>), SelectItem>,
    generated: usize,
}

impl ColumnSet {
    /// Resolve the requested fields against the catalog.
    ///
    /// Unknown names contribute nothing. Nested segments are validated before
    /// anything is added, an invalid one fails the whole request.
    pub fn resolve(
        catalog: &Catalog,
        specs: Vec<FieldSpec>,
    ) -> Result<(Self, Vec<ResolvedField>)> {
        let mut set = Self::default();
        let mut resolved = Vec::with_capacity(specs.len());

        for spec in specs {
            let source = if let Some(def) = catalog.field(spec.name()) {
                set.add_all(def.columns);
                Source::Field(def)
            } else if let Some((nested, segments)) = catalog.nested_for(&spec)
            {
                validate_path(spec.name(), &segments)?;
                let path = json_path(&segments);
                let alias = set.add_path(nested.column, path);
                Source::Nested { alias }
            } else {
                Source::Unknown
            };
            resolved.push(ResolvedField { spec, source });
        }

        Ok((set, resolved))
    }

    /// Columns of every field in the full-object shape.
    pub fn full(catalog: &Catalog) -> (Self, Vec<&'static FieldDef>) {
        let mut set = Self::default();
        let fields: Vec<_> = catalog.full_fields().collect();
        for def in &fields {
            set.add_all(def.columns);
        }
        (set, fields)
    }

    fn add_all(&mut self, columns: &[Column]) {
        for column in columns {
            self.items
                .entry((column.expr(), None))
                .or_insert(SelectItem::Column(*column));
        }
    }

    fn add_path(&mut self, column: Column, path: String) -> String {
        let key = (column.expr(), Some(path.clone()));
        if let Some(existing) = self.items.get(&key) {
            return existing.alias().to_string();
        }
        let alias = format!("{NESTED_ALIAS_PREFIX}{}", self.generated);
        self.generated += 1;
        self.items.insert(
            key,
            SelectItem::Path {
                column,
                path,
                alias: alias.clone(),
            },
        );
        alias
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> impl Iterator<Item = &SelectItem> {
        self.items.values()
    }

    pub(crate) fn push_select_list(&self, b: &mut StatementBuilder) {
        for (i, item) in self.items().enumerate() {
            if i > 0 {
                b.push(", ");
            }
            item.push(b);
        }
    }
}
