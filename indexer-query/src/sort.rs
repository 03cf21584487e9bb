// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::Column;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Cast applied to the sort column, for JSON values stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortCast {
    Integer,
    Real,
    Text,
}

impl SortCast {
    pub fn sql(self) -> &'static str {
        match self {
            SortCast::Integer => "INTEGER",
            SortCast::Real => "REAL",
            SortCast::Text => "TEXT",
        }
    }
}

/// Caller's sort request, resolved through the catalog at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: Direction,
    pub cast: Option<SortCast>,
}

impl SortSpec {
    pub fn asc<T: Into<String>>(field: T) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
            cast: None,
        }
    }

    pub fn desc<T: Into<String>>(field: T) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
            cast: None,
        }
    }

    pub fn with_cast(mut self, cast: SortCast) -> Self {
        self.cast = Some(cast);
        self
    }
}

impl FromStr for SortSpec {
    type Err = std::convert::Infallible;

    /// `balance` sorts ascending, `-balance` descending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.strip_prefix('-') {
            Some(field) => Self::desc(field),
            None => Self::asc(s),
        })
    }
}

/// Sort expression as it ends up in ORDER BY.
#[derive(Debug, Clone, PartialEq)]
pub enum SortExpr {
    Column(Column),
    /// JSON sub-path of a column, the path is bound as a parameter.
    Path { column: Column, path: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSort {
    pub column: SortExpr,
    pub tie_break: Column,
}

impl ResolvedSort {
    pub fn by(column: Column) -> Self {
        Self {
            column: SortExpr::Column(column),
            tie_break: column,
        }
    }

    /// Whether ordering by the sort column alone is already total.
    pub fn is_unique(&self) -> bool {
        matches!(&self.column, SortExpr::Column(c) if *c == self.tie_break)
    }
}

/// Fully resolved ORDER BY clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub key: ResolvedSort,
    pub direction: Direction,
    pub cast: Option<SortCast>,
}

/// Offset/limit window, applied verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
        }
    }
}
