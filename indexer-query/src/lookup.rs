// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Lookup collaborators consulted while projecting rows.
//!
//! Derived fields call these once per row, so every implementation must
//! answer from memory without blocking. The in-memory caches below are
//! expected to be fully warmed by whoever feeds them before queries run.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Display name and address of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Btc,
    Eur,
    Usd,
}

impl FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "btc" => Ok(Symbol::Btc),
            "eur" => Ok(Symbol::Eur),
            "usd" => Ok(Symbol::Usd),
            other => Err(format!("Unknown quote symbol '{other}'")),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Symbol::Btc => "btc",
            Symbol::Eur => "eur",
            Symbol::Usd => "usd",
        };
        write!(f, "{s}")
    }
}

pub trait AliasLookup: Send + Sync {
    fn alias(&self, id: i64) -> Option<Alias>;
}

pub trait TimeLookup: Send + Sync {
    fn timestamp(&self, level: i64) -> Option<DateTime<Utc>>;
}

pub trait QuoteLookup: Send + Sync {
    fn quote(&self, symbol: Symbol, level: i64) -> Option<f64>;
}

/// The collaborators handed to every projection.
#[derive(Clone, Default)]
pub struct Lookups {
    aliases: Option<Arc<dyn AliasLookup>>,
    times: Option<Arc<dyn TimeLookup>>,
    quotes: Option<Arc<dyn QuoteLookup>>,
}

impl Lookups {
    pub fn with_aliases(mut self, aliases: Arc<dyn AliasLookup>) -> Self {
        self.aliases = Some(aliases);
        self
    }

    pub fn with_times(mut self, times: Arc<dyn TimeLookup>) -> Self {
        self.times = Some(times);
        self
    }

    pub fn with_quotes(mut self, quotes: Arc<dyn QuoteLookup>) -> Self {
        self.quotes = Some(quotes);
        self
    }

    pub fn alias(&self, id: i64) -> Option<Alias> {
        self.aliases.as_ref()?.alias(id)
    }

    pub fn timestamp(&self, level: i64) -> Option<DateTime<Utc>> {
        self.times.as_ref()?.timestamp(level)
    }

    pub fn quote(&self, symbol: Symbol, level: i64) -> Option<f64> {
        self.quotes.as_ref()?.quote(symbol, level)
    }
}

impl fmt::Debug for Lookups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookups")
            .field("aliases", &self.aliases.is_some())
            .field("times", &self.times.is_some())
            .field("quotes", &self.quotes.is_some())
            .finish()
    }
}

/// Account aliases keyed by account id.
#[derive(Debug, Default)]
pub struct AliasCache(DashMap<i64, Alias>);

impl AliasCache {
    pub fn insert(&self, id: i64, alias: Alias) {
        self.0.insert(id, alias);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AliasLookup for AliasCache {
    fn alias(&self, id: i64) -> Option<Alias> {
        self.0.get(&id).map(|a| a.value().clone())
    }
}

/// Block timestamps indexed by level.
#[derive(Debug, Default)]
pub struct TimeCache(RwLock<Vec<DateTime<Utc>>>);

impl TimeCache {
    pub fn new(timestamps: Vec<DateTime<Utc>>) -> Self {
        Self(RwLock::new(timestamps))
    }

    /// Append the timestamp of the next level.
    pub fn push(&self, timestamp: DateTime<Utc>) {
        self.0.write().push(timestamp);
    }
}

impl TimeLookup for TimeCache {
    fn timestamp(&self, level: i64) -> Option<DateTime<Utc>> {
        let index = usize::try_from(level).ok()?;
        self.0.read().get(index).copied()
    }
}

/// Prices per level; a level without its own entry uses the latest earlier
/// one.
#[derive(Debug, Default)]
pub struct QuoteCache(RwLock<BTreeMap<i64, HashMap<Symbol, f64>>>);

impl QuoteCache {
    pub fn insert(&self, level: i64, symbol: Symbol, price: f64) {
        self.0.write().entry(level).or_default().insert(symbol, price);
    }
}

impl QuoteLookup for QuoteCache {
    fn quote(&self, symbol: Symbol, level: i64) -> Option<f64> {
        let quotes = self.0.read();
        let (_, prices) = quotes.range(..=level).next_back()?;
        prices.get(&symbol).copied()
    }
}
