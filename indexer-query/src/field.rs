// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Requested field names.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Grammar every segment of a nested path must match before it can reach a
/// generated expression.
const PATH_SEGMENT_REGEX: &str = r"^[A-Za-z0-9_]+$";

static PATH_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(PATH_SEGMENT_REGEX).expect("path segment regex is valid")
});

/// One requestable output field, as named by the caller.
///
/// `name` is the full dot-separated path (`ticket.metadata.symbol`), `base`
/// its first segment and `remainder` everything after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    base_len: usize,
}

impl FieldSpec {
    pub fn parse<T: Into<String>>(name: T) -> Self {
        let name = name.into();
        let base_len = name.find('.').unwrap_or(name.len());
        Self { name, base_len }
    }

    /// Split a `select` list (`a,b,c`) keeping caller order.
    pub fn parse_list(select: &str) -> Vec<Self> {
        select
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::parse)
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> &str {
        &self.name[..self.base_len]
    }

    pub fn remainder(&self) -> Option<&str> {
        self.name
            .get(self.base_len + 1..)
            .filter(|rest| !rest.is_empty())
    }

    /// Segments of the path below `prefix`, if the name lives under it.
    ///
    /// `Some(vec![])` means the name is the prefix itself.
    pub fn strip_prefix(&self, prefix: &str) -> Option<Vec<&str>> {
        if self.name == prefix {
            return Some(vec![]);
        }
        let rest = self.name.strip_prefix(prefix)?.strip_prefix('.')?;
        Some(rest.split('.').collect())
    }
}

/// Check every segment against the identifier grammar.
pub fn validate_path(full_name: &str, segments: &[&str]) -> Result<()> {
    match segments.iter().all(|s| PATH_SEGMENT.is_match(s)) {
        true => Ok(()),
        false => Err(Error::invalid_path(full_name)),
    }
}

/// Build the JSON path bound for a nested lookup.
///
/// Numeric segments always address array elements: `["a", "0", "b"]` becomes
/// `$.a[0].b`. Object keys made only of digits are therefore not reachable
/// through a nested path. Segments must already be validated.
pub fn json_path(segments: &[&str]) -> String {
    let mut path = String::from("$");
    for segment in segments {
        if segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push('[');
            path.push_str(segment);
            path.push(']');
        } else {
            path.push('.');
            path.push_str(segment);
        }
    }
    path
}
