// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::statement::Statement;
use crate::value::Row;

/// Executes one statement and returns its rows of named columns.
///
/// Failures are surfaced as [`crate::Error::StorageUnavailable`], no retries
/// are attempted.
#[async_trait]
pub trait Store: Send + Sync {
    async fn fetch(&self, stmt: &Statement) -> Result<Vec<Row>>;
}

#[async_trait]
impl<T: Store + ?Sized> Store for Arc<T> {
    async fn fetch(&self, stmt: &Statement) -> Result<Vec<Row>> {
        (**self).fetch(stmt).await
    }
}

#[async_trait]
impl<'a, T: Store + ?Sized> Store for &'a T {
    async fn fetch(&self, stmt: &Statement) -> Result<Vec<Row>> {
        (**self).fetch(stmt).await
    }
}
