// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A nested field path has a segment outside `[A-Za-z0-9_]`
    #[error("Invalid field path '{0}'")]
    InvalidFieldPath(String),
    /// The store could not execute a statement
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),
    /// The statement did not complete within the configured deadline
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),
    /// A projected row could not be turned into its typed object
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    pub fn http_code(&self) -> u16 {
        match self {
            Error::InvalidFieldPath(_) => 400,
            Error::StorageUnavailable(_) => 503,
            Error::Timeout(_) => 504,
            Error::Decode(_) => 500,
        }
    }

    pub fn invalid_path<T: AsRef<str>>(path: T) -> Self {
        Error::InvalidFieldPath(path.as_ref().to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
