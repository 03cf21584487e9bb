// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use indexer_query::conf::Params;
use serde::{Deserialize, Serialize};

use crate::args::Args;

#[derive(Serialize, Deserialize, Clone, Default)]
pub(crate) struct Config {
    log_level: Option<String>,
    log_type: Option<String>,
    log_filter: Option<String>,
    db_path: Option<PathBuf>,

    #[serde(default)]
    pub(crate) archive: Params,
}

/// Default log_level.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log_type.
const DEFAULT_LOG_TYPE: &str = "coloured";

/// Default archive database file.
const DEFAULT_DB_PATH: &str = "archive.sqlite3";

impl TryFrom<&Args> for Config {
    type Error = anyhow::Error;

    fn try_from(args: &Args) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => {
                let toml = std::fs::read_to_string(path).with_context(|| {
                    format!("Failed to read config file {path:?}")
                })?;
                toml::from_str(&toml)
                    .with_context(|| format!("Invalid config file {path:?}"))?
            }
            None => Config::default(),
        };

        // Overwrite config log-level
        if let Some(log_level) = args.log_level {
            config.log_level = Some(log_level.to_string());
        }

        // Overwrite config log-type
        if let Some(log_type) = &args.log_type {
            config.log_type = Some(log_type.into());
        }

        // Overwrite config log-filter
        if let Some(log_filter) = &args.log_filter {
            config.log_filter = Some(log_filter.into());
        }

        if let Some(db_path) = &args.db_path {
            config.db_path = Some(db_path.clone());
        }

        Ok(config)
    }
}

impl Config {
    pub(crate) fn log_type(&self) -> String {
        match &self.log_type {
            None => DEFAULT_LOG_TYPE.into(),
            Some(log_type) => log_type.into(),
        }
    }

    pub(crate) fn log_level(&self) -> anyhow::Result<tracing::Level> {
        let log_level = match &self.log_level {
            None => DEFAULT_LOG_LEVEL,
            Some(log_level) => log_level,
        };
        tracing::Level::from_str(log_level).map_err(|e| {
            anyhow!("Invalid log-level specified '{log_level}' - {e}")
        })
    }

    pub(crate) fn log_filter(&self) -> String {
        self.log_filter.clone().unwrap_or_default()
    }

    pub(crate) fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::*;

    #[test]
    fn test_args_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"
            log_level = "warn"
            db_path = "/var/archive.sqlite3"

            [archive]
            query_timeout = "2s"
            "#,
        )
        .unwrap();

        let args = Args::parse_from([
            "indexer-query",
            "--config",
            file.path().to_str().unwrap(),
            "--log-level",
            "debug",
            "accounts",
        ]);
        let config = Config::try_from(&args).unwrap();

        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);
        assert_eq!(config.log_type(), DEFAULT_LOG_TYPE);
        assert_eq!(config.db_path(), PathBuf::from("/var/archive.sqlite3"));
        assert_eq!(config.archive.query_timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_defaults_without_file() {
        let args = Args::parse_from(["indexer-query", "tokens", "--sort", "-firstLevel"]);
        let config = Config::try_from(&args).unwrap();

        assert_eq!(config.db_path(), PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
        assert_eq!(args.sort.as_deref(), Some("-firstLevel"));
        assert_eq!(config.archive, Params::default());
    }
}
