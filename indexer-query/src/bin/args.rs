// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::Parser;
use indexer_query::Symbol;

#[derive(Parser, Debug)]
#[command(
    author = "Dusk Network B.V. All Rights Reserved.",
    version,
    about = "Project archive entities into JSON"
)]
pub struct Args {
    /// Sets the configuration file path
    #[clap(long, short, env = "INDEXER_QUERY_CONFIG_TOML", value_parser)]
    pub config: Option<PathBuf>,

    /// Output log level
    #[clap(long)]
    pub log_level: Option<tracing::Level>,

    // Change the log format accordingly
    #[clap(long, value_parser = PossibleValuesParser::new(["coloured", "plain", "json"]))]
    pub log_type: Option<String>,

    /// Add log filter(s)
    #[clap(long)]
    pub log_filter: Option<String>,

    #[clap(long, value_parser)]
    /// path to the archive database
    pub db_path: Option<PathBuf>,

    /// Entity to query
    #[clap(value_parser = PossibleValuesParser::new([
        "accounts",
        "contracts",
        "tickets",
        "ticket_balances",
        "tokens",
        "big_map_keys",
        "transactions",
    ]))]
    pub entity: String,

    /// Comma-separated fields to return, full objects when omitted
    #[clap(long)]
    pub select: Option<String>,

    /// Field to sort by, prefixed with `-` for descending order
    #[clap(long, allow_hyphen_values = true)]
    pub sort: Option<String>,

    #[clap(long, default_value_t = 0)]
    pub offset: u64,

    #[clap(long, default_value_t = 100)]
    pub limit: u64,

    /// Report quotes in the given symbol (btc, eur, usd)
    #[clap(long)]
    pub quote: Option<Symbol>,
}
