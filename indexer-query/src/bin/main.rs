// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

mod args;
mod config;
mod log;

use clap::Parser;
use indexer_query::entity::{
    Accounts, BigMapKeys, Contracts, Entity, TicketBalances, Tickets, Tokens,
    Transactions,
};
use indexer_query::{
    Page, Projector, Query, Select, SortSpec, SqliteStore, Store,
};
use tracing::info;

use crate::args::Args;
use crate::config::Config;
use crate::log::Log;

async fn print<E: Entity, S: Store>(
    projector: &Projector<S>,
    query: &Query,
    select: &Select,
) -> anyhow::Result<()> {
    let projection = projector.project::<E>(query, select).await?;
    info!(entity = E::catalog().entity, rows = projection.len());
    println!("{}", serde_json::to_string_pretty(&projection)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::try_from(&args)?;

    Log::new(config.log_level()?, config.log_filter(), config.log_type())
        .register()?;

    let store = SqliteStore::open(config.db_path(), &config.archive).await?;
    let projector = Projector::new(store).with_params(config.archive);

    let mut query = Query::new().page(Page::new(args.offset, args.limit));
    if let Some(sort) = &args.sort {
        query = query.sort(sort.parse::<SortSpec>()?);
    }
    if let Some(symbol) = args.quote {
        query = query.quote(symbol);
    }
    let select = Select::parse(args.select.as_deref());

    match args.entity.as_str() {
        "accounts" => print::<Accounts, _>(&projector, &query, &select).await,
        "contracts" => print::<Contracts, _>(&projector, &query, &select).await,
        "tickets" => print::<Tickets, _>(&projector, &query, &select).await,
        "ticket_balances" => {
            print::<TicketBalances, _>(&projector, &query, &select).await
        }
        "tokens" => print::<Tokens, _>(&projector, &query, &select).await,
        "big_map_keys" => {
            print::<BigMapKeys, _>(&projector, &query, &select).await
        }
        "transactions" => {
            print::<Transactions, _>(&projector, &query, &select).await
        }
        other => anyhow::bail!("Unknown entity '{other}'"),
    }
}
