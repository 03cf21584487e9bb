// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

mod common;

use std::collections::HashSet;

use indexer_query::entity::{
    Accounts, BigMapKeys, Contracts, Entity, TicketBalances, Tickets, Tokens,
    Transactions,
};
use indexer_query::{
    Arg, Column, Condition, Error, Filter, Kind, Page, Projection, Query,
    Select, SortCast, SortSpec, Symbol,
};
use serde_json::{json, Value as Json};

use common::{projector, select_list, TestProjector};

const ACCOUNT_ID: Column = Column::new("o", "Id", Kind::Int);
const ACCOUNT_METADATA: Column = Column::new("o", "Metadata", Kind::Json);
const TX_ID: Column = Column::new("o", "Id", Kind::Int);
const TX_SENDER: Column = Column::new("o", "SenderId", Kind::Int);
const TX_TARGET: Column = Column::new("o", "TargetId", Kind::Int);

fn ids(values: &[Json]) -> Vec<i64> {
    values.iter().map(|v| v.as_i64().unwrap()).collect()
}

#[tokio::test]
async fn test_derived_field_in_table() {
    let projector = projector().await;
    let query = Query::new().filter(
        Filter::new().and(Condition::In(ACCOUNT_ID, vec![1i64.into(), 2i64.into()])),
    );

    let table = projector
        .table::<Accounts, _>(&query, &["balance", "deactivationLevel"])
        .await
        .unwrap();

    assert_eq!(table, vec![vec![json!(100), Json::Null], vec![json!(7), json!(80)]]);
    assert_eq!(projector.store().calls(), 1);
}

#[tokio::test]
async fn test_single_derived_column() {
    let projector = projector().await;
    let query = Query::new().filter(
        Filter::new().and(Condition::In(ACCOUNT_ID, vec![1i64.into(), 2i64.into()])),
    );

    let column = projector
        .column::<Accounts>(&query, "numActivations")
        .await
        .unwrap();

    assert_eq!(column, vec![json!(1), json!(0)]);
}

#[tokio::test]
async fn test_unknown_field_among_known_ones() {
    let projector = projector().await;
    let table = projector
        .table::<Accounts, _>(&Query::new(), &["id", "bogusField"])
        .await
        .unwrap();

    assert_eq!(
        table,
        vec![
            vec![json!(1), Json::Null],
            vec![json!(2), Json::Null],
            vec![json!(3), Json::Null],
            vec![json!(4), Json::Null],
        ]
    );

    let statements = projector.store().statements();
    assert_eq!(select_list(&statements[0]), vec![r#"o."Id" AS "Id""#]);
}

#[tokio::test]
async fn test_nested_path_over_join() {
    let projector = projector().await;
    let id = Column::new("o", "Id", Kind::Int);
    let query = Query::new().filter(Filter::new().and(Condition::Eq(id, 1i64.into())));

    let column = projector
        .column::<TicketBalances>(&query, "ticket.metadata.symbol")
        .await
        .unwrap();
    assert_eq!(column, vec![json!("FOO")]);

    let stmt = &projector.store().statements()[0];
    assert_eq!(
        select_list(stmt),
        vec![r#"CASE WHEN json_valid(t."Metadata") THEN t."Metadata" END -> ? AS "c0""#]
    );
    assert_eq!(stmt.args[0], Arg::Text("$.symbol".into()));
}

#[tokio::test]
async fn test_storage_resolved_with_one_batch() {
    let projector = projector().await;
    let query = Query::new()
        .filter(Filter::new().and(Condition::Le(TX_ID, 10i64.into())));

    let column = projector
        .column::<Transactions>(&query, "storage")
        .await
        .unwrap();

    assert_eq!(column.len(), 10);
    assert_eq!(column[0], json!({ "counter": "1" }));
    assert_eq!(column[1], json!({ "counter": "2" }));
    assert_eq!(column[2], json!({ "counter": "3" }));

    let statements = projector.store().statements();
    assert_eq!(statements.len(), 2);
    assert!(statements[1].sql.contains(r#"FROM "Storages" AS s"#));
    assert_eq!(statements[1].args, vec![Arg::Int(1), Arg::Int(2), Arg::Int(3)]);
}

#[tokio::test]
async fn test_objects_issue_one_query_per_batch() {
    let projector = projector().await;
    let objects = projector
        .objects::<Transactions>(&Query::new())
        .await
        .unwrap();

    assert_eq!(objects.len(), 11);
    // primary, storages, diffs
    assert_eq!(projector.store().calls(), 3);

    assert_eq!(
        objects[0].diffs,
        Some(json!([
            {
                "bigmap": 7,
                "action": "add_key",
                "content": { "key": "alice", "value": { "balance": "10" } }
            },
            {
                "bigmap": 7,
                "action": "add_key",
                "content": { "key": "bob", "value": { "balance": "3" } }
            }
        ]))
    );
    assert_eq!(objects[1].diffs, None);
    // no storage at all, and no entry for the referenced id
    assert_eq!(objects[10].storage, None);
}

#[tokio::test]
async fn test_missing_batch_entry_is_null() {
    let projector = projector().await;
    let column = projector
        .column::<Contracts>(&Query::new(), "storage")
        .await
        .unwrap();

    assert_eq!(column, vec![json!({ "counter": "1" }), json!({ "counter": "2" }), Json::Null]);
}

#[tokio::test]
async fn test_order_is_deterministic() {
    let projector = projector().await;

    let asc = Query::new().sort(SortSpec::asc("firstActivity"));
    let first = projector.column::<Accounts>(&asc, "id").await.unwrap();
    let second = projector.column::<Accounts>(&asc, "id").await.unwrap();
    assert_eq!(ids(&first), vec![3, 1, 2, 4]);
    assert_eq!(first, second);

    let desc = Query::new().sort(SortSpec::desc("firstActivity"));
    let column = projector.column::<Accounts>(&desc, "id").await.unwrap();
    assert_eq!(ids(&column), vec![4, 2, 1, 3]);

    let balance = Query::new().sort(SortSpec::asc("balance"));
    let column = projector.column::<Accounts>(&balance, "id").await.unwrap();
    assert_eq!(ids(&column), vec![2, 3, 4, 1]);
}

#[tokio::test]
async fn test_unknown_sort_falls_back_to_primary_key() {
    let projector = projector().await;
    let query = Query::new().sort(SortSpec::desc("bogusField"));

    let column = projector.column::<Accounts>(&query, "id").await.unwrap();
    assert_eq!(ids(&column), vec![4, 3, 2, 1]);
}

#[tokio::test]
async fn test_sort_by_nested_path_with_cast() {
    let projector = projector().await;

    let numeric = Query::new()
        .sort(SortSpec::desc("metadata.decimals").with_cast(SortCast::Integer));
    let column = projector.column::<Tickets>(&numeric, "id").await.unwrap();
    assert_eq!(ids(&column), vec![2, 1, 3]);

    let text = Query::new().sort(SortSpec::desc("metadata.decimals"));
    let column = projector.column::<Tickets>(&text, "id").await.unwrap();
    assert_eq!(ids(&column), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_paging_is_verbatim() {
    let projector = projector().await;
    let query = Query::new().page(Page::new(1, 2));

    let column = projector.column::<Accounts>(&query, "id").await.unwrap();
    assert_eq!(ids(&column), vec![2, 3]);
}

#[tokio::test]
async fn test_filters_pass_through() {
    let projector = projector().await;

    let query = Query::new().filter(Filter::new().and(
        Condition::json_eq(ACCOUNT_METADATA, "symbol", "CCC").unwrap(),
    ));
    let column = projector.column::<Accounts>(&query, "id").await.unwrap();
    assert_eq!(ids(&column), vec![3]);

    let query = Query::new().filter(Filter::new().and(Condition::AnyOf {
        columns: vec![TX_SENDER, TX_TARGET],
        value: 2i64.into(),
    }));
    let column = projector.column::<Transactions>(&query, "id").await.unwrap();
    assert_eq!(ids(&column), vec![2, 5, 9, 11]);

    let query = Query::new()
        .filter(Filter::new().and(Condition::In(ACCOUNT_ID, vec![])));
    let column = projector.column::<Accounts>(&query, "id").await.unwrap();
    assert!(column.is_empty());
}

#[tokio::test]
async fn test_unknown_fields_skip_the_store() {
    let projector = projector().await;
    let query = Query::new();

    assert!(projector
        .column::<Accounts>(&query, "bogusField")
        .await
        .unwrap()
        .is_empty());
    assert!(projector
        .table::<Tokens, _>(&query, &["bogus", "other.field"])
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        projector
            .project::<Tickets>(&query, &Select::parse(Some("a,b")))
            .await
            .unwrap(),
        Projection::Table(vec![])
    );

    assert_eq!(projector.store().calls(), 0);
}

#[tokio::test]
async fn test_invalid_paths_are_rejected_before_sql() {
    let projector = projector().await;
    let query = Query::new();

    let err = projector
        .column::<Accounts>(&query, "metadata.$where")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidFieldPath(ref p) if p == "metadata.$where"));

    let err = projector
        .table::<TicketBalances, _>(&query, &["id", "ticket.metadata.a b"])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidFieldPath(_)));

    let sorted = Query::new().sort(SortSpec::asc("metadata.a;b"));
    let err = projector
        .column::<Accounts>(&sorted, "id")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidFieldPath(_)));

    assert_eq!(projector.store().calls(), 0);
}

#[tokio::test]
async fn test_on_demand_field() {
    let projector = projector().await;
    let column = projector
        .column::<BigMapKeys>(&Query::new(), "rawKey")
        .await
        .unwrap();
    assert_eq!(column, vec![json!("0100a1"), Json::Null]);

    projector.store().clear();
    projector.objects::<BigMapKeys>(&Query::new()).await.unwrap();
    let statements = projector.store().statements();
    assert!(!statements[0].sql.contains("RawKey"));
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let projector = projector().await;
    let query = Query::new().sort(SortSpec::desc("balance"));
    let selects = [
        Select::parse(Some("metadata.symbol")),
        Select::parse(Some("metadata.decimals,metadata.symbol")),
        Select::parse(Some("id,balance")),
        Select::parse(Some("metadata.tags.0")),
    ];

    let mut sequential = vec![];
    for select in &selects {
        sequential.push(projector.project::<Accounts>(&query, select).await.unwrap());
    }

    let concurrent = futures::future::join_all(
        selects
            .iter()
            .map(|select| projector.project::<Accounts>(&query, select)),
    )
    .await;

    for (expected, got) in sequential.into_iter().zip(concurrent) {
        assert_eq!(got.unwrap(), expected);
    }
}

#[tokio::test]
async fn test_nested_array_index() {
    let projector = projector().await;
    let column = projector
        .column::<Accounts>(&Query::new(), "metadata.tags.1")
        .await
        .unwrap();

    assert_eq!(column, vec![Json::Null, Json::Null, json!("y"), Json::Null]);
}

#[tokio::test]
async fn test_malformed_json_reads_as_null() {
    let projector = projector().await;

    let whole = projector
        .column::<Accounts>(&Query::new(), "metadata")
        .await
        .unwrap();
    assert_eq!(whole[3], Json::Null);

    let nested = projector
        .column::<Accounts>(&Query::new(), "metadata.symbol")
        .await
        .unwrap();
    assert_eq!(nested, vec![json!("AAA"), Json::Null, json!("CCC"), Json::Null]);

    let sorted = Query::new().sort(SortSpec::desc("metadata.symbol"));
    let column = projector.column::<Accounts>(&sorted, "id").await.unwrap();
    assert_eq!(ids(&column), vec![3, 1, 4, 2]);

    let query = Query::new().filter(Filter::new().and(
        Condition::json_eq(ACCOUNT_METADATA, "symbol", "AAA").unwrap(),
    ));
    let column = projector.column::<Accounts>(&query, "id").await.unwrap();
    assert_eq!(ids(&column), vec![1]);
}

#[tokio::test]
async fn test_numeric_segments_are_array_indexes() {
    let projector = projector().await;
    let id = Column::new("o", "Id", Kind::Int);
    let query = Query::new().filter(Filter::new().and(Condition::Eq(id, 2i64.into())));

    let whole = projector.column::<Tokens>(&query, "metadata").await.unwrap();
    assert_eq!(whole, vec![json!({ "0": "zero" })]);

    // `0` is read as `$[0]`, an object key of digits is out of reach
    let nested = projector.column::<Tokens>(&query, "metadata.0").await.unwrap();
    assert_eq!(nested, vec![Json::Null]);
    assert_eq!(projector.store().statements()[1].args[0], Arg::Text("$[0]".into()));
}

async fn columns_for(projector: &TestProjector, fields: &[&str]) -> HashSet<String> {
    projector.store().clear();
    projector
        .table::<Accounts, _>(&Query::new(), fields)
        .await
        .unwrap();
    projector
        .store()
        .statements()
        .first()
        .map(|stmt| select_list(stmt).into_iter().collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_column_set_is_minimal() {
    let projector = projector().await;
    let pairs = [
        ("balance", "deactivationLevel"),
        ("deactivationLevel", "deactivationTime"),
        ("alias", "id"),
        ("firstActivity", "firstActivityTime"),
        ("balance", "metadata.symbol"),
        ("id", "bogusField"),
    ];

    for (f1, f2) in pairs {
        let both = columns_for(&projector, &[f1, f2]).await;
        let one = columns_for(&projector, &[f1]).await;
        let two = columns_for(&projector, &[f2]).await;

        let union: HashSet<_> = one.union(&two).cloned().collect();
        assert_eq!(both, union, "{f1}, {f2}");
    }

    let shared = columns_for(&projector, &["deactivationLevel", "deactivationTime"]).await;
    assert_eq!(shared.len(), 2);
}

async fn assert_shapes_agree<E: Entity>(projector: &TestProjector, query: &Query) {
    let entity = E::catalog().entity;
    let objects = projector.objects::<E>(query).await.unwrap();
    let objects = serde_json::to_value(objects).unwrap();
    let objects = objects.as_array().unwrap();
    assert!(!objects.is_empty(), "{entity}");

    for field in E::catalog().full_fields() {
        let column = projector.column::<E>(query, field.name).await.unwrap();
        let table = projector
            .table::<E, _>(query, &[field.name, "id"])
            .await
            .unwrap();
        assert_eq!(column.len(), objects.len(), "{entity}.{}", field.name);

        for (i, object) in objects.iter().enumerate() {
            let in_object = field.name.split('.').fold(object, |v, k| &v[k]);
            assert_eq!(&column[i], in_object, "{entity}.{} row {i}", field.name);
            assert_eq!(column[i], table[i][0], "{entity}.{} row {i}", field.name);
        }
    }
}

#[tokio::test]
async fn test_projection_shapes_agree() {
    let projector = projector().await;
    let query = Query::new().quote(Symbol::Usd);

    assert_shapes_agree::<Accounts>(&projector, &query).await;
    assert_shapes_agree::<Contracts>(&projector, &query).await;
    assert_shapes_agree::<Tickets>(&projector, &query).await;
    assert_shapes_agree::<TicketBalances>(&projector, &query).await;
    assert_shapes_agree::<Tokens>(&projector, &query).await;
    assert_shapes_agree::<BigMapKeys>(&projector, &query).await;
    assert_shapes_agree::<Transactions>(&projector, &query).await;
}

#[tokio::test]
async fn test_lookups_enrich_rows() {
    let projector = projector().await;
    let accounts = projector.objects::<Accounts>(&Query::new()).await.unwrap();

    assert_eq!(accounts[0].alias.as_deref(), Some("Foundation"));
    assert_eq!(accounts[1].alias, None);
    assert_eq!(accounts[1].delegate.as_ref().map(|d| d.address.as_str()), Some("tz1one"));
    assert_eq!(accounts[0].first_activity_time.as_deref(), Some("2024-01-01T00:01:30Z"));
    assert_eq!(accounts[0].deactivation_time, None);
    assert_eq!(accounts[1].deactivation_time.as_deref(), Some("2024-01-01T00:40:00Z"));

    let query = Query::new().quote(Symbol::Usd);
    let quotes = projector
        .column::<Transactions>(&query, "quote")
        .await
        .unwrap();
    assert_eq!(quotes[0], json!(1.0));
    assert_eq!(quotes[9], json!(2.5));

    let none = projector
        .column::<Transactions>(&Query::new(), "quote")
        .await
        .unwrap();
    assert!(none.iter().all(Json::is_null));
}

#[tokio::test]
async fn test_store_failure_stops_follow_ups() {
    let projector = projector().await;
    projector.store().inner().pool().close().await;

    let err = projector
        .objects::<Transactions>(&Query::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::StorageUnavailable(_)));
    assert_eq!(err.http_code(), 503);
    assert_eq!(projector.store().calls(), 1);
}
