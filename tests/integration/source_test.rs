#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::thread;

use anyhow::Result;
use queryable::{
    field, lit, DataType, DataValue, EvaluationConfig, Field, InMemoryTable, NullKeyPolicy, NullOrdering,
    QueryError, QueryResult, QuerySource, Record, RecordSource, Schema,
};
use serde_json::json;

use common::{int_field, northwind};

#[test]
fn test_appends_visible_on_re_evaluation() -> Result<()> {
    let db = northwind()?;
    let speedy = db.shippers().filter(field("CompanyName").call("starts_with", vec![lit("S")]))?;
    assert_eq!(speedy.count()?, 1);

    db.shippers.insert(
        Record::new()
            .with("ShipperId", 4i64)
            .with("CompanyName", "Swift Freight")
            .with("Phone", DataValue::Null),
    )?;
    assert_eq!(int_field(&speedy.to_list()?, "ShipperId"), vec![1, 4]);
    Ok(())
}

#[test]
fn test_rejected_insert_leaves_table_unchanged() -> Result<()> {
    let db = northwind()?;
    let bad = Record::new().with("ShipperId", "four").with("CompanyName", "Broken");
    assert!(matches!(db.shippers.insert(bad), Err(QueryError::SourceError(_))));

    let batch = vec![
        Record::new().with("ShipperId", 4i64).with("CompanyName", "Swift Freight"),
        Record::new().with("ShipperId", 5i64),
    ];
    assert!(db.shippers.insert_all(batch).is_err());
    assert_eq!(db.shippers().count()?, 3);
    Ok(())
}

#[test]
fn test_iteration_is_lazy_and_restartable() -> Result<()> {
    let db = northwind()?;
    let query = db.orders().filter(field("ShipVia").equals(lit(3)))?;

    let mut rows = query.iter()?;
    let first = rows.next().transpose()?;
    assert_eq!(first.map(|r| int_field(&[r], "OrderId")), Some(vec![10308]));
    drop(rows);

    let all: Vec<DataValue> = query.iter()?.collect::<QueryResult<_>>()?;
    assert_eq!(int_field(&all, "OrderId"), vec![10308, 10359, 10495, 11061]);
    Ok(())
}

struct FailingSource;

impl RecordSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    fn schema(&self) -> Option<&Schema> {
        None
    }

    fn materialize(&self) -> QueryResult<Vec<Record>> {
        Err(QueryError::SourceError("connection reset".to_string()))
    }
}

#[test]
fn test_source_failure_surfaces() -> Result<()> {
    let query = QuerySource::new(Arc::new(FailingSource)).filter(field("anything").has_value())?;
    assert_eq!(query.to_list(), Err(QueryError::SourceError("connection reset".to_string())));
    assert_eq!(query.count(), Err(QueryError::SourceError("connection reset".to_string())));
    Ok(())
}

#[test]
fn test_config_from_json() -> Result<()> {
    let config: EvaluationConfig = serde_json::from_value(json!({
        "null_ordering": "NullsLast",
        "null_join_keys": "MatchEachOther"
    }))?;
    assert_eq!(config.null_ordering, NullOrdering::NullsLast);
    assert_eq!(config.null_join_keys, NullKeyPolicy::MatchEachOther);

    let defaults: EvaluationConfig = serde_json::from_value(json!({}))?;
    assert_eq!(defaults, EvaluationConfig::default());
    Ok(())
}

#[test]
fn test_results_serialize_to_json() -> Result<()> {
    let db = northwind()?;
    let first = db.shippers().first()?;
    assert_eq!(
        serde_json::to_value(&first)?,
        json!({ "ShipperId": 1, "CompanyName": "Speedy Express", "Phone": "(503) 555-9831" })
    );

    let schema = Schema::new(
        "notes",
        vec![
            Field::new("Id", DataType::Integer, false),
            Field::new("Body", DataType::Text, true),
        ],
    );
    let notes = InMemoryTable::new(schema);
    notes.insert(Record::new().with("Id", 1i64))?;
    let rows = QuerySource::new(Arc::new(notes)).to_list()?;
    assert_eq!(serde_json::to_value(&rows)?, json!([{ "Id": 1, "Body": null }]));
    Ok(())
}

#[test]
fn test_query_shared_across_threads() -> Result<()> {
    let db = northwind()?;
    let query = db
        .products()
        .filter(field("Discontinued").equals(lit(false)))?
        .order_by_descending(field("UnitPrice"))?
        .take(3);

    let results: Vec<Vec<i64>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| query.to_list().map(|rows| int_field(&rows, "ProductId"))))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or(Err(QueryError::ExecutionError("worker panicked".to_string()))))
            .collect::<QueryResult<Vec<_>>>()
    })?;

    for ids in results {
        assert_eq!(ids, vec![38, 20, 18]);
    }
    Ok(())
}
