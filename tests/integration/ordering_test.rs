#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use anyhow::Result;
use queryable::{
    field, DataType, EvaluationConfig, Field, InMemoryTable, NullOrdering, QueryError, QuerySource, Record, Schema,
};
use rand::seq::SliceRandom;
use rand::Rng;

use common::{int_field, ints, northwind, text_field};

#[test]
fn test_order_by_descending_price() -> Result<()> {
    let db = northwind()?;
    let ids = db
        .products()
        .order_by_descending(field("UnitPrice"))?
        .project(field("ProductId"))?
        .to_list()?;
    assert_eq!(ints(&ids), vec![38, 29, 9, 20, 18, 59, 51, 62, 43, 28, 14, 5, 1, 3]);
    Ok(())
}

#[test]
fn test_windowing() -> Result<()> {
    let db = northwind()?;
    let top_ten = db.products().order_by_descending(field("UnitPrice"))?.take(10);
    assert_eq!(
        int_field(&top_ten.to_list()?, "ProductId"),
        vec![38, 29, 9, 20, 18, 59, 51, 62, 43, 28]
    );

    let page = top_ten.skip(5).take(5).to_list()?;
    assert_eq!(int_field(&page, "ProductId"), vec![59, 51, 62, 43, 28]);
    Ok(())
}

#[test]
fn test_take_composes_positionally() -> Result<()> {
    let db = northwind()?;
    let sorted = db.products().order_by_descending(field("UnitPrice"))?;
    let nested = sorted.skip(5).take(10).take(5).to_list()?;
    let direct = sorted.skip(5).take(5).to_list()?;
    assert_eq!(nested, direct);
    assert_eq!(int_field(&direct, "ProductId"), vec![59, 51, 62, 43, 28]);
    Ok(())
}

#[test]
fn test_skip_after_ordering_by_date() -> Result<()> {
    let db = northwind()?;
    let result = db.employees().order_by(field("BirthDate"))?.skip(5).to_list()?;
    assert_eq!(int_field(&result, "EmployeeId"), vec![7, 6, 3, 9]);
    Ok(())
}

#[test]
fn test_then_by_descending() -> Result<()> {
    let db = northwind()?;
    let result = db
        .employees()
        .order_by(field("Country"))?
        .then_by_descending(field("BirthDate"))?
        .to_list()?;
    assert_eq!(int_field(&result, "EmployeeId"), vec![9, 6, 7, 5, 3, 8, 2, 1, 4]);
    Ok(())
}

#[test]
fn test_order_by_replaces_previous_ordering() -> Result<()> {
    let db = northwind()?;
    let result = db
        .employees()
        .order_by(field("Country"))?
        .order_by(field("LastName"))?
        .to_list()?;
    assert_eq!(int_field(&result, "EmployeeId"), vec![5, 8, 1, 9, 2, 7, 3, 4, 6]);
    Ok(())
}

#[test]
fn test_absent_values_sort_first_by_default() -> Result<()> {
    let db = northwind()?;
    let result = db
        .customers()
        .order_by(field("Region"))?
        .then_by(field("CustomerId"))?
        .to_list()?;
    assert_eq!(
        text_field(&result, "CustomerId"),
        vec![
            "ALFKI", "ANATR", "ANTON", "AROUT", "BOLID", "BONAP", "CHOPS", "PARIS", "SEVES", "BOTTM", "LAUGB",
            "GREAL", "HUNGC", "LONEP", "THEBI", "TRAIH", "WHITC",
        ]
    );
    Ok(())
}

#[test]
fn test_configured_nulls_last() -> Result<()> {
    let db = northwind()?;
    let config = EvaluationConfig {
        null_ordering: NullOrdering::NullsLast,
        ..EvaluationConfig::default()
    };
    let result = QuerySource::with_config(db.customers.clone(), config)
        .order_by(field("Region"))?
        .then_by(field("CustomerId"))?
        .take(3)
        .to_list()?;
    assert_eq!(text_field(&result, "CustomerId"), vec!["BOTTM", "LAUGB", "GREAL"]);
    Ok(())
}

#[test]
fn test_then_by_without_ordering_is_rejected() -> Result<()> {
    let db = northwind()?;
    assert!(matches!(
        db.employees().then_by(field("LastName")),
        Err(QueryError::InvalidArgument(_))
    ));
    let filtered = db.employees().order_by(field("Country"))?.filter(field("ReportsTo").has_value())?;
    assert!(matches!(
        filtered.then_by(field("LastName")),
        Err(QueryError::InvalidArgument(_))
    ));
    Ok(())
}

#[test]
fn test_sort_is_stable() -> Result<()> {
    let table = InMemoryTable::new(Schema::new(
        "events",
        vec![
            Field::new("Sequence", DataType::Integer, false),
            Field::new("Bucket", DataType::Integer, false),
        ],
    ));
    let mut rng = rand::thread_rng();
    let mut buckets: Vec<i64> = (0..300).map(|_| rng.gen_range(0..7i64)).collect();
    buckets.shuffle(&mut rng);
    for (sequence, bucket) in buckets.iter().enumerate() {
        table.insert(Record::new().with("Sequence", sequence as i64).with("Bucket", *bucket))?;
    }

    let sorted = QuerySource::new(Arc::new(table)).order_by(field("Bucket"))?.to_list()?;
    let pairs: Vec<(i64, i64)> = int_field(&sorted, "Bucket")
        .into_iter()
        .zip(int_field(&sorted, "Sequence"))
        .collect();
    for window in pairs.windows(2) {
        let ((b1, s1), (b2, s2)) = (window[0], window[1]);
        assert!(b1 < b2 || (b1 == b2 && s1 < s2), "unstable order at {:?}", window);
    }
    Ok(())
}
