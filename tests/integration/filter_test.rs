#[path = "../common/mod.rs"]
mod common;

use anyhow::Result;
use chrono::NaiveDate;
use queryable::{call, captured, field, lit, null, DataValue, QueryError};

use common::{int_field, northwind, text_field};

#[test]
fn test_not_equals_literal_excludes_absent_values() -> Result<()> {
    let db = northwind()?;
    let result = db.employees().filter(field("ReportsTo").not_equals(lit(2)))?.to_list()?;
    assert_eq!(int_field(&result, "EmployeeId"), vec![6, 7, 9]);
    Ok(())
}

#[test]
fn test_negated_equality_retains_same_set() -> Result<()> {
    let db = northwind()?;
    let negated = db.employees().filter(!field("ReportsTo").equals(lit(2)))?.to_list()?;
    let not_equal = db.employees().filter(field("ReportsTo").not_equals(lit(2)))?.to_list()?;
    assert_eq!(negated, not_equal);
    Ok(())
}

#[test]
fn test_null_literal_comparisons() -> Result<()> {
    let db = northwind()?;
    let absent = db.employees().filter(field("ReportsTo").equals(null()))?.to_list()?;
    assert_eq!(int_field(&absent, "EmployeeId"), vec![2]);

    let present = db.employees().filter(field("ReportsTo").not_equals(null()))?.to_list()?;
    assert_eq!(int_field(&present, "EmployeeId"), vec![1, 3, 4, 5, 6, 7, 8, 9]);

    // Literal on the left behaves the same
    let absent = db.employees().filter(null().equals(field("ReportsTo")))?.to_list()?;
    assert_eq!(int_field(&absent, "EmployeeId"), vec![2]);
    Ok(())
}

#[test]
fn test_presence_predicates() -> Result<()> {
    let db = northwind()?;
    let with_region = db.customers().filter(field("Region").has_value())?.count()?;
    let without_region = db.customers().filter(field("Region").is_absent())?.count()?;
    assert_eq!(with_region, 8);
    assert_eq!(without_region, 9);
    Ok(())
}

#[test]
fn test_captured_values() -> Result<()> {
    let db = northwind()?;
    let manager = 5;
    let result = db
        .employees()
        .filter(field("ReportsTo").equals(captured("manager", manager)))?
        .to_list()?;
    assert_eq!(int_field(&result, "EmployeeId"), vec![6, 7, 9]);

    // A captured absent value is a presence test, like the null literal
    let missing: Option<i64> = None;
    let result = db
        .employees()
        .filter(field("ReportsTo").equals(captured("missing", missing)))?
        .to_list()?;
    assert_eq!(int_field(&result, "EmployeeId"), vec![2]);
    Ok(())
}

#[test]
fn test_chained_filters_equal_conjunction() -> Result<()> {
    let db = northwind()?;
    let p = field("UnitPrice").gt(lit(20));
    let q = field("Discontinued").equals(lit(false));

    let chained = db.products().filter(p.clone())?.filter(q.clone())?.to_list()?;
    let combined = db.products().filter(p.and(q))?.to_list()?;

    assert_eq!(chained, combined);
    assert_eq!(int_field(&chained, "ProductId"), vec![14, 18, 20, 38, 43, 51, 59, 62]);
    Ok(())
}

#[test]
fn test_string_predicates() -> Result<()> {
    let db = northwind()?;

    let sales = db
        .customers()
        .filter(field("ContactTitle").call("starts_with", vec![lit("Sales")]))?
        .to_list()?;
    assert_eq!(
        text_field(&sales, "CustomerId"),
        vec!["ALFKI", "AROUT", "HUNGC", "LONEP", "SEVES", "TRAIH"]
    );

    let assistants = db
        .customers()
        .filter(call("ends_with", vec![field("ContactTitle"), lit("Assistant")]))?
        .to_list()?;
    assert_eq!(text_field(&assistants, "CustomerId"), vec!["LAUGB"]);

    let markets = db
        .customers()
        .filter(call("contains", vec![field("CompanyName"), lit("Market")]))?
        .to_list()?;
    assert_eq!(text_field(&markets, "CustomerId"), vec!["BOTTM", "GREAL", "WHITC"]);

    // Ordinal comparison: case matters
    let lower = db
        .customers()
        .filter(call("contains", vec![field("CompanyName"), lit("market")]))?
        .count()?;
    assert_eq!(lower, 0);
    Ok(())
}

#[test]
fn test_text_inequality_excludes_absent_region() -> Result<()> {
    let db = northwind()?;
    let oregon = db.customers().filter(field("Region").equals(lit("OR")))?.to_list()?;
    assert_eq!(text_field(&oregon, "CustomerId"), vec!["GREAL", "HUNGC", "LONEP", "THEBI"]);

    let elsewhere = db.customers().filter(field("Region").not_equals(lit("OR")))?.to_list()?;
    assert_eq!(text_field(&elsewhere, "CustomerId"), vec!["BOTTM", "LAUGB", "TRAIH", "WHITC"]);
    Ok(())
}

#[test]
fn test_collection_membership() -> Result<()> {
    let db = northwind()?;
    let countries = vec!["UK", "Canada"];
    let result = db
        .customers()
        .filter(call("contains", vec![lit(countries), field("Country")]))?
        .to_list()?;
    assert_eq!(text_field(&result, "CustomerId"), vec!["AROUT", "BOTTM", "LAUGB", "SEVES"]);

    // An absent member never matches, even against a list holding an absent value
    let regions = vec![DataValue::Null, DataValue::from("BC")];
    let result = db
        .customers()
        .filter(call("contains", vec![lit(regions), field("Region")]))?
        .to_list()?;
    assert_eq!(text_field(&result, "CustomerId"), vec!["BOTTM", "LAUGB"]);
    Ok(())
}

#[test]
fn test_arithmetic_in_predicate() -> Result<()> {
    let db = northwind()?;
    let result = db
        .products()
        .filter(field("ReorderLevel").equals(lit(5) * lit(2)))?
        .to_list()?;
    assert_eq!(int_field(&result, "ProductId"), vec![1, 51]);
    Ok(())
}

#[test]
fn test_date_comparisons() -> Result<()> {
    let db = northwind()?;
    let cutoff = NaiveDate::from_ymd_opt(1996, 10, 1).unwrap();
    let early = db.orders().filter(field("ShippedDate").lt(lit(cutoff)))?.to_list()?;
    assert_eq!(int_field(&early, "OrderId"), vec![10269, 10307, 10308, 10310]);

    let unshipped = db.orders().filter(field("ShippedDate").equals(null()))?.to_list()?;
    assert_eq!(int_field(&unshipped, "OrderId"), vec![11045, 11061]);
    Ok(())
}

#[test]
fn test_boolean_field_as_predicate() -> Result<()> {
    let db = northwind()?;
    let discontinued = db.products().filter(field("Discontinued"))?.to_list()?;
    assert_eq!(int_field(&discontinued, "ProductId"), vec![5, 9, 28, 29]);

    let active = db.products().filter(!field("Discontinued"))?.count()?;
    assert_eq!(active, 10);
    Ok(())
}

#[test]
fn test_three_valued_connectives() -> Result<()> {
    let db = northwind()?;
    let unknown_for_fuller = field("ReportsTo").gt(lit(1));

    // false AND unknown is false, so its negation retains every employee
    let kept = db
        .employees()
        .filter(!(lit(false).and(unknown_for_fuller.clone())))?
        .count()?;
    assert_eq!(kept, 9);

    // false OR unknown is unknown, which drops employee 2
    let kept = db.employees().filter(lit(false).or(unknown_for_fuller.clone()))?.to_list()?;
    assert_eq!(int_field(&kept, "EmployeeId"), vec![1, 3, 4, 5, 6, 7, 8, 9]);

    let kept = db.employees().filter(lit(true).or(unknown_for_fuller))?.count()?;
    assert_eq!(kept, 9);
    Ok(())
}

#[test]
fn test_non_boolean_predicate_fails_at_evaluation() -> Result<()> {
    let db = northwind()?;
    let query = db.products().filter(field("UnitPrice"))?;
    assert!(matches!(query.to_list(), Err(QueryError::TypeError(_))));
    Ok(())
}

#[test]
fn test_unsupported_function_fails_at_construction() -> Result<()> {
    let db = northwind()?;
    let result = db.customers().filter(call("soundex", vec![field("CompanyName")]));
    assert!(matches!(result, Err(QueryError::InvalidArgument(_))));

    let result = db.customers().filter(call("starts_with", vec![field("CompanyName")]));
    assert!(matches!(result, Err(QueryError::InvalidArgument(_))));
    Ok(())
}
