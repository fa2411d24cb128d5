#[path = "../common/mod.rs"]
mod common;

use anyhow::Result;
use queryable::{call, construct, current, field, lit, DataType, DataValue, QueryError, Record};
use rust_decimal::Decimal;

use common::{ints, northwind, texts};

#[test]
fn test_project_single_field() -> Result<()> {
    let db = northwind()?;
    let names = db.shippers().project(field("CompanyName"))?.to_list()?;
    assert_eq!(texts(&names), vec!["Speedy Express", "United Package", "Federal Shipping"]);
    Ok(())
}

#[test]
fn test_computed_decimal_value() -> Result<()> {
    let db = northwind()?;
    let value = db
        .products()
        .filter(field("ProductId").equals(lit(14)))?
        .project(field("UnitPrice") * field("UnitsInStock"))?
        .single()?;
    assert_eq!(value, DataValue::Decimal(Decimal::new(81375, 2)));
    Ok(())
}

#[test]
fn test_nested_composite() -> Result<()> {
    let db = northwind()?;
    let element = db
        .employees()
        .project(construct(vec![
            ("Id", field("EmployeeId")),
            ("Name", call("concat", vec![field("FirstName"), lit(" "), field("LastName")])),
            (
                "Location",
                construct(vec![("City", field("City")), ("Region", field("Region"))]),
            ),
        ]))?
        .single_where(field("Id").equals(lit(5)))?;

    let expected = Record::new()
        .with("Id", 5i64)
        .with("Name", "Steven Buchanan")
        .with(
            "Location",
            Record::new().with("City", "London").with("Region", DataValue::Null),
        );
    assert_eq!(element, DataValue::Record(expected));
    Ok(())
}

#[test]
fn test_nested_path_after_projection() -> Result<()> {
    let db = northwind()?;
    let london = db
        .employees()
        .project(construct(vec![
            ("Id", field("EmployeeId")),
            ("Location", construct(vec![("City", field("City"))])),
        ]))?
        .filter(field("Location.City").equals(lit("London")))?
        .project(field("Id"))?
        .to_list()?;
    assert_eq!(ints(&london), vec![5, 6, 7, 9]);
    Ok(())
}

#[test]
fn test_text_functions() -> Result<()> {
    let db = northwind()?;
    let shippers = db.shippers();

    let upper = shippers.project(field("CompanyName").call("to_upper", vec![]))?.first()?;
    assert_eq!(upper, DataValue::from("SPEEDY EXPRESS"));

    let prefixes = shippers
        .project(call("substring", vec![field("CompanyName"), lit(0), lit(6)]))?
        .to_list()?;
    assert_eq!(texts(&prefixes), vec!["Speedy", "United", "Federa"]);

    let lengths = shippers.project(call("length", vec![field("CompanyName")]))?.to_list()?;
    assert_eq!(ints(&lengths), vec![14, 14, 16]);

    let positions = shippers
        .project(call("index_of", vec![field("CompanyName"), lit("Express")]))?
        .to_list()?;
    assert_eq!(ints(&positions), vec![7, -1, -1]);

    let phones = shippers.project(call("trim_end", vec![field("Phone"), lit("1")]))?.to_list()?;
    assert_eq!(texts(&phones), vec!["(503) 555-983", "(503) 555-3199", "(503) 555-993"]);
    Ok(())
}

#[test]
fn test_concatenation_with_absent_operand() -> Result<()> {
    let db = northwind()?;
    let employee = db.employees().filter(field("EmployeeId").equals(lit(5)))?;

    let joined = employee
        .project(call("concat", vec![field("City"), lit("/"), field("Region")]))?
        .single()?;
    assert_eq!(joined, DataValue::from("London/"));

    let added = db
        .employees()
        .project(field("LastName") + lit(", ") + field("FirstName"))?
        .first()?;
    assert_eq!(added, DataValue::from("Davolio, Nancy"));
    Ok(())
}

#[test]
fn test_predicate_as_selector_keeps_unknown() -> Result<()> {
    let db = northwind()?;
    let flags = db.employees().project(field("ReportsTo").gt(lit(2)))?.to_list()?;
    let b = DataValue::Boolean;
    assert_eq!(
        flags,
        vec![
            b(false),
            DataValue::Null,
            b(false),
            b(false),
            b(false),
            b(true),
            b(true),
            b(false),
            b(true),
        ]
    );
    Ok(())
}

#[test]
fn test_cast_and_coalesce() -> Result<()> {
    let db = northwind()?;
    let truncated = db
        .products()
        .filter(field("ProductId").equals(lit(14)))?
        .project(field("UnitPrice").cast(DataType::Integer))?
        .single()?;
    assert_eq!(truncated, DataValue::Integer(23));

    let regions = db
        .employees()
        .project(call("coalesce", vec![field("Region"), lit("n/a")]))?
        .to_list()?;
    assert_eq!(
        texts(&regions),
        vec!["WA", "WA", "WA", "WA", "n/a", "n/a", "n/a", "WA", "n/a"]
    );
    Ok(())
}

#[test]
fn test_arithmetic_failures() -> Result<()> {
    let db = northwind()?;
    let per_unit = db.products().project(field("UnitPrice") / field("UnitsInStock"))?;
    assert_eq!(per_unit.to_list(), Err(QueryError::DivisionByZero));

    let overflow = db.products().project(lit(i64::MAX) + field("ProductId"))?;
    assert_eq!(overflow.to_list(), Err(QueryError::NumericOverflow));

    // Filtering the offending row out first avoids the failure
    let stocked = db
        .products()
        .filter(field("UnitsInStock").gt(lit(0)))?
        .project(field("UnitPrice") / field("UnitsInStock"))?
        .count()?;
    assert_eq!(stocked, 12);
    Ok(())
}

#[test]
fn test_distinct() -> Result<()> {
    let db = northwind()?;
    let countries = db.employees().project(field("Country"))?.distinct();
    assert_eq!(texts(&countries.to_list()?), vec!["USA", "UK"]);
    assert_eq!(countries.distinct().to_list()?, countries.to_list()?);

    let places = db
        .customers()
        .project(construct(vec![("Region", field("Region")), ("Country", field("Country"))]))?
        .distinct()
        .count()?;
    assert_eq!(places, 9);
    Ok(())
}

#[test]
fn test_identity_projection_keeps_shape() -> Result<()> {
    let db = northwind()?;
    let identity = db.shippers().project(current())?;
    assert!(identity.shape().is_some());
    assert!(matches!(
        identity.filter(field("Fax").has_value()),
        Err(QueryError::InvalidArgument(_))
    ));
    assert_eq!(identity.to_list()?, db.shippers().to_list()?);
    Ok(())
}
