#[path = "../common/mod.rs"]
mod common;

use anyhow::Result;
use queryable::{
    call, construct, field, lit, DataValue, EvaluationConfig, JoinSelector, NullKeyPolicy, QueryError, QuerySource,
};

use common::{get, int_field, ints, northwind, text_field, texts};

#[test]
fn test_inner_join_preserves_outer_then_inner_order() -> Result<()> {
    let db = northwind()?;
    let joined = db.customers().join(
        &db.orders(),
        field("CustomerId"),
        field("CustomerId"),
        JoinSelector::new("c", "o"),
    )?;
    let ids = joined.project(field("o.OrderId"))?.to_list()?;
    assert_eq!(
        ints(&ids),
        vec![
            10643, 10692, 10702, 10308, 10625, 10365, 10355, 10326, 10389, 11045, 10528, 11061, 10375, 10495, 10307,
            10359, 10310, 10269,
        ]
    );
    Ok(())
}

#[test]
fn test_join_with_projection() -> Result<()> {
    let db = northwind()?;
    let selector = JoinSelector::new("o", "s").with_projection(construct(vec![
        ("OrderId", field("o.OrderId")),
        ("Shipper", field("s.CompanyName")),
    ]));
    let federal = db
        .orders()
        .join(&db.shippers(), field("ShipVia"), field("ShipperId"), selector)?
        .filter(field("Shipper").equals(lit("Federal Shipping")))?
        .to_list()?;
    assert_eq!(int_field(&federal, "OrderId"), vec![10308, 10359, 10495, 11061]);
    Ok(())
}

#[test]
fn test_left_join_keeps_unmatched_outer_elements() -> Result<()> {
    let db = northwind()?;
    let joined = db.customers().left_join(
        &db.orders(),
        field("CustomerId"),
        field("CustomerId"),
        JoinSelector::new("c", "o"),
    )?;
    assert_eq!(joined.count()?, 22);

    let without_orders = joined
        .filter(field("o").is_absent())?
        .project(field("c.CustomerId"))?
        .to_list()?;
    assert_eq!(texts(&without_orders), vec!["BONAP", "CHOPS", "PARIS", "TRAIH"]);
    Ok(())
}

#[test]
fn test_group_join() -> Result<()> {
    let db = northwind()?;
    let grouped = db.customers().group_join(
        &db.orders(),
        field("CustomerId"),
        field("CustomerId"),
        JoinSelector::new("customer", "orders").with_projection(construct(vec![
            ("CustomerId", field("customer.CustomerId")),
            ("OrderCount", call("length", vec![field("orders")])),
        ])),
    )?;
    let rows = grouped.to_list()?;
    assert_eq!(rows.len(), 17);
    assert_eq!(
        int_field(&rows, "OrderCount"),
        vec![3, 2, 1, 1, 1, 0, 2, 0, 2, 1, 1, 1, 0, 1, 1, 0, 1]
    );

    let alfki = grouped.first_where(field("CustomerId").equals(lit("ALFKI")))?;
    assert_eq!(get(&alfki, "OrderCount"), &DataValue::Integer(3));
    Ok(())
}

#[test]
fn test_group_join_lists_matches_in_inner_order() -> Result<()> {
    let db = northwind()?;
    let alfki = db
        .customers()
        .filter(field("CustomerId").equals(lit("ALFKI")))?
        .group_join(
            &db.orders(),
            field("CustomerId"),
            field("CustomerId"),
            JoinSelector::new("c", "o"),
        )?
        .single()?;
    let orders = get(&alfki, "o").as_list().map(<[DataValue]>::to_vec).unwrap_or_default();
    assert_eq!(int_field(&orders, "OrderId"), vec![10643, 10692, 10702]);
    Ok(())
}

#[test]
fn test_self_join() -> Result<()> {
    let db = northwind()?;
    let selector = JoinSelector::new("employee", "manager").with_projection(construct(vec![
        ("Employee", field("employee.EmployeeId")),
        ("Manager", field("manager.LastName")),
    ]));

    let managed = db
        .employees()
        .join(&db.employees(), field("ReportsTo"), field("EmployeeId"), selector.clone())?
        .to_list()?;
    assert_eq!(managed.len(), 8);
    assert_eq!(int_field(&managed, "Employee"), vec![1, 3, 4, 5, 6, 7, 8, 9]);
    assert_eq!(
        text_field(&managed, "Manager"),
        vec!["Fuller", "Fuller", "Fuller", "Fuller", "Buchanan", "Buchanan", "Fuller", "Buchanan"]
    );

    let everyone = db
        .employees()
        .left_join(&db.employees(), field("ReportsTo"), field("EmployeeId"), selector)?
        .to_list()?;
    assert_eq!(everyone.len(), 9);
    assert_eq!(get(&everyone[1], "Manager"), &DataValue::Null);
    Ok(())
}

#[test]
fn test_absent_keys_never_match_by_default() -> Result<()> {
    let db = northwind()?;
    let same_region = db.customers().join(
        &db.customers(),
        field("Region"),
        field("Region"),
        JoinSelector::new("a", "b"),
    )?;
    assert_eq!(same_region.count()?, 24);
    Ok(())
}

#[test]
fn test_absent_keys_can_match_each_other() -> Result<()> {
    let db = northwind()?;
    let config = EvaluationConfig {
        null_join_keys: NullKeyPolicy::MatchEachOther,
        ..EvaluationConfig::default()
    };
    let customers = QuerySource::with_config(db.customers.clone(), config);
    let same_region = customers.join(
        &customers,
        field("Region"),
        field("Region"),
        JoinSelector::new("a", "b"),
    )?;
    assert_eq!(same_region.count()?, 105);
    Ok(())
}

#[test]
fn test_join_results_compose() -> Result<()> {
    let db = northwind()?;
    let latest = db
        .customers()
        .filter(field("Country").equals(lit("USA")))?
        .join(
            &db.orders(),
            field("CustomerId"),
            field("CustomerId"),
            JoinSelector::new("c", "o"),
        )?
        .order_by_descending(field("o.OrderDate"))?
        .take(2)
        .project(field("o.OrderId"))?
        .to_list()?;
    assert_eq!(ints(&latest), vec![11061, 10528]);
    Ok(())
}

#[test]
fn test_join_key_validation() -> Result<()> {
    let db = northwind()?;
    let result = db.customers().join(
        &db.orders(),
        field("CustomerId"),
        field("ClientId"),
        JoinSelector::new("c", "o"),
    );
    assert!(matches!(result, Err(QueryError::InvalidArgument(_))));

    let result = db.customers().join(
        &db.orders(),
        field("CustomerId"),
        field("CustomerId"),
        JoinSelector::new("", "o"),
    );
    assert!(matches!(result, Err(QueryError::InvalidArgument(_))));
    Ok(())
}
