//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

#![allow(clippy::expect_used)]

use crate::{entities, errors::Result};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Parses a `YYYY-MM-DD` literal.
pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("test dates are well-formed")
}

/// Creates a company with no home base.
pub async fn create_test_company(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::company::Model> {
    let company = entities::company::ActiveModel {
        name: Set(name.to_string()),
        home_base_location_id: Set(None),
        ..Default::default()
    };
    Ok(company.insert(db).await?)
}

/// Points a company's home base at `location_id`.
pub async fn set_home_base(
    db: &DatabaseConnection,
    company_id: i64,
    location_id: i64,
) -> Result<entities::company::Model> {
    let company = entities::company::ActiveModel {
        id: Set(company_id),
        home_base_location_id: Set(Some(location_id)),
        ..Default::default()
    };
    Ok(company.update(db).await?)
}

/// Creates a location, optionally geocoded as `(lat, lng)`.
pub async fn create_test_location(
    db: &DatabaseConnection,
    name: &str,
    coordinates: Option<(f64, f64)>,
) -> Result<entities::location::Model> {
    let location = entities::location::ActiveModel {
        name: Set(name.to_string()),
        lat: Set(coordinates.map(|(lat, _)| lat)),
        lng: Set(coordinates.map(|(_, lng)| lng)),
        ..Default::default()
    };
    Ok(location.insert(db).await?)
}

/// Sets a location's coordinates, as geocoding would.
pub async fn move_location(
    db: &DatabaseConnection,
    location_id: i64,
    lat: f64,
    lng: f64,
) -> Result<entities::location::Model> {
    let location = entities::Location::find_by_id(location_id)
        .one(db)
        .await?
        .expect("location exists");
    let mut active: entities::location::ActiveModel = location.into();
    active.lat = Set(Some(lat));
    active.lng = Set(Some(lng));
    Ok(active.update(db).await?)
}

/// Creates a customer of `company_id` sited at `location_id`.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    company_id: i64,
    name: &str,
    location_id: Option<i64>,
) -> Result<entities::customer::Model> {
    let customer = entities::customer::ActiveModel {
        company_id: Set(company_id),
        name: Set(name.to_string()),
        location_id: Set(location_id),
        ..Default::default()
    };
    Ok(customer.insert(db).await?)
}

/// Creates a dump site of `company_id` at `location_id`.
pub async fn create_test_dump_site(
    db: &DatabaseConnection,
    company_id: i64,
    name: &str,
    location_id: Option<i64>,
) -> Result<entities::dump_site::Model> {
    let site = entities::dump_site::ActiveModel {
        company_id: Set(company_id),
        name: Set(name.to_string()),
        location_id: Set(location_id),
        ..Default::default()
    };
    Ok(site.insert(db).await?)
}

/// Creates a unit type with the given category tag.
pub async fn create_test_unit_type(
    db: &DatabaseConnection,
    company_id: i64,
    name: &str,
    category: &str,
) -> Result<entities::unit_type::Model> {
    let unit_type = entities::unit_type::ActiveModel {
        company_id: Set(company_id),
        name: Set(name.to_string()),
        category: Set(category.to_string()),
        ..Default::default()
    };
    Ok(unit_type.insert(db).await?)
}

/// Creates `count` units of one type, all in `status`.
pub async fn create_test_units(
    db: &DatabaseConnection,
    company_id: i64,
    unit_type_id: i64,
    count: usize,
    status: &str,
) -> Result<Vec<entities::unit::Model>> {
    let mut units = Vec::with_capacity(count);
    for n in 0..count {
        let unit = entities::unit::ActiveModel {
            company_id: Set(company_id),
            unit_type_id: Set(unit_type_id),
            serial: Set(format!("T{unit_type_id}-{n:03}")),
            status: Set(status.to_string()),
            ..Default::default()
        };
        units.push(unit.insert(db).await?);
    }
    Ok(units)
}

/// Creates an order over `start..=end`.
pub async fn create_test_order(
    db: &DatabaseConnection,
    company_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    status: &str,
) -> Result<entities::order::Model> {
    let order = entities::order::ActiveModel {
        company_id: Set(company_id),
        start_date: Set(start),
        end_date: Set(end),
        status: Set(status.to_string()),
        ..Default::default()
    };
    Ok(order.insert(db).await?)
}

/// Assigns a unit to an order.
pub async fn assign_unit(
    db: &DatabaseConnection,
    order_id: i64,
    unit_id: i64,
    billing_period: &str,
) -> Result<entities::order_unit::Model> {
    let assignment = entities::order_unit::ActiveModel {
        order_id: Set(order_id),
        unit_id: Set(unit_id),
        billing_period: Set(billing_period.to_string()),
        ..Default::default()
    };
    Ok(assignment.insert(db).await?)
}

/// Adds a rental line for `quantity` units of a type.
pub async fn add_rental_line(
    db: &DatabaseConnection,
    order_id: i64,
    unit_type_id: i64,
    quantity: i32,
) -> Result<entities::rental_line_item::Model> {
    let line = entities::rental_line_item::ActiveModel {
        order_id: Set(order_id),
        unit_type_id: Set(unit_type_id),
        quantity: Set(quantity),
        ..Default::default()
    };
    Ok(line.insert(db).await?)
}

/// Adds a service-only line covering `units_serviced` units.
pub async fn add_service_line(
    db: &DatabaseConnection,
    order_id: i64,
    units_serviced: i32,
) -> Result<entities::service_line_item::Model> {
    let line = entities::service_line_item::ActiveModel {
        order_id: Set(order_id),
        description: Set("Pump customer-owned units".to_string()),
        units_serviced: Set(units_serviced),
        ..Default::default()
    };
    Ok(line.insert(db).await?)
}

/// Creates a service event scheduled on the order's first day.
pub async fn create_test_service_event(
    db: &DatabaseConnection,
    order_id: i64,
    event_type: &str,
    estimated_gallons_override: Option<i32>,
) -> Result<entities::service_event::Model> {
    let event = entities::service_event::ActiveModel {
        order_id: Set(order_id),
        event_type: Set(event_type.to_string()),
        scheduled_date: Set(date("2024-01-01")),
        estimated_gallons_override: Set(estimated_gallons_override),
        ..Default::default()
    };
    Ok(event.insert(db).await?)
}
