//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{
    Company, Customer, DumpSite, Location, LocationDistance, Order, OrderUnit, RentalLineItem,
    ServiceEvent, ServiceLineItem, Unit, UnitType,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/logistics.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns the
/// default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    info!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables the engine reads and writes, skipping any that already exist.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Location).await?;
    create_table(db, &schema, Company).await?;
    create_table(db, &schema, Customer).await?;
    create_table(db, &schema, DumpSite).await?;
    create_table(db, &schema, UnitType).await?;
    create_table(db, &schema, Unit).await?;
    create_table(db, &schema, Order).await?;
    create_table(db, &schema, OrderUnit).await?;
    create_table(db, &schema, RentalLineItem).await?;
    create_table(db, &schema, ServiceLineItem).await?;
    create_table(db, &schema, ServiceEvent).await?;
    create_table(db, &schema, LocationDistance).await?;

    Ok(())
}
