//! Database configuration module for hotel-desk.
//!
//! This module handles database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs.
//! `SQLite` is used for tests and local runs, `PostgreSQL` in production.

use crate::entities::{
    Attendance, Employee, Folio, FolioLineItem, Overtime, Payment, PropertyService, RatePlan,
    Reservation, RestaurantTable, Room, TableBooking, WorkingShift,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::info;

/// Fallback when `DATABASE_URL` is not set
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/hotel_desk.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(path) = database_url
        .strip_prefix("sqlite://")
        .and_then(|rest| rest.split('?').next())
        .and_then(|file| std::path::Path::new(file).parent())
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        std::fs::create_dir_all(path)?;
    }

    let db = Database::connect(&database_url).await?;
    info!(backend = ?db.get_database_backend(), "Database connected");
    Ok(db)
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables that do not exist yet.
///
/// Parents are created before the tables whose foreign keys point at them.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, RatePlan).await?;
    create_table(db, &schema, Reservation).await?;
    create_table(db, &schema, Folio).await?;
    create_table(db, &schema, FolioLineItem).await?;
    create_table(db, &schema, Payment).await?;
    create_table(db, &schema, Room).await?;
    create_table(db, &schema, RestaurantTable).await?;
    create_table(db, &schema, TableBooking).await?;
    create_table(db, &schema, PropertyService).await?;
    create_table(db, &schema, Employee).await?;
    create_table(db, &schema, WorkingShift).await?;
    create_table(db, &schema, Attendance).await?;
    create_table(db, &schema, Overtime).await?;

    Ok(())
}
