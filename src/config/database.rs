//! Database configuration module for `BasketBuddy`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL. Creation uses
//! `IF NOT EXISTS`, which makes it safe to run on every startup against a persistent file.

use crate::entities::{Product, SystemState};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/basket_buddy.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the `SQLite` database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file (created on demand) if no environment variable is set.
/// The directory holding a file database is created if it is missing.
///
/// # Errors
/// Returns an error if the database directory cannot be created or the connection fails.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(dir) = sqlite_file_dir(&database_url) {
        std::fs::create_dir_all(dir)?;
    }

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Directory of the file behind a `sqlite://` URL, if it names one.
fn sqlite_file_dir(database_url: &str) -> Option<&Path> {
    let file = database_url
        .strip_prefix("sqlite://")?
        .split('?')
        .next()
        .filter(|file| !file.is_empty() && *file != ":memory:")?;

    Path::new(file)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Creates the product and system state tables if they do not exist yet.
///
/// # Errors
/// Returns an error if a `CREATE TABLE` statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut product_table = schema.create_table_from_entity(Product);
    product_table.if_not_exists();
    let mut system_state_table = schema.create_table_from_entity(SystemState);
    system_state_table.if_not_exists();

    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&system_state_table)).await?;

    Ok(())
}
