//! Shared test utilities for `BasketBuddy`.
//!
//! This module provides common helper functions for setting up test databases,
//! catalogue files and products with sensible defaults.

use crate::{
    core::{
        catalogue::{CatalogueSource, ParseOptions},
        product::NewProduct,
        shop::Shop,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::path::{Path, PathBuf};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database in the system temp directory.
///
/// Unlike `sqlite::memory:`, every pooled connection sees the same data, which
/// concurrent tests need. Returns (connection, database path); pass the path to
/// [`remove_test_db_files`] when done.
pub async fn setup_file_test_db(name: &str) -> Result<(DatabaseConnection, PathBuf)> {
    let path = std::env::temp_dir().join(format!(
        "basket_buddy_{}_{name}.sqlite",
        std::process::id()
    ));
    remove_test_db_files(&path);

    let db = sea_orm::Database::connect(format!("sqlite://{}?mode=rwc", path.display())).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((db, path))
}

/// Removes a file database and its journal files, ignoring any that are missing.
pub fn remove_test_db_files(path: &Path) {
    for suffix in ["", "-wal", "-shm", "-journal"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

/// Builds an unsaved product with sensible defaults.
///
/// # Defaults
/// * `external_id`: None
/// * `supermarket`: "Mercadona"
/// * `reference_price`: same as `price`
/// * `reference_unit`: "kg"
/// * `record_date`: "2025-01-01"
#[must_use]
pub fn new_test_product(category: &str, name: &str, price: f64) -> NewProduct {
    NewProduct {
        external_id: None,
        supermarket: "Mercadona".to_string(),
        category: category.to_string(),
        name: name.to_string(),
        price,
        reference_price: price,
        reference_unit: "kg".to_string(),
        record_date: "2025-01-01".to_string(),
    }
}

/// Builds a stored-looking product model without touching a database.
#[must_use]
pub fn product_model(
    id: i64,
    category: &str,
    price: f64,
    reference_price: f64,
) -> entities::product::Model {
    entities::product::Model {
        id,
        external_id: Some(format!("ext{id}")),
        supermarket: "Mercadona".to_string(),
        category: category.to_string(),
        name: format!("Product {id}"),
        price,
        reference_price,
        reference_unit: "kg".to_string(),
        record_date: "2025-01-01".to_string(),
    }
}

/// Writes `contents` to a catalogue file in the system temp directory.
///
/// `name` must be unique per test so parallel tests do not share a file.
pub fn write_temp_catalogue(name: &str, contents: &str) -> Result<PathBuf> {
    let path = std::env::temp_dir().join(format!(
        "basket_buddy_{}_{name}.csv",
        std::process::id()
    ));
    std::fs::write(&path, contents)?;
    Ok(path)
}

/// Sets up a shop over a fresh database and a semicolon-delimited catalogue file.
/// Returns (shop, catalogue path); the catalogue is not loaded yet.
pub async fn setup_shop(name: &str, contents: &str) -> Result<(Shop, PathBuf)> {
    let db = setup_test_db().await?;
    let path = write_temp_catalogue(name, contents)?;
    let source = CatalogueSource::new(path.clone(), ParseOptions::default());
    Ok((Shop::new(db, source), path))
}
