//! Product entity - One supermarket catalogue entry.
//!
//! Rows are created in bulk by catalogue ingestion and wiped wholesale on reload.
//! `category` is the only column the selection engine filters on.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Surrogate key assigned by the store on insert
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier supplied by the source file, if any. Not unique.
    pub external_id: Option<String>,
    /// Retailer name (e.g., "Mercadona")
    pub supermarket: String,
    /// Grouping key used for filtering (e.g., "Fruta")
    pub category: String,
    /// Display name (e.g., "Sandia")
    pub name: String,
    /// Shelf price
    pub price: f64,
    /// Normalized price per `reference_unit`, used for value comparison
    pub reference_price: f64,
    /// Unit of the reference price (e.g., "kg", "L")
    pub reference_unit: String,
    /// When the source row was recorded, kept as opaque text
    pub record_date: String,
}

/// Products have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
