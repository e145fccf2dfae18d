//! Product store operations - the table store the catalogue lives in.
//!
//! This module provides the insert, delete and query operations the catalogue loader
//! and the selection engine run against the `products` table. Write operations are
//! generic over [`ConnectionTrait`] so they can run inside a reload transaction as well
//! as against a plain connection. All functions are async and return Result types.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryOrder, QuerySelect, Set, TryInsertResult, prelude::*,
    sea_query::OnConflict,
};

/// A product that has not been stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewProduct {
    /// Identifier supplied by the source, if any
    pub external_id: Option<String>,
    /// Retailer name
    pub supermarket: String,
    /// Grouping key
    pub category: String,
    /// Display name
    pub name: String,
    /// Shelf price
    pub price: f64,
    /// Normalized per-unit price
    pub reference_price: f64,
    /// Unit of the reference price
    pub reference_unit: String,
    /// Opaque record timestamp
    pub record_date: String,
}

impl NewProduct {
    fn validate(&self) -> Result<()> {
        for amount in [self.price, self.reference_price] {
            if !is_valid_price(amount) {
                return Err(Error::InvalidAmount { amount });
            }
        }
        Ok(())
    }

    fn into_active_model(self) -> product::ActiveModel {
        product::ActiveModel {
            external_id: Set(self.external_id),
            supermarket: Set(self.supermarket),
            category: Set(self.category),
            name: Set(self.name),
            price: Set(self.price),
            reference_price: Set(self.reference_price),
            reference_unit: Set(self.reference_unit),
            record_date: Set(self.record_date),
            ..Default::default()
        }
    }
}

/// Prices must be finite and non-negative.
#[must_use]
pub fn is_valid_price(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

/// Inserts a product, ignoring the row if it conflicts with a uniqueness constraint.
///
/// Returns the id the store assigned, or `None` when the insert was swallowed as a conflict.
///
/// # Errors
/// Returns an error if:
/// - Either price is negative or not finite
/// - The database insert fails for a reason other than a conflict
pub async fn insert_product<C: ConnectionTrait>(
    db: &C,
    new_product: NewProduct,
) -> Result<Option<i64>> {
    new_product.validate()?;

    let result = Product::insert(new_product.into_active_model())
        .on_conflict(OnConflict::new().do_nothing().to_owned())
        .do_nothing()
        .exec(db)
        .await?;

    match result {
        TryInsertResult::Inserted(inserted) => Ok(Some(inserted.last_insert_id)),
        TryInsertResult::Conflicted | TryInsertResult::Empty => Ok(None),
    }
}

/// Deletes every product. Returns how many rows were removed.
///
/// # Errors
/// Returns an error if the database delete fails.
pub async fn delete_all_products<C: ConnectionTrait>(db: &C) -> Result<u64> {
    let result = Product::delete_many().exec(db).await?;
    Ok(result.rows_affected)
}

/// Retrieves every product in insertion order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the products of one category (exact, case-sensitive match) in insertion order.
///
/// Insertion order is what the selection engine uses to break ties.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_products_by_category<C: ConnectionTrait>(
    db: &C,
    category: &str,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::Category.eq(category))
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the distinct categories present in the store, in ascending order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_distinct_categories<C: ConnectionTrait>(db: &C) -> Result<Vec<String>> {
    Product::find()
        .select_only()
        .column(product::Column::Category)
        .distinct()
        .order_by_asc(product::Column::Category)
        .into_tuple::<String>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Counts the products in the store.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn count_products<C: ConnectionTrait>(db: &C) -> Result<u64> {
    Product::find().count(db).await.map_err(Into::into)
}

/// Replaces every stored field of an existing product.
///
/// # Errors
/// Returns an error if:
/// - Either price is negative or not finite
/// - The product does not exist
/// - The database update fails
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    changes: NewProduct,
) -> Result<product::Model> {
    changes.validate()?;

    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let mut product = changes.into_active_model();
    product.id = Set(existing.id);

    product.update(db).await.map_err(Into::into)
}

/// Deletes a single product.
///
/// # Errors
/// Returns `Error::ProductNotFound` if no product has this id.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let result = Product::delete_by_id(product_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::ProductNotFound { id: product_id });
    }
    Ok(())
}
