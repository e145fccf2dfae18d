//! System state business logic - key/value bookkeeping about the catalogue.
//!
//! Reloads record when they ran and how many products they left behind, so the
//! bot can report catalogue freshness without scanning the product table.

use crate::{
    entities::{SystemState, system_state},
    errors::Result,
};
use sea_orm::{ConnectionTrait, Set, prelude::*};

/// Key holding the RFC 3339 timestamp of the last successful catalogue load.
pub const CATALOGUE_LOADED_AT: &str = "catalogue_loaded_at";

/// Key holding the product count after the last successful catalogue load.
pub const CATALOGUE_PRODUCT_COUNT: &str = "catalogue_product_count";

/// Reads the value stored under `key`, if any.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_value<C: ConnectionTrait>(db: &C, key: &str) -> Result<Option<String>> {
    Ok(SystemState::find()
        .filter(system_state::Column::Key.eq(key))
        .one(db)
        .await?
        .map(|state| state.value))
}

/// Stores `value` under `key`, replacing any previous value.
///
/// # Errors
/// Returns an error if the database read or write fails.
pub async fn set_value<C: ConnectionTrait>(db: &C, key: &str, value: String) -> Result<()> {
    let now = chrono::Utc::now().naive_utc();
    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(existing) = existing {
        let mut state: system_state::ActiveModel = existing.into();
        state.value = Set(value);
        state.updated_at = Set(now);
        state.update(db).await?;
    } else {
        system_state::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}
