//! Shop service - the consumer-facing entry point to the catalogue.
//!
//! A [`Shop`] is constructed once at startup from a database connection and a
//! catalogue source and then handed to whatever front end needs it. It exposes
//! pull-style queries plus a broadcast channel that fires whenever the catalogue
//! is replaced, so front ends can refresh without polling.

use super::{
    catalogue::{self, CatalogueSource, IngestReport},
    product,
    selection::{self, Selection},
    strategy::StrategyKind,
    system_state,
};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;
use tracing::info;

const EVENT_CAPACITY: usize = 16;

/// Notification sent to subscribers when the stored catalogue changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogueEvent {
    /// The catalogue was replaced by a (re)load
    Reloaded(IngestReport),
}

/// Summary of the stored catalogue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogueStatus {
    /// Products currently stored
    pub product_count: u64,
    /// When the last successful load finished, if one ever did
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Handle to the product catalogue and the operations run against it.
#[derive(Clone, Debug)]
pub struct Shop {
    database: DatabaseConnection,
    source: CatalogueSource,
    events: broadcast::Sender<CatalogueEvent>,
}

impl Shop {
    /// Creates a shop over an initialized database.
    #[must_use]
    pub fn new(database: DatabaseConnection, source: CatalogueSource) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            database,
            source,
            events,
        }
    }

    /// Database connection backing this shop.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Catalogue source reloads read from.
    #[must_use]
    pub const fn source(&self) -> &CatalogueSource {
        &self.source
    }

    /// Subscribes to catalogue change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogueEvent> {
        self.events.subscribe()
    }

    /// Distinct categories in ascending order, read fresh from the store.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn load_categories(&self) -> Result<Vec<String>> {
        product::get_distinct_categories(&self.database).await
    }

    /// Replaces the stored catalogue with the current contents of the source file.
    ///
    /// The file is parsed before anything is deleted, and the delete and inserts
    /// commit together, so on error the previous catalogue is still in place.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The source file cannot be opened (`Error::SourceUnavailable`)
    /// - A price is invalid under the abort policy (`Error::InvalidNumericField`)
    /// - The database transaction fails
    pub async fn reload_catalogue(&self) -> Result<IngestReport> {
        info!("Reloading catalogue from {}", self.source.path().display());
        let parsed = self.source.load().await?;
        let report = catalogue::replace_catalogue(&self.database, parsed).await?;

        // No subscribers is fine.
        let _ = self.events.send(CatalogueEvent::Reloaded(report));
        Ok(report)
    }

    /// Loads the catalogue only if the store holds no products yet.
    ///
    /// Returns the report of the load, or `None` if the store was already populated.
    ///
    /// # Errors
    /// Returns an error if the product count fails, or any error
    /// [`reload_catalogue`](Self::reload_catalogue) returns.
    pub async fn ensure_catalogue(&self) -> Result<Option<IngestReport>> {
        let existing = product::count_products(&self.database).await?;
        if existing > 0 {
            info!("Catalogue already holds {existing} products, skipping initial load");
            return Ok(None);
        }
        self.reload_catalogue().await.map(Some)
    }

    /// Picks one product of `category` using `strategy`.
    ///
    /// Returns `None` when the category has no products.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn find_product(
        &self,
        category: &str,
        strategy: StrategyKind,
    ) -> Result<Option<Selection>> {
        let products = product::get_products_by_category(&self.database, category).await?;
        let mut rng = rand::thread_rng();
        Ok(pick(products, strategy, &mut rng))
    }

    /// Like [`find_product`](Self::find_product), drawing random picks from `rng`.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn find_product_with_rng<R: Rng + ?Sized>(
        &self,
        category: &str,
        strategy: StrategyKind,
        rng: &mut R,
    ) -> Result<Option<Selection>> {
        let products = product::get_products_by_category(&self.database, category).await?;
        Ok(pick(products, strategy, rng))
    }

    /// Product count and last load time.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn catalogue_status(&self) -> Result<CatalogueStatus> {
        let product_count = product::count_products(&self.database).await?;
        let loaded_at =
            system_state::get_value(&self.database, system_state::CATALOGUE_LOADED_AT)
                .await?
                .and_then(|value| DateTime::parse_from_rfc3339(&value).ok())
                .map(|at| at.with_timezone(&Utc));

        Ok(CatalogueStatus {
            product_count,
            loaded_at,
        })
    }
}

fn pick<R: Rng + ?Sized>(
    products: Vec<crate::entities::product::Model>,
    strategy: StrategyKind,
    rng: &mut R,
) -> Option<Selection> {
    selection::select(&products, strategy, rng).map(|chosen| Selection {
        product: chosen.clone(),
        strategy,
    })
}
