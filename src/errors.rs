//! Unified error types for `BasketBuddy`.
//!
//! Row-level problems that ingestion recovers from (short rows, skipped numbers)
//! are counted in an [`IngestReport`](crate::core::catalogue::IngestReport) and never
//! show up here. Everything that reaches the caller goes through [`Error`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors surfaced by the library and the bot.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// Any failure reported by `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The catalogue file could not be opened
    #[error("Catalogue source unavailable at {}: {source}", path.display())]
    SourceUnavailable {
        /// Path that was tried
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// A price column did not hold a finite, non-negative decimal
    #[error("Invalid {field} on line {line}: {value:?}")]
    InvalidNumericField {
        /// 1-based line number in the source file
        line: u64,
        /// Column name (`price` or `reference_price`)
        field: &'static str,
        /// Raw field text
        value: String,
    },

    /// The catalogue stream itself could not be decoded
    #[error("Catalogue read error: {0}")]
    Catalogue(#[from] csv::Error),

    /// No product with this id exists
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Requested product id
        id: i64,
    },

    /// A price outside the accepted range
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// Offending value
        amount: f64,
    },

    /// A strategy name that does not match any [`StrategyKind`](crate::core::strategy::StrategyKind)
    #[error("Unknown shopping strategy: {0}")]
    UnknownStrategy(String),

    /// The blocking parse worker panicked or was cancelled
    #[error("Background task failed: {0}")]
    Background(#[from] tokio::task::JoinError),

    /// I/O error outside catalogue loading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
