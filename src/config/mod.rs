/// Catalogue source configuration loaded from config.toml
pub mod catalogue;

/// Database configuration and connection management
pub mod database;
