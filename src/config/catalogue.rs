//! Catalogue configuration loading from config.toml
//!
//! The `[catalogue]` table names the bundled product file and how to read it.
//! It is turned into a [`CatalogueSource`] that the shop reloads from.

use crate::core::catalogue::{CatalogueSource, InvalidNumberPolicy, ParseOptions};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Where the product catalogue comes from
    pub catalogue: CatalogueConfig,
}

/// Configuration for the catalogue source file
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogueConfig {
    /// Path to the delimited catalogue file
    pub path: PathBuf,
    /// Field delimiter, a single ASCII character
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// What to do with a row whose price columns do not parse
    #[serde(default)]
    pub on_invalid_number: InvalidNumberPolicy,
}

const fn default_delimiter() -> char {
    ';'
}

impl CatalogueConfig {
    /// Validates the delimiter and builds the source the shop loads from.
    ///
    /// # Errors
    /// Returns `Error::Config` if the delimiter is not a single ASCII character
    /// or is a double quote (which is reserved for quoting).
    pub fn to_source(&self) -> Result<CatalogueSource> {
        let delimiter = u8::try_from(self.delimiter)
            .ok()
            .filter(|byte| byte.is_ascii() && *byte != b'"')
            .ok_or_else(|| Error::Config {
                message: format!(
                    "Catalogue delimiter must be a single ASCII character other than '\"', got {:?}",
                    self.delimiter
                ),
            })?;

        Ok(CatalogueSource::new(
            self.path.clone(),
            ParseOptions {
                delimiter,
                on_invalid_number: self.on_invalid_number,
            },
        ))
    }
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    tracing::debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Loads configuration from `CONFIG_PATH`, or `./config.toml` when unset.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}
