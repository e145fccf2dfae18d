//! Catalogue loader - turns the bundled product file into stored products.
//!
//! Loading happens in two phases. The source file is opened and parsed completely
//! on a blocking worker first; only a successful parse moves on to the store, where
//! the old catalogue is deleted and the new rows inserted inside one transaction.
//! An unreadable file or an aborting numeric error therefore never touches the
//! stored catalogue, and readers never observe a half-replaced one.
//!
//! Expected columns, in order:
//! `external_id, supermarket, category, name, price, reference_price, reference_unit, record_date`.

use super::{
    product::{self, NewProduct},
    system_state,
};
use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Number of columns a catalogue row must have.
pub const COLUMN_COUNT: usize = 8;

/// What to do with a row whose price columns fail to parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidNumberPolicy {
    /// Fail the whole load with [`Error::InvalidNumericField`]
    #[default]
    Abort,
    /// Drop the row and count it in [`IngestReport::skipped_invalid`]
    Skip,
}

/// How to split and validate catalogue rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Field delimiter; delimiters inside double quotes do not split
    pub delimiter: u8,
    /// Handling of unparseable prices
    pub on_invalid_number: InvalidNumberPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            on_invalid_number: InvalidNumberPolicy::Abort,
        }
    }
}

/// A catalogue file plus the options needed to read it.
#[derive(Clone, Debug)]
pub struct CatalogueSource {
    path: PathBuf,
    options: ParseOptions,
}

impl CatalogueSource {
    /// Creates a source reading `path` with `options`.
    #[must_use]
    pub const fn new(path: PathBuf, options: ParseOptions) -> Self {
        Self { path, options }
    }

    /// Path of the catalogue file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse options for this source.
    #[must_use]
    pub const fn options(&self) -> ParseOptions {
        self.options
    }

    /// Opens and fully parses the file on a blocking worker.
    ///
    /// # Errors
    /// Returns `Error::SourceUnavailable` if the file cannot be opened, or any
    /// error [`parse_catalogue`] returns.
    pub async fn load(&self) -> Result<ParsedCatalogue> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || {
            let file = File::open(&source.path).map_err(|e| Error::SourceUnavailable {
                path: source.path.clone(),
                source: e,
            })?;
            parse_catalogue(BufReader::new(file), source.options)
        })
        .await?
    }
}

/// Rows accepted by the parser plus counts of what it dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedCatalogue {
    /// Valid rows in file order
    pub products: Vec<NewProduct>,
    /// Rows with fewer than [`COLUMN_COUNT`] fields
    pub skipped_malformed: usize,
    /// Rows dropped under [`InvalidNumberPolicy::Skip`]
    pub skipped_invalid: usize,
}

/// Outcome of writing a parsed catalogue into the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Products now in the store from this load
    pub inserted: usize,
    /// Rows with too few fields
    pub skipped_malformed: usize,
    /// Rows with unparseable prices (skip policy only)
    pub skipped_invalid: usize,
    /// Inserts swallowed as uniqueness conflicts
    pub ignored_conflicts: usize,
}

/// Parses a catalogue stream. The first line is a header and is discarded.
///
/// Blank lines after the header are rows without fields, so they count towards
/// `skipped_malformed` like any other short row.
///
/// The reader is consumed and dropped before this returns, on success and on error.
///
/// # Errors
/// Returns an error if:
/// - The stream is not valid UTF-8 or cannot be read
/// - A price column is invalid and the policy is [`InvalidNumberPolicy::Abort`]
pub fn parse_catalogue<R: Read>(mut reader: R, options: ParseOptions) -> Result<ParsedCatalogue> {
    let mut contents = Vec::new();
    reader.read_to_end(&mut contents)?;

    let mut parsed = ParsedCatalogue::default();

    // The csv reader skips empty lines without yielding a record.
    let blank_lines = count_blank_lines(&contents, options.delimiter);
    if blank_lines > 0 {
        debug!(blank_lines, "Skipping blank catalogue lines");
        parsed.skipped_malformed += blank_lines;
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(contents.as_slice());

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map_or(0, csv::Position::line);

        if record.len() < COLUMN_COUNT {
            debug!(line, fields = record.len(), "Skipping malformed catalogue row");
            parsed.skipped_malformed += 1;
            continue;
        }

        match parse_row(&record, line) {
            Ok(new_product) => parsed.products.push(new_product),
            Err(e @ Error::InvalidNumericField { .. })
                if options.on_invalid_number == InvalidNumberPolicy::Skip =>
            {
                warn!("Skipping catalogue row: {e}");
                parsed.skipped_invalid += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(parsed)
}

/// Counts empty lines after the first non-empty one (the header).
///
/// Line breaks inside quoted fields belong to the field and are not lines here.
fn count_blank_lines(contents: &[u8], delimiter: u8) -> usize {
    let mut blank_lines = 0;
    let mut seen_header = false;
    let mut line_is_empty = true;
    let mut at_field_start = true;
    let mut in_quotes = false;
    let mut just_closed_quote = false;

    for &byte in contents {
        if in_quotes {
            if byte == b'"' {
                in_quotes = false;
                just_closed_quote = true;
            }
            continue;
        }

        match byte {
            // Doubled quote inside a quoted field
            b'"' if just_closed_quote => in_quotes = true,
            b'"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
                line_is_empty = false;
            }
            b'\n' => {
                if line_is_empty {
                    if seen_header {
                        blank_lines += 1;
                    }
                } else {
                    seen_header = true;
                }
                line_is_empty = true;
                at_field_start = true;
            }
            b'\r' => {}
            _ if byte == delimiter => {
                at_field_start = true;
                line_is_empty = false;
            }
            _ => {
                at_field_start = false;
                line_is_empty = false;
            }
        }
        just_closed_quote = false;
    }

    blank_lines
}

fn parse_row(record: &csv::StringRecord, line: u64) -> Result<NewProduct> {
    let field = |index: usize| record.get(index).unwrap_or_default();

    let external_id = Some(field(0))
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    Ok(NewProduct {
        external_id,
        supermarket: field(1).to_string(),
        category: field(2).to_string(),
        name: field(3).to_string(),
        price: parse_price(field(4), "price", line)?,
        reference_price: parse_price(field(5), "reference_price", line)?,
        reference_unit: field(6).to_string(),
        record_date: field(7).to_string(),
    })
}

fn parse_price(value: &str, field: &'static str, line: u64) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| product::is_valid_price(*amount))
        .ok_or_else(|| Error::InvalidNumericField {
            line,
            field,
            value: value.to_string(),
        })
}

/// Inserts every parsed row, swallowing conflicts.
///
/// # Errors
/// Returns an error if a row fails validation or an insert fails for a reason
/// other than a conflict. Rows inserted before the failure stay in `db`.
pub async fn ingest_products<C: ConnectionTrait>(
    db: &C,
    parsed: ParsedCatalogue,
) -> Result<IngestReport> {
    let mut report = IngestReport {
        skipped_malformed: parsed.skipped_malformed,
        skipped_invalid: parsed.skipped_invalid,
        ..IngestReport::default()
    };

    for new_product in parsed.products {
        if product::insert_product(db, new_product).await?.is_some() {
            report.inserted += 1;
        } else {
            report.ignored_conflicts += 1;
        }
    }

    Ok(report)
}

/// Replaces the stored catalogue with `parsed` in a single transaction.
///
/// Dropping the returned future before it completes rolls the transaction back.
///
/// # Errors
/// Returns an error if any statement or the commit fails. The transaction is
/// rolled back and the previous catalogue stays in place.
pub async fn replace_catalogue(
    db: &DatabaseConnection,
    parsed: ParsedCatalogue,
) -> Result<IngestReport> {
    let txn = db.begin().await?;

    let removed = product::delete_all_products(&txn).await?;
    let report = ingest_products(&txn, parsed).await?;

    let product_count = product::count_products(&txn).await?;
    system_state::set_value(
        &txn,
        system_state::CATALOGUE_LOADED_AT,
        chrono::Utc::now().to_rfc3339(),
    )
    .await?;
    system_state::set_value(
        &txn,
        system_state::CATALOGUE_PRODUCT_COUNT,
        product_count.to_string(),
    )
    .await?;

    txn.commit().await?;

    info!(
        removed,
        inserted = report.inserted,
        skipped_malformed = report.skipped_malformed,
        skipped_invalid = report.skipped_invalid,
        ignored_conflicts = report.ignored_conflicts,
        "Catalogue replaced"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    const HEADER: &str = "id;supermarket;category;name;price;reference_price;reference_unit;insert_date\n";

    fn parse(body: &str) -> Result<ParsedCatalogue> {
        parse_catalogue(format!("{HEADER}{body}").as_bytes(), ParseOptions::default())
    }

    #[test]
    fn test_parse_semicolon_rows() -> Result<()> {
        let parsed = parse(
            "ext1;M;Fruta;Melon;3.75;0.55;kg;2025-01-01\n\
             ext2;M;Fruta;Sandia;2.00;0.40;kg;2025-01-01\n",
        )?;

        assert_eq!(parsed.products.len(), 2);
        assert_eq!(parsed.skipped_malformed, 0);

        let melon = &parsed.products[0];
        assert_eq!(melon.external_id.as_deref(), Some("ext1"));
        assert_eq!(melon.supermarket, "M");
        assert_eq!(melon.category, "Fruta");
        assert_eq!(melon.name, "Melon");
        assert_eq!(melon.price, 3.75);
        assert_eq!(melon.reference_price, 0.55);
        assert_eq!(melon.reference_unit, "kg");
        assert_eq!(melon.record_date, "2025-01-01");
        Ok(())
    }

    #[test]
    fn test_header_only_yields_nothing() -> Result<()> {
        let parsed = parse("")?;
        assert_eq!(parsed, ParsedCatalogue::default());
        Ok(())
    }

    #[test]
    fn test_comma_delimiter_respects_quotes() -> Result<()> {
        let input = "id,supermarket,category,name,price,reference_price,reference_unit,insert_date\n\
                     ext1,M,\"Fruta, fresca\",\"Melon, piel de sapo\",3.75,0.55,kg,2025-01-01 10:00:00\n";
        let options = ParseOptions {
            delimiter: b',',
            ..ParseOptions::default()
        };

        let parsed = parse_catalogue(input.as_bytes(), options)?;
        assert_eq!(parsed.products.len(), 1);
        assert_eq!(parsed.products[0].category, "Fruta, fresca");
        assert_eq!(parsed.products[0].name, "Melon, piel de sapo");
        assert_eq!(parsed.products[0].record_date, "2025-01-01 10:00:00");
        Ok(())
    }

    #[test]
    fn test_short_rows_are_skipped_and_counted() -> Result<()> {
        let parsed = parse(
            "ext1;M;Fruta;Melon;3.75;0.55;kg\n\
             ext2;M;Fruta;Sandia;2.00;0.40;kg;2025-01-01\n\
             garbage\n",
        )?;

        assert_eq!(parsed.products.len(), 1);
        assert_eq!(parsed.products[0].name, "Sandia");
        assert_eq!(parsed.skipped_malformed, 2);
        Ok(())
    }

    #[test]
    fn test_blank_lines_count_as_malformed() -> Result<()> {
        let parsed = parse_catalogue("h\n\nx;y\n".as_bytes(), ParseOptions::default())?;
        assert!(parsed.products.is_empty());
        assert_eq!(parsed.skipped_malformed, 2);

        let parsed = parse(
            "\r\n\
             ext1;M;Fruta;Melon;3.75;0.55;kg;2025-01-01\n\
             \n\
             \n",
        )?;
        assert_eq!(parsed.products.len(), 1);
        assert_eq!(parsed.skipped_malformed, 3);
        Ok(())
    }

    #[test]
    fn test_line_breaks_inside_quotes_are_not_blank_lines() -> Result<()> {
        let parsed = parse("ext1;M;Fruta;\"Melon\n\npiel de sapo\";3.75;0.55;kg;2025-01-01\n")?;
        assert_eq!(parsed.products.len(), 1);
        assert_eq!(parsed.products[0].name, "Melon\n\npiel de sapo");
        assert_eq!(parsed.skipped_malformed, 0);
        Ok(())
    }

    #[test]
    fn test_extra_columns_are_ignored() -> Result<()> {
        let parsed = parse("ext1;M;Fruta;Melon;3.75;0.55;kg;2025-01-01;extra;more\n")?;
        assert_eq!(parsed.products.len(), 1);
        assert_eq!(parsed.products[0].record_date, "2025-01-01");
        Ok(())
    }

    #[test]
    fn test_empty_external_id_is_none() -> Result<()> {
        let parsed = parse(";M;Fruta;Melon;3.75;0.55;kg;2025-01-01\n")?;
        assert_eq!(parsed.products[0].external_id, None);
        Ok(())
    }

    #[test]
    fn test_invalid_price_aborts_by_default() {
        let result = parse(
            "ext1;M;Fruta;Melon;3.75;0.55;kg;2025-01-01\n\
             ext2;M;Fruta;Sandia;dos;0.40;kg;2025-01-01\n",
        );

        match result {
            Err(Error::InvalidNumericField { line, field, value }) => {
                assert_eq!(line, 3);
                assert_eq!(field, "price");
                assert_eq!(value, "dos");
            }
            other => panic!("expected InvalidNumericField, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_and_non_finite_prices_rejected() {
        for bad in ["-1.0", "NaN", "inf", ""] {
            let result = parse(&format!("ext1;M;Fruta;Melon;3.75;{bad};kg;2025-01-01\n"));
            assert!(
                matches!(
                    result,
                    Err(Error::InvalidNumericField { field: "reference_price", .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_price_skipped_under_skip_policy() -> Result<()> {
        let input = format!(
            "{HEADER}ext1;M;Fruta;Melon;3.75;0.55;kg;2025-01-01\n\
             ext2;M;Fruta;Sandia;dos;0.40;kg;2025-01-01\n"
        );
        let options = ParseOptions {
            on_invalid_number: InvalidNumberPolicy::Skip,
            ..ParseOptions::default()
        };

        let parsed = parse_catalogue(input.as_bytes(), options)?;
        assert_eq!(parsed.products.len(), 1);
        assert_eq!(parsed.skipped_invalid, 1);
        Ok(())
    }

    #[test]
    fn test_prices_tolerate_surrounding_whitespace() -> Result<()> {
        let parsed = parse("ext1;M;Fruta;Melon; 3.75 ;0.55 ;kg;2025-01-01\n")?;
        assert_eq!(parsed.products[0].price, 3.75);
        assert_eq!(parsed.products[0].reference_price, 0.55);
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_a_read_error() {
        let mut input = HEADER.as_bytes().to_vec();
        input.extend_from_slice(b"ext1;M;Fruta;Mel\xFFon;3.75;0.55;kg;2025-01-01\n");

        let result = parse_catalogue(input.as_slice(), ParseOptions::default());
        assert!(matches!(result, Err(Error::Catalogue(_))));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_source_unavailable() {
        let source = CatalogueSource::new(
            PathBuf::from("no/such/catalogue.csv"),
            ParseOptions::default(),
        );
        let result = source.load().await;
        assert!(matches!(result, Err(Error::SourceUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_load_reads_file() -> Result<()> {
        let path = write_temp_catalogue(
            "load_reads_file",
            &format!("{HEADER}ext1;M;Fruta;Melon;3.75;0.55;kg;2025-01-01\n"),
        )?;
        let source = CatalogueSource::new(path.clone(), ParseOptions::default());

        let parsed = source.load().await?;
        assert_eq!(parsed.products.len(), 1);

        std::fs::remove_file(path)?;
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_catalogue_round_trip() -> Result<()> {
        let db = setup_test_db().await?;
        let parsed = parse(
            "ext1;M;Fruta;Melon;3.75;0.55;kg;2025-01-01\n\
             ext2;M;Fruta;Sandia;2.00;0.40;kg;2025-01-01\n\
             short;row\n",
        )?;
        let expected = parsed.products.clone();

        let report = replace_catalogue(&db, parsed).await?;
        assert_eq!(
            report,
            IngestReport {
                inserted: 2,
                skipped_malformed: 1,
                skipped_invalid: 0,
                ignored_conflicts: 0,
            }
        );

        let stored = product::get_products_by_category(&db, "Fruta").await?;
        assert_eq!(stored.len(), expected.len());
        for (stored, input) in stored.iter().zip(&expected) {
            assert_eq!(stored.external_id, input.external_id);
            assert_eq!(stored.supermarket, input.supermarket);
            assert_eq!(stored.category, input.category);
            assert_eq!(stored.name, input.name);
            assert_eq!(stored.price, input.price);
            assert_eq!(stored.reference_price, input.reference_price);
            assert_eq!(stored.reference_unit, input.reference_unit);
            assert_eq!(stored.record_date, input.record_date);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_catalogue_wipes_previous_rows() -> Result<()> {
        let db = setup_test_db().await?;
        product::insert_product(&db, new_test_product("Carne", "Pollo", 5.0)).await?;

        replace_catalogue(&db, parse("ext1;M;Fruta;Melon;3.75;0.55;kg;2025-01-01\n")?).await?;

        assert_eq!(product::get_distinct_categories(&db).await?, vec!["Fruta"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_catalogue_records_state() -> Result<()> {
        let db = setup_test_db().await?;
        replace_catalogue(&db, parse("ext1;M;Fruta;Melon;3.75;0.55;kg;2025-01-01\n")?).await?;

        let count = system_state::get_value(&db, system_state::CATALOGUE_PRODUCT_COUNT).await?;
        assert_eq!(count.as_deref(), Some("1"));
        let loaded_at = system_state::get_value(&db, system_state::CATALOGUE_LOADED_AT).await?;
        assert!(loaded_at.is_some());
        Ok(())
    }
}
