//! # Transfer Service
//!
//! CSV and JSON import/export for products and stock items.
//!
//! ## Wire Formats
//! - JSON: a pretty-printed array of records with the legacy camelCase
//!   field names.
//! - CSV: header row, string fields quoted, numeric fields unquoted, `"`
//!   escaped as `""`, CRLF line terminators.
//!
//! ## Import Policy (per record)
//! ```text
//! product missing id or name      → skipped, counted, row-indexed message
//! stock item missing itemId       → skipped, counted, row-indexed message
//! numeric field unparsable        → defaults to 0
//! numeric field absent            → left missing; reconciliation derives it
//! storage failure on one record   → skipped, counted; remaining rows continue
//! ```
//! Imports never abort on a bad record; the caller gets an aggregate
//! [`ImportSummary`] of succeeded vs skipped.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use tally_core::units::parse_number_or_zero;
use tally_core::validation::validate_product;
use tally_core::{reconcile, Product, RawStockItem, StockItem};
use tally_db::Database;

/// Supported transfer encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFormat {
    Json,
    Csv,
}

impl TransferFormat {
    /// Picks a format from a file extension, case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(TransferFormat::Json),
            "csv" => Some(TransferFormat::Csv),
            _ => None,
        }
    }
}

/// Aggregate result of a batch import.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Records written to the store.
    pub imported: usize,

    /// Records skipped (invalid or failed); detailed in `errors`.
    pub skipped: usize,

    /// Row-indexed messages for every skipped record.
    pub errors: Vec<String>,
}

impl ImportSummary {
    fn skip(&mut self, row: usize, reason: impl std::fmt::Display) {
        self.skipped += 1;
        self.errors.push(format!("Row {}: {}", row + 1, reason));
    }
}

/// Import/export over the record store.
#[derive(Debug, Clone)]
pub struct TransferService {
    db: Database,
}

impl TransferService {
    /// Creates a new TransferService over the given database.
    pub fn new(db: Database) -> Self {
        TransferService { db }
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Exports all products as a pretty-printed JSON array.
    pub async fn export_products_json(&self) -> EngineResult<String> {
        let products = self.db.products().get_all().await?;
        serde_json::to_string_pretty(&products)
            .map_err(|e| EngineError::internal(e.to_string()))
    }

    /// Exports all products as CSV.
    pub async fn export_products_csv(&self) -> EngineResult<String> {
        let products = self.db.products().get_all().await?;
        write_csv(&products)
    }

    /// Exports all stock items as a pretty-printed JSON array.
    ///
    /// Rows are normalized in memory first so legacy records export in the
    /// full unit/sub-unit shape.
    pub async fn export_stock_items_json(&self) -> EngineResult<String> {
        let items = self.normalized_stock_items().await?;
        serde_json::to_string_pretty(&items)
            .map_err(|e| EngineError::internal(e.to_string()))
    }

    /// Exports all stock items as CSV (normalized, like the JSON export).
    pub async fn export_stock_items_csv(&self) -> EngineResult<String> {
        let items = self.normalized_stock_items().await?;
        write_csv(&items)
    }

    async fn normalized_stock_items(&self) -> EngineResult<Vec<StockItem>> {
        let rows = self.db.stock_items().get_all().await?;
        Ok(rows.iter().map(|raw| reconcile(raw).0).collect())
    }

    // =========================================================================
    // Import
    // =========================================================================

    /// Imports products from CSV or JSON text.
    ///
    /// A record missing `id` or `name` is skipped; `price` defaults to 0
    /// when unparsable. Valid records upsert by id, last write wins.
    pub async fn import_products(
        &self,
        data: &str,
        format: TransferFormat,
    ) -> EngineResult<ImportSummary> {
        let records = parse_records(data, format)?;
        let mut summary = ImportSummary::default();

        for (row, record) in records.iter().enumerate() {
            let id = string_field(record, "id");
            let name = string_field(record, "name");
            let (id, name) = match (id, name) {
                (Some(id), Some(name)) => (id, name),
                _ => {
                    summary.skip(row, "id and name are required");
                    continue;
                }
            };

            let product = Product {
                id,
                name,
                category: string_field(record, "category").unwrap_or_default(),
                price: number_field(record, "price").unwrap_or(0.0),
                description: string_field(record, "description").unwrap_or_default(),
            };

            if let Err(e) = validate_product(&product) {
                summary.skip(row, e);
                continue;
            }

            match self.db.products().put(&product).await {
                Ok(()) => summary.imported += 1,
                Err(e) => summary.skip(row, e),
            }
        }

        info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "Product import finished"
        );
        Ok(summary)
    }

    /// Imports stock items from CSV or JSON text.
    ///
    /// A record missing `itemId` is skipped. Records are passed through
    /// reconciliation before persisting, so legacy shapes land in the store
    /// already normalized.
    pub async fn import_stock_items(
        &self,
        data: &str,
        format: TransferFormat,
    ) -> EngineResult<ImportSummary> {
        let records = parse_records(data, format)?;
        let mut summary = ImportSummary::default();

        for (row, record) in records.iter().enumerate() {
            let item_id = match string_field(record, "itemId") {
                Some(id) => id,
                None => {
                    summary.skip(row, "itemId is required");
                    continue;
                }
            };

            let raw = RawStockItem {
                item_id,
                description: string_field(record, "description").unwrap_or_default(),
                quantity: number_field(record, "quantity"),
                sub_unit_count: number_field(record, "subUnitCount"),
                unit_name: string_field(record, "unitName"),
                total_units: number_field(record, "totalUnits"),
            };
            let (item, _) = reconcile(&raw);

            match self.db.stock_items().put(&item).await {
                Ok(()) => summary.imported += 1,
                Err(e) => summary.skip(row, e),
            }
        }

        info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "Stock item import finished"
        );
        Ok(summary)
    }
}

// =============================================================================
// Format Helpers
// =============================================================================

/// Serializes records to CSV: header row, CRLF, strings quoted, numerics
/// bare, `"` doubled.
fn write_csv<S: Serialize>(records: &[S]) -> EngineResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    for record in records {
        writer
            .serialize(record)
            .map_err(|e| EngineError::internal(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| EngineError::internal(e.to_string()))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| EngineError::internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| EngineError::internal(e.to_string()))
}

/// Parses transfer text into loose record objects.
///
/// Both formats funnel into `serde_json::Value` maps so field extraction is
/// shared: JSON records keep their native types, CSV cells arrive as
/// strings keyed by the header row.
fn parse_records(data: &str, format: TransferFormat) -> EngineResult<Vec<Value>> {
    match format {
        TransferFormat::Json => {
            let value: Value = serde_json::from_str(data)
                .map_err(|e| EngineError::validation(format!("Invalid JSON: {}", e)))?;
            match value {
                Value::Array(items) => Ok(items),
                _ => Err(EngineError::validation(
                    "Invalid file format: expected an array of records",
                )),
            }
        }
        TransferFormat::Csv => {
            let mut reader = csv::ReaderBuilder::new()
                .flexible(true)
                .from_reader(data.as_bytes());
            let headers = reader
                .headers()
                .map_err(|e| EngineError::validation(format!("Invalid CSV: {}", e)))?
                .clone();

            let mut records = Vec::new();
            for row in reader.records() {
                let row = row.map_err(|e| EngineError::validation(format!("Invalid CSV: {}", e)))?;
                let mut map = serde_json::Map::new();
                for (i, header) in headers.iter().enumerate() {
                    if let Some(cell) = row.get(i) {
                        map.insert(header.to_string(), Value::String(cell.to_string()));
                    }
                }
                records.push(Value::Object(map));
            }
            Ok(records)
        }
    }
}

/// Extracts a non-empty string field; numbers are stringified.
fn string_field(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extracts a numeric field.
///
/// Absent, null, and empty-string fields are `None` (left for
/// reconciliation to derive); anything present but unparsable is `Some(0.0)`.
fn number_field(record: &Value, key: &str) -> Option<f64> {
    match record.get(key)? {
        Value::Null => None,
        Value::Number(n) => Some(n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0)),
        Value::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(parse_number_or_zero(s))
            }
        }
        _ => Some(0.0),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tally_db::DbConfig;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn product(id: &str, name: &str, price: f64) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            category: "Coffee".into(),
            price,
            description: format!("A {}", name),
        }
    }

    #[tokio::test]
    async fn test_product_csv_round_trip_is_stable() {
        let db = test_db().await;
        db.products().put(&product("p1", "Espresso", 2.8)).await.unwrap();
        db.products()
            .put(&product("p2", "Say \"when\"", 3.25))
            .await
            .unwrap();

        let service = TransferService::new(db);
        let first = service.export_products_csv().await.unwrap();

        // Parse our own output into a fresh store and export again.
        let other = TransferService::new(test_db().await);
        let summary = other
            .import_products(&first, TransferFormat::Csv)
            .await
            .unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 0);

        let second = other.export_products_csv().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_csv_shape() {
        let db = test_db().await;
        db.products()
            .put(&product("p1", "Say \"when\"", 3.5))
            .await
            .unwrap();

        let service = TransferService::new(db);
        let csv = service.export_products_csv().await.unwrap();

        // CRLF terminators, quoted strings, bare numerics, doubled quotes.
        assert!(csv.contains("\r\n"));
        assert!(csv.contains("\"Say \"\"when\"\"\""));
        assert!(csv.contains(",3.5,"));
    }

    #[tokio::test]
    async fn test_stock_item_csv_round_trip_is_stable() {
        let db = test_db().await;
        db.stock_items()
            .put(&StockItem {
                item_id: "beans".into(),
                description: "Arabica, \"single origin\"".into(),
                quantity: 2.5,
                sub_unit_count: 1000.0,
                unit_name: "gram".into(),
                total_units: 2500.0,
            })
            .await
            .unwrap();

        let service = TransferService::new(db);
        let first = service.export_stock_items_csv().await.unwrap();

        let other = TransferService::new(test_db().await);
        let summary = other
            .import_stock_items(&first, TransferFormat::Csv)
            .await
            .unwrap();
        assert_eq!(summary.imported, 1);

        let second = other.export_stock_items_csv().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let db = test_db().await;
        db.products().put(&product("p1", "Espresso", 2.8)).await.unwrap();

        let service = TransferService::new(db);
        let json = service.export_products_json().await.unwrap();

        let other = TransferService::new(test_db().await);
        let summary = other
            .import_products(&json, TransferFormat::Json)
            .await
            .unwrap();
        assert_eq!(summary.imported, 1);

        assert_eq!(other.export_products_json().await.unwrap(), json);
    }

    #[tokio::test]
    async fn test_import_skips_and_counts_invalid_products() {
        let service = TransferService::new(test_db().await);

        let data = r#"[
            {"id": "p1", "name": "Espresso", "category": "Coffee", "price": 2.8},
            {"name": "No Id", "price": 1.0},
            {"id": "p3", "price": 1.0},
            {"id": "p4", "name": "Bad Price", "price": "not-a-number"}
        ]"#;

        let summary = service
            .import_products(data, TransferFormat::Json)
            .await
            .unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.errors.len(), 2);
        assert!(summary.errors[0].starts_with("Row 2:"));
        assert!(summary.errors[1].starts_with("Row 3:"));

        // Unparsable price defaulted to 0, record still imported.
        let p4 = service
            .db
            .products()
            .get_by_id("p4")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p4.price, 0.0);
    }

    #[tokio::test]
    async fn test_import_normalizes_legacy_stock_items() {
        let service = TransferService::new(test_db().await);

        // Legacy shape: no sub-unit fields at all.
        let data = r#"[
            {"itemId": "milk", "description": "Whole milk", "quantity": 4},
            {"description": "keyless row"}
        ]"#;

        let summary = service
            .import_stock_items(data, TransferFormat::Json)
            .await
            .unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 1);

        let row = service
            .db
            .stock_items()
            .get_by_id("milk")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.sub_unit_count, Some(1.0));
        assert_eq!(row.unit_name.as_deref(), Some("unit"));
        assert_eq!(row.total_units, Some(4.0));
        assert_eq!(row.quantity, Some(4.0));
    }

    #[tokio::test]
    async fn test_non_array_json_is_rejected() {
        let service = TransferService::new(test_db().await);

        let err = service
            .import_products("{\"id\": \"p1\"}", TransferFormat::Json)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = service
            .import_products("not json at all", TransferFormat::Json)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(TransferFormat::from_extension("csv"), Some(TransferFormat::Csv));
        assert_eq!(TransferFormat::from_extension("JSON"), Some(TransferFormat::Json));
        assert_eq!(TransferFormat::from_extension("xlsx"), None);
    }

    #[test]
    fn test_field_extraction() {
        let record: Value = serde_json::json!({
            "id": "p1",
            "blank": "   ",
            "price": "3.5",
            "count": 7,
            "junk": "abc",
            "nothing": null
        });

        assert_eq!(string_field(&record, "id").as_deref(), Some("p1"));
        assert_eq!(string_field(&record, "blank"), None);
        assert_eq!(string_field(&record, "missing"), None);
        assert_eq!(string_field(&record, "count").as_deref(), Some("7"));

        assert_eq!(number_field(&record, "price"), Some(3.5));
        assert_eq!(number_field(&record, "count"), Some(7.0));
        assert_eq!(number_field(&record, "junk"), Some(0.0));
        assert_eq!(number_field(&record, "nothing"), None);
        assert_eq!(number_field(&record, "missing"), None);
    }
}
