use csv::{ReaderBuilder, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::app::ports::{CatalogTablesPort, TableRead, TableWritten};
use crate::config::PipelineConfig;
use crate::domain::{ConsolidatedItem, MatchedItem, NormalizedItem, CONSOLIDATED_HEADER, NORMALIZED_HEADER};
use crate::error::{CatalogError, Result};

/// Serialize rows under an explicit header. The header is written even
/// when there are no rows.
pub fn encode_table<T: Serialize>(header: &[&str], rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| CatalogError::Io(e.into_error()))
}

/// Deserialize rows by header name, skipping rows that do not fit `T`.
pub fn decode_table<T: DeserializeOwned>(bytes: &[u8]) -> (Vec<T>, usize) {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    let mut malformed = 0;
    for (line, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                debug!(line = line + 2, error = %e, "skipping malformed row");
                malformed += 1;
            }
        }
    }
    (rows, malformed)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Read a table from disk. A missing file is an empty table.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<TableRead<T>> {
    if !path.exists() {
        warn!(path = %path.display(), "table not found, treating as empty");
        return Ok(TableRead::empty_missing());
    }

    let bytes = fs::read(path)?;
    let (rows, malformed) = decode_table(&bytes);
    if malformed > 0 {
        warn!(path = %path.display(), malformed, "skipped malformed rows");
    }
    Ok(TableRead {
        rows,
        malformed,
        missing: false,
    })
}

/// Write a table through a temp file in the target directory, then rename
/// it into place.
pub fn write_table<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<TableWritten> {
    let bytes = encode_table(header, rows)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let output_error = |message: String| CatalogError::OutputWrite {
        path: path.to_path_buf(),
        message,
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| output_error(e.to_string()))?;
    tmp.write_all(&bytes).map_err(|e| output_error(e.to_string()))?;
    tmp.as_file().sync_all().map_err(|e| output_error(e.to_string()))?;
    tmp.persist(path).map_err(|e| output_error(e.error.to_string()))?;

    let sha256 = sha256_hex(&bytes);
    info!(path = %path.display(), rows = rows.len(), sha256 = %sha256, "table written");
    Ok(TableWritten {
        path: path.to_path_buf(),
        rows: rows.len(),
        sha256,
    })
}

/// CSV files in the pipeline data directory
#[derive(Debug, Clone)]
pub struct CsvTablesAdapter {
    config: PipelineConfig,
}

impl CsvTablesAdapter {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }
}

impl CatalogTablesPort for CsvTablesAdapter {
    fn read_consolidated(&self) -> Result<TableRead<ConsolidatedItem>> {
        read_table(&self.config.consolidated_path())
    }

    fn write_consolidated(&self, rows: &[ConsolidatedItem]) -> Result<TableWritten> {
        write_table(&self.config.consolidated_path(), &CONSOLIDATED_HEADER, rows)
    }

    fn read_normalized(&self) -> Result<TableRead<NormalizedItem>> {
        read_table(&self.config.normalized_path())
    }

    fn write_normalized(&self, rows: &[NormalizedItem]) -> Result<TableWritten> {
        write_table(&self.config.normalized_path(), &NORMALIZED_HEADER, rows)
    }

    fn write_matched(&self, rows: &[MatchedItem]) -> Result<TableWritten> {
        write_table(&self.config.matched_path(), &NORMALIZED_HEADER, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Price;
    use tempfile::TempDir;

    fn consolidated(id: u64, name: &str, cents: u64, store: &str) -> ConsolidatedItem {
        ConsolidatedItem {
            id,
            name: name.to_string(),
            price: Price::from_cents(cents),
            store: store.to_string(),
            brand: None,
            net_quantity: None,
            unit_of_measure: None,
            category: None,
        }
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvTablesAdapter::new(PipelineConfig::new(dir.path()));

        let written = adapter.write_consolidated(&[]).unwrap();
        assert_eq!(written.rows, 0);

        let content = fs::read_to_string(&written.path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["id,name,price,store,brand,net_quantity,unit_of_measure,category"]);
    }

    #[test]
    fn test_written_rows_read_back() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvTablesAdapter::new(PipelineConfig::new(dir.path()));
        let mut row = consolidated(1, "Sok, jabuka", 129, "lidl");
        row.brand = Some("Juicy".to_string());

        adapter.write_consolidated(&[row.clone()]).unwrap();
        let content = fs::read_to_string(dir.path().join("consolidated_items.csv")).unwrap();
        assert!(content.contains("1,\"Sok, jabuka\",1.29,lidl,Juicy,,,"));

        let read = adapter.read_consolidated().unwrap();
        assert_eq!(read.rows, vec![row]);
        assert_eq!(read.malformed, 0);
        assert!(!read.missing);
    }

    #[test]
    fn test_legacy_four_column_table_is_readable() {
        let (rows, malformed) =
            decode_table::<ConsolidatedItem>(b"id,name,price,store\n1,Mlijeko 1L,6.99,spar\nx,Bad,1.00,spar\n");
        assert_eq!(malformed, 1);
        assert_eq!(rows, vec![consolidated(1, "Mlijeko 1L", 699, "spar")]);
    }

    #[test]
    fn test_missing_table_is_empty() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvTablesAdapter::new(PipelineConfig::new(dir.path()));
        let read = adapter.read_normalized().unwrap();
        assert!(read.missing);
        assert!(read.rows.is_empty());
    }

    #[test]
    fn test_digest_matches_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("t.csv");
        let written = write_table(&path, &["id", "name"], &[(1u64, "a")]).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(written.sha256, sha256_hex(&bytes));
        assert_eq!(written.sha256.len(), 64);
    }
}
