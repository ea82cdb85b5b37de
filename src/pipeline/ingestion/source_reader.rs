use csv::{ReaderBuilder, StringRecord};
use encoding_rs::{Encoding, UTF_8};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::{ColumnMap, StoreProfile};
use crate::domain::RawRecord;
use crate::error::SourceError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Outcome of reading one store export
#[derive(Debug, Clone)]
pub struct SourceRead {
    pub records: Vec<RawRecord>,
    /// Canonical name of the encoding that decoded the file
    pub encoding: &'static str,
    /// Data rows dropped for being empty or too short
    pub rows_skipped: usize,
}

/// Decodes one store export into raw records according to its profile.
pub struct SourceReader<'a> {
    profile: &'a StoreProfile,
}

impl<'a> SourceReader<'a> {
    pub fn new(profile: &'a StoreProfile) -> Self {
        Self { profile }
    }

    fn quote_char(&self) -> char {
        self.profile.quote.unwrap_or('"')
    }

    /// Read and decode the export at `path`.
    ///
    /// Any error means the whole store contributes nothing; malformed rows
    /// are dropped individually and only counted.
    pub fn read(&self, path: &Path) -> Result<SourceRead, SourceError> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SourceError::Unavailable(path.to_path_buf()),
            _ => SourceError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;

        let (content, encoding) = self.decode(path, &bytes)?;
        debug!(store = %self.profile.store, encoding, "decoded export");

        let rows = self.parse_rows(path, &content)?;
        let header_lines = self.profile.header_lines.min(rows.len());
        let columns = self.resolve_columns(path, rows.first().filter(|_| header_lines > 0))?;

        let mut records = Vec::new();
        let mut rows_skipped = 0;
        for row in &rows[header_lines..] {
            match self.extract(row, &columns) {
                Some(record) => records.push(record),
                None => rows_skipped += 1,
            }
        }

        Ok(SourceRead {
            records,
            encoding,
            rows_skipped,
        })
    }

    /// Try each candidate encoding in order; the first one that decodes
    /// without replacement characters wins.
    fn decode(&self, path: &Path, bytes: &[u8]) -> Result<(String, &'static str), SourceError> {
        let mut tried = Vec::new();

        for label in &self.profile.encodings {
            tried.push(label.clone());
            let encoding = match Encoding::for_label(label.trim().as_bytes()) {
                Some(encoding) => encoding,
                None => {
                    warn!(store = %self.profile.store, label = %label, "unknown encoding label, skipping");
                    continue;
                }
            };

            let input = if encoding == UTF_8 {
                bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
            } else {
                bytes
            };

            match encoding.decode_without_bom_handling_and_without_replacement(input) {
                Some(text) => return Ok((text.into_owned(), encoding.name())),
                None => debug!(store = %self.profile.store, encoding = encoding.name(), "decode failed, trying next"),
            }
        }

        Err(SourceError::Decode {
            path: path.to_path_buf(),
            tried: tried.join(", "),
        })
    }

    fn parse_rows(&self, path: &Path, content: &str) -> Result<Vec<StringRecord>, SourceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.profile.delimiter as u8)
            .quote(self.quote_char() as u8)
            .from_reader(content.as_bytes());

        reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SourceError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Check configured header labels against the file's header row,
    /// realigning columns that moved.
    fn resolve_columns(&self, path: &Path, header: Option<&StringRecord>) -> Result<ColumnMap, SourceError> {
        let mut columns = self.profile.columns.clone();
        let labels = &self.profile.header_labels;
        let header = match header {
            Some(header) if !labels.is_empty() => header,
            _ => return Ok(columns),
        };

        let cells: Vec<String> = header
            .iter()
            .map(|cell| self.clean(cell).to_lowercase())
            .collect();
        let locate = |label: &str| cells.iter().position(|c| c == &label.trim().to_lowercase());

        for (field, label) in [("name", &labels.name), ("price", &labels.price)] {
            let Some(label) = label else { continue };
            let index = locate(label).ok_or_else(|| SourceError::HeaderMismatch {
                path: path.to_path_buf(),
                field,
                label: label.clone(),
            })?;
            let slot = if field == "name" { &mut columns.name } else { &mut columns.price };
            if *slot != index {
                warn!(store = %self.profile.store, field, configured = *slot, found = index, "column moved, realigning");
                *slot = index;
            }
        }

        let optional = [
            ("brand", &labels.brand, &mut columns.brand),
            ("net_quantity", &labels.net_quantity, &mut columns.net_quantity),
            ("unit_of_measure", &labels.unit_of_measure, &mut columns.unit_of_measure),
            ("category", &labels.category, &mut columns.category),
        ];
        for (field, label, slot) in optional {
            let Some(label) = label else { continue };
            match locate(label) {
                Some(index) if *slot != Some(index) => {
                    warn!(store = %self.profile.store, field, found = index, "column moved, realigning");
                    *slot = Some(index);
                }
                Some(_) => {}
                None => {
                    warn!(store = %self.profile.store, field, label = %label, "labelled column missing, ignoring field");
                    *slot = None;
                }
            }
        }

        Ok(columns)
    }

    fn clean<'r>(&self, value: &'r str) -> &'r str {
        value.trim().trim_matches(self.quote_char()).trim()
    }

    fn optional(&self, row: &StringRecord, index: Option<usize>) -> Option<String> {
        index
            .and_then(|i| row.get(i))
            .map(|v| self.clean(v))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn extract(&self, row: &StringRecord, columns: &ColumnMap) -> Option<RawRecord> {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            return None;
        }
        if row.len() <= columns.max_index() {
            debug!(store = %self.profile.store, columns = row.len(), "row too short, dropping");
            return None;
        }

        Some(RawRecord {
            store: self.profile.store.clone(),
            name: self.clean(row.get(columns.name)?).to_string(),
            price: row.get(columns.price)?.trim().to_string(),
            brand: self.optional(row, columns.brand),
            net_quantity: self.optional(row, columns.net_quantity),
            unit_of_measure: self.optional(row, columns.unit_of_measure),
            category: self.optional(row, columns.category),
        })
    }
}
