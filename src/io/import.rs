use anyhow::Result;
use std::io::Read;

use crate::application::{validate_entry, AppError, DashboardService};
use crate::domain::NewEntry;

/// Rows parsed from a CSV document, with the lines that failed.
#[derive(Debug, Clone, Default)]
pub struct ParsedEntries {
    pub entries: Vec<ParsedRow>,
    pub errors: Vec<ImportError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub line: usize,
    pub entry: NewEntry,
}

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred on one CSV line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Parse and validate without writing anything
    pub dry_run: bool,
}

/// Importer for loading entries from CSV into the store
pub struct Importer<'a> {
    service: &'a DashboardService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a DashboardService) -> Self {
        Self { service }
    }

    /// Import entries from CSV. Every valid row becomes a new entry with a
    /// fresh id; any `id` column in the file is ignored.
    pub async fn import_entries_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let parsed = read_entries_csv(reader)?;
        let mut errors = parsed.errors;
        let mut imported = 0;

        for row in parsed.entries {
            if options.dry_run {
                imported += 1;
                continue;
            }

            match self.service.add_new_entry(row.entry).await {
                Ok(_) => imported += 1,
                Err(e) => errors.push(ImportError {
                    line: row.line,
                    field: None,
                    error: format!("Insert failed: {}", e),
                }),
            }
        }

        for error in &errors {
            tracing::warn!(line = error.line, error = %error.error, "skipped import row");
        }
        tracing::info!(imported, failed = errors.len(), dry_run = options.dry_run, "import finished");

        Ok(ImportResult { imported, errors })
    }
}

struct Columns {
    name: usize,
    date: usize,
    entry_type: usize,
    value: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
                .ok_or_else(|| anyhow::anyhow!("CSV is missing the '{}' column", wanted))
        };

        Ok(Self {
            name: find("name")?,
            date: find("date")?,
            entry_type: find("type")?,
            value: find("value")?,
        })
    }
}

/// Parse a CSV document into validated entries without touching the store.
///
/// Columns are looked up by header name, case-insensitively, so files
/// written by [`super::write_entries_csv`] and hand-made sheets both work.
/// A missing column fails the whole document; a bad row only fails itself.
pub fn read_entries_csv<R: Read>(reader: R) -> Result<ParsedEntries> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = Columns::locate(csv_reader.headers()?)?;
    let mut parsed = ParsedEntries::default();

    for (index, result) in csv_reader.records().enumerate() {
        // Quoted fields may span lines, so the reader's position is the
        // source of truth. The header is line 1.
        let fallback_line = index + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                parsed.errors.push(ImportError {
                    line: e
                        .position()
                        .map_or(fallback_line, |p| p.line() as usize),
                    field: None,
                    error: format!("CSV parse error: {}", e),
                });
                continue;
            }
        };

        let line = record
            .position()
            .map_or(fallback_line, |p| p.line() as usize);

        let name = record.get(columns.name).unwrap_or("");
        let date = record.get(columns.date).unwrap_or("");
        let entry_type = record.get(columns.entry_type).unwrap_or("");
        let value = record.get(columns.value).unwrap_or("");

        match validate_entry(name, date, entry_type, value) {
            Ok(entry) => parsed.entries.push(ParsedRow { line, entry }),
            Err(e) => parsed.errors.push(ImportError {
                line,
                field: field_of(&e).map(str::to_string),
                error: e.to_string(),
            }),
        }
    }

    Ok(parsed)
}

fn field_of(error: &AppError) -> Option<&'static str> {
    match error {
        AppError::MissingField(field) => Some(*field),
        AppError::InvalidDate(_) => Some("date"),
        AppError::InvalidEntryType(_) => Some("type"),
        AppError::InvalidValue { .. } => Some("value"),
        AppError::TotalOverflow(_) | AppError::Database(_) => None,
    }
}
