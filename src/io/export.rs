use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::DashboardService;
use crate::domain::{format_cents, Entry};

/// File name offered when the entry set is downloaded as CSV.
pub const DEFAULT_CSV_FILENAME: &str = "entries.csv";

/// File name used for a JSON snapshot exported without an explicit path.
pub const DEFAULT_JSON_FILENAME: &str = "entries.json";

/// Column headers of the CSV export, matching the table columns.
pub const CSV_HEADERS: [&str; 5] = ["id", "Name", "Date", "Type", "Value"];

/// Snapshot of the whole store for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntriesSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub entries: Vec<Entry>,
}

/// Exporter for converting the stored entries to files
pub struct Exporter<'a> {
    service: &'a DashboardService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a DashboardService) -> Self {
        Self { service }
    }

    /// Export all entries to CSV. Returns the number of rows written.
    pub async fn export_entries_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let entries = self.service.list_entries().await?;
        write_entries_csv(&entries, writer)
    }

    /// Export all entries as a JSON snapshot
    pub async fn export_entries_json<W: Write>(&self, mut writer: W) -> Result<EntriesSnapshot> {
        let entries = self.service.list_entries().await?;

        let snapshot = EntriesSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            entries,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

/// Write entries as UTF-8 CSV with a header row.
pub fn write_entries_csv<W: Write>(entries: &[Entry], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADERS)?;

    for entry in entries {
        csv_writer.write_record(&[
            entry.id.to_string(),
            entry.name.clone(),
            entry.date_text(),
            entry.entry_type.as_str().to_string(),
            format_cents(entry.value),
        ])?;
    }

    csv_writer.flush()?;
    Ok(entries.len())
}

/// Render entries to an in-memory CSV document.
pub fn entries_to_csv(entries: &[Entry]) -> Result<String> {
    let mut buffer = Vec::new();
    write_entries_csv(entries, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{parse_entry_date, EntryType, NewEntry};

    #[test]
    fn test_csv_layout() {
        let date = parse_entry_date("01.02.2024").unwrap();
        let entries = vec![
            Entry::from_new(1, NewEntry::new("Rent, flat", date, EntryType::Expense, 40000)),
            Entry::from_new(3, NewEntry::new("Salary", date, EntryType::Income, 125)),
        ];

        let csv = entries_to_csv(&entries).unwrap();
        assert_eq!(
            csv,
            "id,Name,Date,Type,Value\n\
             1,\"Rent, flat\",01.02.2024,expense,400.00\n\
             3,Salary,01.02.2024,income,1.25\n"
        );
    }

    #[test]
    fn test_empty_export_has_header_only() {
        assert_eq!(entries_to_csv(&[]).unwrap(), "id,Name,Date,Type,Value\n");
    }
}
