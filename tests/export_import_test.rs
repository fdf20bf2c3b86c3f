mod common;

use anyhow::Result;
use common::{test_service, SampleMonth};
use spendboard::domain::NewEntry;
use spendboard::io::{read_entries_csv, EntriesSnapshot, Exporter, ImportOptions, Importer};

fn tuples(mut entries: Vec<NewEntry>) -> Vec<NewEntry> {
    entries.sort_by(|a, b| {
        (a.date, &a.name, a.entry_type, a.value).cmp(&(b.date, &b.name, b.entry_type, b.value))
    });
    entries
}

#[tokio::test]
async fn test_csv_export_round_trip() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleMonth::create_detailed(&service).await?;
    service
        .add_entry("Dinner, \"fancy\" place", "02.14.2024", "expense", "0.99")
        .await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service).export_entries_csv(&mut buffer).await?;
    assert_eq!(count, 7);

    let parsed = read_entries_csv(buffer.as_slice())?;
    assert!(parsed.errors.is_empty());

    let stored: Vec<NewEntry> = service.list_entries().await?.iter().map(|e| e.to_new()).collect();
    let reparsed: Vec<NewEntry> = parsed.entries.into_iter().map(|row| row.entry).collect();
    assert_eq!(tuples(reparsed), tuples(stored));

    Ok(())
}

#[tokio::test]
async fn test_import_into_fresh_store() -> Result<()> {
    let (source, _source_temp) = test_service().await?;
    SampleMonth::create_detailed(&source).await?;
    let mut buffer = Vec::new();
    Exporter::new(&source).export_entries_csv(&mut buffer).await?;

    let (target, _target_temp) = test_service().await?;
    target.add_entry("Existing", "01.01.2024", "income", "5").await?;

    let result = Importer::new(&target)
        .import_entries_csv(buffer.as_slice(), ImportOptions::default())
        .await?;
    assert_eq!(result.imported, 6);
    assert!(result.errors.is_empty());

    let entries = target.list_entries().await?;
    assert_eq!(entries.len(), 7);
    // Imported rows get new ids after the existing one
    assert_eq!(entries[0].name, "Existing");
    assert!(entries[1..].iter().all(|e| e.id > entries[0].id));

    assert_eq!(target.summary().await?.spent, source.summary().await?.spent);

    Ok(())
}

#[tokio::test]
async fn test_import_dry_run_stores_nothing() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let data = "Name,Date,Type,Value\nSalary,01.01.2024,income,1000\nBroken,99.99.2024,income,1\n";
    let result = Importer::new(&service)
        .import_entries_csv(data.as_bytes(), ImportOptions { dry_run: true })
        .await?;

    assert_eq!(result.imported, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 3);
    assert!(service.list_entries().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_import_keeps_going_past_bad_rows() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let data = "Name,Date,Type,Value\nSalary,01.01.2024,income,1000\nRent,01.02.2024,expense,-400\nFood,01.03.2024,expense,20\n";
    let result = Importer::new(&service)
        .import_entries_csv(data.as_bytes(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field.as_deref(), Some("value"));
    assert_eq!(service.profit().await?, 98000);

    Ok(())
}

#[tokio::test]
async fn test_json_export_snapshot() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleMonth::create_basic(&service).await?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(&service).export_entries_json(&mut buffer).await?;
    assert_eq!(snapshot.entries.len(), 2);

    let decoded: EntriesSnapshot = serde_json::from_slice(&buffer)?;
    assert_eq!(decoded.entries, snapshot.entries);
    assert_eq!(decoded.version, env!("CARGO_PKG_VERSION"));

    let raw: serde_json::Value = serde_json::from_slice(&buffer)?;
    assert_eq!(raw["entries"][0]["type"], "income");
    assert_eq!(raw["entries"][1]["date"], "2024-01-02");

    Ok(())
}
