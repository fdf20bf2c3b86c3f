use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use crate::application::{AppError, ChartKind, DashboardService};
use crate::domain::{format_cents, format_entry_date, Entry, EntryId, EntryType};
use crate::io::{DEFAULT_CSV_FILENAME, DEFAULT_JSON_FILENAME};

/// Spendboard - Income and Expense Dashboard
#[derive(Parser)]
#[command(name = "spendboard")]
#[command(about = "Record income and expenses and summarize them")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "SPENDBOARD_DB", default_value = "spendboard.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and the entries table
    Init,

    /// Record a new income or expense
    Add {
        /// Label of the entry (e.g., "Salary", "Rent")
        name: String,

        /// Amount (e.g., "1000" or "12.50")
        value: String,

        /// Date of the entry (MM.DD.YYYY, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Entry type: income, expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        entry_type: String,
    },

    /// Remove an entry by id
    Remove {
        /// Entry id
        id: EntryId,
    },

    /// List all entries
    List {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show revenue, spent and saved totals
    Summary {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Produce the series behind a chart
    Chart {
        /// Chart: daily, balance, breakdown
        kind: String,

        /// Entry type for the breakdown chart: income, expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        entry_type: String,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Print the whole analysis panel as JSON
    Report,

    /// Export all entries to CSV or JSON
    Export {
        /// Output file (stdout if omitted; entries.csv or entries.json if
        /// given without a name)
        #[arg(short, long, num_args = 0..=1)]
        output: Option<Option<String>>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },

    /// Import entries from a CSV file
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate without importing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the rows of a CSV file without storing them
    Preview {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Delete every entry
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence;
/// otherwise `--verbose` raises this crate's level from warn to info.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "spendboard=info" } else { "spendboard=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            // Previewing only reads the CSV; the database is left untouched.
            Commands::Preview { input } => run_preview_command(input.as_deref()),
            command => {
                let service = open_service(&self.database).await?;
                run_store_command(&service, &self.database, command).await
            }
        }
    }
}

/// Open (and create if needed) the store. Failing here aborts the process.
async fn open_service(database: &str) -> Result<DashboardService> {
    DashboardService::init(database)
        .await
        .with_context(|| format!("Failed to open database: {}", database))
}

async fn run_store_command(
    service: &DashboardService,
    database: &str,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Init => {
            println!("Database initialized: {}", database);
        }

        Commands::Add {
            name,
            value,
            date,
            entry_type,
        } => {
            let date = date.unwrap_or_else(|| format_entry_date(Local::now().date_naive()));
            match service.add_entry(&name, &date, &entry_type, &value).await {
                Ok(entry) => println!(
                    "You added {}: {} {} on {} (id {})",
                    entry.name,
                    entry.entry_type,
                    format_cents(entry.value),
                    entry.date_text(),
                    entry.id
                ),
                Err(AppError::MissingField(field)) => {
                    println!("Missing at least one argument for the entry: {}", field);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Remove { id } => {
            if service.remove_entry(id).await? {
                println!("Removed entry {}", id);
            } else {
                println!("No entry with id {}", id);
            }
        }

        Commands::List { format } => {
            let entries = service.list_entries().await?;
            print_entries(&entries, &format)?;
        }

        Commands::Summary { format } => {
            let summary = service.summary().await?;
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                "csv" => {
                    println!("revenue,spent,saved,count");
                    println!(
                        "{},{},{},{}",
                        format_cents(summary.revenue),
                        format_cents(summary.spent),
                        format_cents(summary.saved),
                        summary.count
                    );
                }
                _ => {
                    println!("Summary ({} entries)", summary.count);
                    println!("{}", "-".repeat(30));
                    println!("{:<12} {:>17}", "Revenue", format_cents(summary.revenue));
                    println!("{:<12} {:>17}", "Spent", format_cents(summary.spent));
                    println!("{:<12} {:>17}", "Saved", format_cents(summary.saved));
                }
            }
        }

        Commands::Chart {
            kind,
            entry_type,
            format,
        } => {
            let kind: ChartKind = kind
                .parse()
                .map_err(|e| anyhow::anyhow!("{}. Valid charts: daily, balance, breakdown", e))?;
            run_chart_command(service, kind, &entry_type, &format).await?;
        }

        Commands::Report => {
            let report = service.dashboard_report().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Export { output, format } => {
            let path = export_path(output, &format);
            run_export_command(service, path.as_deref(), &format).await?;
        }

        Commands::Import { input, dry_run } => {
            run_import_command(service, input.as_deref(), dry_run).await?;
        }

        Commands::Preview { input } => run_preview_command(input.as_deref())?,

        Commands::Reset { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete all entries without --yes");
            }
            let removed = service.reset().await?;
            println!("Deleted {} entries", removed);
        }
    }

    Ok(())
}

async fn run_chart_command(
    service: &DashboardService,
    kind: ChartKind,
    entry_type: &str,
    format: &str,
) -> Result<()> {
    match kind {
        ChartKind::Daily => {
            let days = service.daily_totals().await?;
            match format {
                "json" => println!("{}", serde_json::to_string_pretty(&days)?),
                "csv" => {
                    println!("date,income,expense,net");
                    for day in &days {
                        println!(
                            "{},{},{},{}",
                            format_entry_date(day.date),
                            format_cents(day.income),
                            format_cents(day.expense),
                            format_cents(day.net)
                        );
                    }
                }
                _ => {
                    println!("{:<12} {:>12} {:>12} {:>12}", "DATE", "INCOME", "EXPENSE", "NET");
                    println!("{}", "-".repeat(51));
                    for day in &days {
                        println!(
                            "{:<12} {:>12} {:>12} {:>12}",
                            format_entry_date(day.date),
                            format_cents(day.income),
                            format_cents(day.expense),
                            format_cents(day.net)
                        );
                    }
                }
            }
        }

        ChartKind::Balance => {
            let points = service.cumulative_balance().await?;
            match format {
                "json" => println!("{}", serde_json::to_string_pretty(&points)?),
                "csv" => {
                    println!("date,balance");
                    for point in &points {
                        println!(
                            "{},{}",
                            format_entry_date(point.date),
                            format_cents(point.balance)
                        );
                    }
                }
                _ => {
                    println!("{:<12} {:>14}", "DATE", "BALANCE");
                    println!("{}", "-".repeat(27));
                    for point in &points {
                        println!(
                            "{:<12} {:>14}",
                            format_entry_date(point.date),
                            format_cents(point.balance)
                        );
                    }
                }
            }
        }

        ChartKind::Breakdown => {
            let entry_type = EntryType::from_str(entry_type).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid entry type '{}'. Valid types: income, expense",
                    entry_type
                )
            })?;
            let shares = service.breakdown(entry_type).await?;
            match format {
                "json" => println!("{}", serde_json::to_string_pretty(&shares)?),
                "csv" => {
                    println!("name,total,count,percentage");
                    for share in &shares {
                        println!(
                            "{},{},{},{:.2}",
                            share.name,
                            format_cents(share.total),
                            share.count,
                            share.percentage
                        );
                    }
                }
                _ => {
                    if shares.is_empty() {
                        println!("No {} entries.", entry_type);
                        return Ok(());
                    }
                    println!("{:<25} {:>12} {:>6} {:>8}", "NAME", "TOTAL", "COUNT", "SHARE");
                    println!("{}", "-".repeat(54));
                    for share in &shares {
                        println!(
                            "{:<25} {:>12} {:>6} {:>7.1}%",
                            truncate(&share.name, 25),
                            format_cents(share.total),
                            share.count,
                            share.percentage
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

/// Resolve `-o`: absent writes to stdout, a bare `-o` picks the default
/// file name for the format.
fn export_path(output: Option<Option<String>>, format: &str) -> Option<String> {
    output.map(|path| {
        path.unwrap_or_else(|| match format {
            "json" => DEFAULT_JSON_FILENAME.to_string(),
            _ => DEFAULT_CSV_FILENAME.to_string(),
        })
    })
}

async fn run_export_command(
    service: &DashboardService,
    output: Option<&str>,
    format: &str,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match format {
        "csv" => {
            let count = exporter.export_entries_csv(writer).await?;
            if let Some(path) = output {
                eprintln!("Exported {} entries to {}", count, path);
            }
        }
        "json" => {
            let snapshot = exporter.export_entries_json(writer).await?;
            if let Some(path) = output {
                eprintln!("Exported {} entries to {}", snapshot.entries.len(), path);
            }
        }
        _ => {
            anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format);
        }
    }

    Ok(())
}

async fn run_import_command(
    service: &DashboardService,
    input: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};

    let importer = Importer::new(service);
    let reader = open_input(input)?;

    let result = importer
        .import_entries_csv(reader, ImportOptions { dry_run })
        .await?;

    if dry_run {
        println!("Dry run: {} entries would be imported", result.imported);
    } else {
        println!("Imported {} entries", result.imported);
    }
    print_import_errors(&result.errors);

    Ok(())
}

fn run_preview_command(input: Option<&str>) -> Result<()> {
    let reader = open_input(input)?;
    let parsed = crate::io::read_entries_csv(reader)?;
    // Nothing is stored, so the source line stands in for the id.
    let rows: Vec<Entry> = parsed
        .entries
        .into_iter()
        .map(|row| Entry::from_new(row.line as EntryId, row.entry))
        .collect();
    print_entries(&rows, "table")?;
    print_import_errors(&parsed.errors);
    Ok(())
}

fn open_input(input: Option<&str>) -> Result<Box<dyn std::io::Read>> {
    use std::fs::File;
    use std::io::stdin;

    Ok(match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    })
}

fn print_import_errors(errors: &[crate::io::ImportError]) {
    if errors.is_empty() {
        return;
    }
    eprintln!("{} rows skipped:", errors.len());
    for error in errors {
        match &error.field {
            Some(field) => eprintln!("  line {} ({}): {}", error.line, field, error.error),
            None => eprintln!("  line {}: {}", error.line, error.error),
        }
    }
}

fn print_entries(entries: &[Entry], format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(entries)?),
        "csv" => {
            crate::io::write_entries_csv(entries, std::io::stdout())?;
        }
        _ => {
            if entries.is_empty() {
                println!("No entries found.");
                return Ok(());
            }
            println!(
                "{:>6}  {:<25} {:<10} {:<8} {:>12}",
                "ID", "NAME", "DATE", "TYPE", "VALUE"
            );
            println!("{}", "-".repeat(66));
            for entry in entries {
                println!(
                    "{:>6}  {:<25} {:<10} {:<8} {:>12}",
                    entry.id,
                    truncate(&entry.name, 25),
                    entry.date_text(),
                    entry.entry_type.as_str(),
                    format_cents(entry.value)
                );
            }
        }
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Rent", 10), "Rent");
        assert_eq!(truncate("Groceries and household", 10), "Groceri...");
        assert_eq!(truncate("Café crème brûlée", 8), "Café ...");
    }

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "spendboard", "-d", "x.db", "add", "Salary", "1000", "--type", "income", "--date",
            "01.01.2024",
        ])
        .unwrap();
        assert_eq!(cli.database, "x.db");
        match cli.command {
            Commands::Add {
                name,
                value,
                date,
                entry_type,
            } => {
                assert_eq!(name, "Salary");
                assert_eq!(value, "1000");
                assert_eq!(date.as_deref(), Some("01.01.2024"));
                assert_eq!(entry_type, "income");
            }
            _ => panic!("expected add command"),
        }
    }

    fn parse_export(args: &[&str]) -> Option<String> {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Export { output, format } => export_path(output, &format),
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn test_export_output_defaults_to_fixed_filename() {
        assert_eq!(
            parse_export(&["spendboard", "-d", "x.db", "export", "-o"]).as_deref(),
            Some(DEFAULT_CSV_FILENAME)
        );
        assert_eq!(parse_export(&["spendboard", "-d", "x.db", "export"]), None);
        assert_eq!(
            parse_export(&["spendboard", "export", "-o", "march.csv"]).as_deref(),
            Some("march.csv")
        );
    }

    #[test]
    fn test_json_export_default_filename_follows_format() {
        assert_eq!(
            parse_export(&["spendboard", "export", "-o", "--format", "json"]).as_deref(),
            Some(DEFAULT_JSON_FILENAME)
        );
        assert_eq!(
            parse_export(&["spendboard", "export", "--format", "json", "-o"]).as_deref(),
            Some(DEFAULT_JSON_FILENAME)
        );
        assert_eq!(
            parse_export(&["spendboard", "export", "-f", "json", "-o", "dump.json"]).as_deref(),
            Some("dump.json")
        );
    }

    #[tokio::test]
    async fn test_add_with_missing_name_is_informational() {
        let temp = tempfile::TempDir::new().unwrap();
        let db = temp.path().join("board.db");
        let db = db.to_str().unwrap();

        let cli = Cli::try_parse_from(["spendboard", "-d", db, "add", "", "10"]).unwrap();
        assert!(cli.run().await.is_ok());

        let cli = Cli::try_parse_from(["spendboard", "-d", db, "add", "Rent", " "]).unwrap();
        assert!(cli.run().await.is_ok());

        let service = DashboardService::init(db).await.unwrap();
        assert!(service.list_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_with_invalid_value_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let db = temp.path().join("board.db");
        let db = db.to_str().unwrap();

        let cli = Cli::try_parse_from(["spendboard", "-d", db, "add", "Rent", "ten"]).unwrap();
        assert!(cli.run().await.is_err());

        let service = DashboardService::init(db).await.unwrap();
        assert!(service.list_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_a_no_op() {
        let temp = tempfile::TempDir::new().unwrap();
        let db = temp.path().join("board.db");
        let db = db.to_str().unwrap();

        let service = DashboardService::init(db).await.unwrap();
        let kept = service
            .add_entry("Salary", "01.01.2024", "income", "1000")
            .await
            .unwrap();

        let cli = Cli::try_parse_from(["spendboard", "-d", db, "remove", "42"]).unwrap();
        assert!(cli.run().await.is_ok());

        let entries = service.list_entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, kept.id);
    }

    #[tokio::test]
    async fn test_preview_does_not_create_database() {
        let temp = tempfile::TempDir::new().unwrap();
        let csv = temp.path().join("march.csv");
        std::fs::write(
            &csv,
            "Name,Date,Type,Value\nSalary,01.01.2024,income,1000\nRent,01.02.2024,loan,400\n",
        )
        .unwrap();
        // The directory does not exist, so opening a store here would fail.
        let db = temp.path().join("missing").join("preview.db");

        let cli = Cli::try_parse_from([
            "spendboard",
            "-d",
            db.to_str().unwrap(),
            "preview",
            "-i",
            csv.to_str().unwrap(),
        ])
        .unwrap();
        assert!(cli.run().await.is_ok());
        assert!(!db.exists());
    }
}
