use chrono::Utc;

use crate::domain::{
    breakdown, cumulative_balance, daily_totals, parse_cents, parse_entry_date, profit,
    BalancePoint, Cents, DailyTotal, Entry, EntryId, EntryType, NameShare, NewEntry, Summary,
};
use crate::storage::EntryStore;

use super::{AppError, DashboardReport};

/// Application service behind the dashboard.
/// This is the primary interface for any front end (CLI, web page, TUI, ...).
///
/// Aggregates are recomputed from the store on every call; nothing is cached
/// between renders.
pub struct DashboardService {
    store: EntryStore,
}

impl DashboardService {
    /// Create a new service with the given store.
    pub fn new(store: EntryStore) -> Self {
        Self { store }
    }

    /// Open the database at the given path, creating the file and the
    /// entries table if they don't exist.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let store = EntryStore::open(&db_url).await?;
        tracing::info!(database = database_path, "store initialized");
        Ok(Self::new(store))
    }

    /// Connect to an existing database without creating it.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let store = EntryStore::connect(&db_url).await?;
        store.initialize().await?;
        Ok(Self::new(store))
    }

    // ========================
    // Entry operations
    // ========================

    /// Record an entry from raw form input.
    ///
    /// `name` and `value` are required. `date` must be `MM.DD.YYYY` and
    /// `entry_type` one of income/expense; `value` a non-negative decimal.
    pub async fn add_entry(
        &self,
        name: &str,
        date: &str,
        entry_type: &str,
        value: &str,
    ) -> Result<Entry, AppError> {
        let new = validate_entry(name, date, entry_type, value)?;
        self.add_new_entry(new).await
    }

    /// Record an already validated entry.
    pub async fn add_new_entry(&self, new: NewEntry) -> Result<Entry, AppError> {
        let id = self.store.insert(&new).await?;
        tracing::info!(id, name = %new.name, entry_type = %new.entry_type, value = new.value, "recorded entry");
        Ok(Entry::from_new(id, new))
    }

    /// Remove an entry. Returns false when no entry had that id.
    pub async fn remove_entry(&self, id: EntryId) -> Result<bool, AppError> {
        let removed = self.store.delete(id).await?;
        if removed {
            tracing::info!(id, "removed entry");
        }
        Ok(removed)
    }

    pub async fn get_entry(&self, id: EntryId) -> Result<Option<Entry>, AppError> {
        Ok(self.store.get(id).await?)
    }

    /// List all entries in insertion order.
    pub async fn list_entries(&self) -> Result<Vec<Entry>, AppError> {
        Ok(self.store.list_all().await?)
    }

    /// Drop every entry. Irreversible.
    pub async fn reset(&self) -> Result<u64, AppError> {
        let removed = self.store.reset().await?;
        tracing::info!(removed, "store reset");
        Ok(removed)
    }

    // ========================
    // Aggregates
    // ========================

    /// Total value of one type.
    pub async fn total(&self, entry_type: EntryType) -> Result<Cents, AppError> {
        Ok(self.store.total(entry_type).await?)
    }

    /// Income minus expense.
    pub async fn profit(&self) -> Result<Cents, AppError> {
        let entries = self.store.list_all().await?;
        Ok(profit(&entries)?)
    }

    pub async fn summary(&self) -> Result<Summary, AppError> {
        let entries = self.store.list_all().await?;
        Ok(Summary::from_entries(&entries)?)
    }

    pub async fn daily_totals(&self) -> Result<Vec<DailyTotal>, AppError> {
        let entries = self.store.list_all().await?;
        Ok(daily_totals(&entries)?)
    }

    pub async fn cumulative_balance(&self) -> Result<Vec<BalancePoint>, AppError> {
        let entries = self.store.list_all().await?;
        Ok(cumulative_balance(&entries)?)
    }

    pub async fn breakdown(&self, entry_type: EntryType) -> Result<Vec<NameShare>, AppError> {
        let entries = self.store.list_all().await?;
        Ok(breakdown(&entries, entry_type)?)
    }

    /// Full analysis panel from a single read of the store.
    pub async fn dashboard_report(&self) -> Result<DashboardReport, AppError> {
        let entries = self.store.list_all().await?;
        Ok(DashboardReport {
            generated_at: Utc::now(),
            summary: Summary::from_entries(&entries)?,
            daily: daily_totals(&entries)?,
            balance: cumulative_balance(&entries)?,
            income_breakdown: breakdown(&entries, EntryType::Income)?,
            expense_breakdown: breakdown(&entries, EntryType::Expense)?,
        })
    }
}

/// Validate raw form fields into a [`NewEntry`].
///
/// An empty name or value is reported as a missing field before any
/// parsing happens, matching the add form's "missing argument" notice.
pub fn validate_entry(
    name: &str,
    date: &str,
    entry_type: &str,
    value: &str,
) -> Result<NewEntry, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::MissingField("name"));
    }
    if value.trim().is_empty() {
        return Err(AppError::MissingField("value"));
    }

    let date = parse_entry_date(date).ok_or_else(|| AppError::InvalidDate(date.to_string()))?;
    let entry_type = EntryType::from_str(entry_type)
        .ok_or_else(|| AppError::InvalidEntryType(entry_type.to_string()))?;
    let value = parse_cents(value).map_err(|reason| AppError::InvalidValue {
        input: value.to_string(),
        reason,
    })?;

    Ok(NewEntry::new(name, date, entry_type, value))
}
