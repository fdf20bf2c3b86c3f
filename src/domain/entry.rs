use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Cents;

pub type EntryId = i64;

/// Text form of entry dates, as the form and the store use it: `MM.DD.YYYY`.
pub const DATE_FORMAT: &str = "%m.%d.%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Money coming in (salary, refunds, ...)
    Income,
    /// Money going out (rent, groceries, ...)
    Expense,
}

impl EntryType {
    pub const ALL: [EntryType; 2] = [EntryType::Income, EntryType::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Income => "income",
            EntryType::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(EntryType::Income),
            "expense" => Some(EntryType::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryType::from_str(s).ok_or_else(|| format!("unknown entry type: {}", s))
    }
}

/// Parse a `MM.DD.YYYY` date.
pub fn parse_entry_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Format a date the way it is stored.
pub fn format_entry_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// An entry that passed boundary validation but has no id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub name: String,
    pub date: NaiveDate,
    pub entry_type: EntryType,
    pub value: Cents,
}

impl NewEntry {
    pub fn new(
        name: impl Into<String>,
        date: NaiveDate,
        entry_type: EntryType,
        value: Cents,
    ) -> Self {
        Self {
            name: name.into(),
            date,
            entry_type,
            value,
        }
    }
}

/// One recorded income or expense. Entries are never updated in place:
/// they are inserted, and later deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Assigned by the store, never reused
    pub id: EntryId,
    pub name: String,
    /// Day the transaction happened
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Magnitude in cents; no sign convention is tied to the type
    pub value: Cents,
}

impl Entry {
    pub fn from_new(id: EntryId, new: NewEntry) -> Self {
        Self {
            id,
            name: new.name,
            date: new.date,
            entry_type: new.entry_type,
            value: new.value,
        }
    }

    /// Drop the id, keeping the recorded data.
    pub fn to_new(&self) -> NewEntry {
        NewEntry {
            name: self.name.clone(),
            date: self.date,
            entry_type: self.entry_type,
            value: self.value,
        }
    }

    /// Value with the sign implied by the type: income adds, expense subtracts.
    pub fn signed_value(&self) -> Cents {
        match self.entry_type {
            EntryType::Income => self.value,
            EntryType::Expense => -self.value,
        }
    }

    pub fn date_text(&self) -> String {
        format_entry_date(self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_parsing() {
        assert_eq!(EntryType::from_str("income"), Some(EntryType::Income));
        assert_eq!(EntryType::from_str("Expense"), Some(EntryType::Expense));
        assert_eq!(EntryType::from_str(" INCOME "), Some(EntryType::Income));
        assert_eq!(EntryType::from_str("transfer"), None);
        assert!("savings".parse::<EntryType>().is_err());
        assert_eq!(EntryType::Expense.to_string(), "expense");
    }

    #[test]
    fn test_entry_date_format() {
        let date = parse_entry_date("01.02.2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(format_entry_date(date), "01.02.2024");

        assert!(parse_entry_date("2024-01-02").is_none());
        assert!(parse_entry_date("13.01.2024").is_none());
        assert!(parse_entry_date("02.30.2024").is_none());
    }

    #[test]
    fn test_signed_value() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let salary = Entry::from_new(1, NewEntry::new("Salary", date, EntryType::Income, 1000));
        let rent = Entry::from_new(2, NewEntry::new("Rent", date, EntryType::Expense, 400));

        assert_eq!(salary.signed_value(), 1000);
        assert_eq!(rent.signed_value(), -400);
        assert_eq!(rent.to_new().name, "Rent");
    }
}
