use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{checked_sum, AmountOverflow, Cents, Entry, EntryType};

/// The three dashboard metrics: revenue, spent and saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub revenue: Cents,
    pub spent: Cents,
    pub saved: Cents,
    pub count: usize,
}

impl Summary {
    pub fn from_entries(entries: &[Entry]) -> Result<Self, AmountOverflow> {
        let revenue = total(entries, EntryType::Income)?;
        let spent = total(entries, EntryType::Expense)?;
        Ok(Self {
            revenue,
            spent,
            saved: revenue.checked_sub(spent).ok_or(AmountOverflow)?,
            count: entries.len(),
        })
    }
}

/// Sum of values of the given type. Zero when nothing matches.
pub fn total(entries: &[Entry], entry_type: EntryType) -> Result<Cents, AmountOverflow> {
    checked_sum(
        entries
            .iter()
            .filter(|e| e.entry_type == entry_type)
            .map(|e| e.value),
    )
}

/// Income total minus expense total.
pub fn profit(entries: &[Entry]) -> Result<Cents, AmountOverflow> {
    Ok(Summary::from_entries(entries)?.saved)
}

/// Income and expense recorded on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub income: Cents,
    pub expense: Cents,
    pub net: Cents,
}

/// Per-day totals in chronological order.
pub fn daily_totals(entries: &[Entry]) -> Result<Vec<DailyTotal>, AmountOverflow> {
    // Stored date text does not sort chronologically; group on the parsed date.
    let mut days: BTreeMap<NaiveDate, (Cents, Cents)> = BTreeMap::new();
    for entry in entries {
        let day = days.entry(entry.date).or_default();
        let slot = match entry.entry_type {
            EntryType::Income => &mut day.0,
            EntryType::Expense => &mut day.1,
        };
        *slot = slot.checked_add(entry.value).ok_or(AmountOverflow)?;
    }

    days.into_iter()
        .map(|(date, (income, expense))| -> Result<DailyTotal, AmountOverflow> {
            Ok(DailyTotal {
                date,
                income,
                expense,
                net: income.checked_sub(expense).ok_or(AmountOverflow)?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub balance: Cents,
}

/// Running balance after each day with activity.
pub fn cumulative_balance(entries: &[Entry]) -> Result<Vec<BalancePoint>, AmountOverflow> {
    let mut balance: Cents = 0;
    daily_totals(entries)?
        .into_iter()
        .map(|day| -> Result<BalancePoint, AmountOverflow> {
            balance = balance.checked_add(day.net).ok_or(AmountOverflow)?;
            Ok(BalancePoint {
                date: day.date,
                balance,
            })
        })
        .collect()
}

/// One slice of the pie chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameShare {
    pub name: String,
    pub total: Cents,
    pub count: usize,
    pub percentage: f64,
}

/// Totals per entry name for one type, largest first.
/// Empty when the type has no value at all.
pub fn breakdown(
    entries: &[Entry],
    entry_type: EntryType,
) -> Result<Vec<NameShare>, AmountOverflow> {
    let type_total = total(entries, entry_type)?;
    if type_total == 0 {
        return Ok(Vec::new());
    }

    let mut by_name: BTreeMap<&str, (Cents, usize)> = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.entry_type == entry_type) {
        let slot = by_name.entry(entry.name.as_str()).or_default();
        slot.0 = slot.0.checked_add(entry.value).ok_or(AmountOverflow)?;
        slot.1 += 1;
    }

    let mut shares: Vec<NameShare> = by_name
        .into_iter()
        .map(|(name, (sum, count))| NameShare {
            name: name.to_string(),
            total: sum,
            count,
            percentage: (sum as f64 / type_total as f64) * 100.0,
        })
        .collect();

    shares.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    Ok(shares)
}
