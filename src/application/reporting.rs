use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BalancePoint, DailyTotal, NameShare, Summary};

/// Everything the analysis panel shows, computed from one snapshot of the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub daily: Vec<DailyTotal>,
    pub balance: Vec<BalancePoint>,
    pub income_breakdown: Vec<NameShare>,
    pub expense_breakdown: Vec<NameShare>,
}

/// Which chart series to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Income/expense per day (histogram, line)
    Daily,
    /// Running balance (line)
    Balance,
    /// Share per entry name (pie)
    Breakdown,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Daily => "daily",
            ChartKind::Balance => "balance",
            ChartKind::Breakdown => "breakdown",
        }
    }
}

impl std::str::FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(ChartKind::Daily),
            "balance" => Ok(ChartKind::Balance),
            "breakdown" | "pie" => Ok(ChartKind::Breakdown),
            _ => Err(format!("unknown chart: {}", s)),
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
