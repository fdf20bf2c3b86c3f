use thiserror::Error;

use crate::domain::{AmountOverflow, ParseCentsError};

#[derive(Error, Debug)]
pub enum AppError {
    /// A required form field was left empty; nothing was recorded.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid entry type '{0}'. Valid types: income, expense")]
    InvalidEntryType(String),

    #[error("Invalid date '{0}'. Use MM.DD.YYYY")]
    InvalidDate(String),

    #[error("Invalid value '{input}': {reason}")]
    InvalidValue {
        input: String,
        reason: ParseCentsError,
    },

    /// Stored values add up to more than a total can hold.
    #[error("Cannot summarize entries: {0}")]
    TotalOverflow(#[from] AmountOverflow),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
