use std::fmt;

/// Money is stored as integer cents so totals never drift.
/// A value of 1000 entered in the form is stored as 100000 cents.
pub type Cents = i64;

/// Largest value a single entry may carry: ten trillion units.
pub const MAX_ENTRY_CENTS: Cents = 1_000_000_000_000_000;

/// Format cents as a plain decimal string.
/// Example: 100000 -> "1000.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a non-negative decimal string into cents.
/// Example: "1000" -> 100000, "12.5" -> 1250, ".99" -> 99
///
/// Entry values carry no sign, so a leading `-` is rejected, as is
/// anything finer than a cent or above [`MAX_ENTRY_CENTS`].
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseCentsError::Empty);
    }
    if input.starts_with('-') {
        return Err(ParseCentsError::Negative);
    }
    let input = input.trim_start_matches('+');

    let (units_str, decimal_str) = match input.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (input, ""),
    };

    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !decimal_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat);
    }
    if decimal_str.len() > 2 {
        return Err(ParseCentsError::TooPrecise);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParseCentsError::Overflow)?
    };
    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        // "12.5" means fifty cents
        1 => decimal_str.parse::<i64>().map_err(|_| ParseCentsError::InvalidFormat)? * 10,
        _ => decimal_str.parse().map_err(|_| ParseCentsError::InvalidFormat)?,
    };

    units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .filter(|c| *c <= MAX_ENTRY_CENTS)
        .ok_or(ParseCentsError::Overflow)
}

/// A sum of entry values that does not fit in [`Cents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountOverflow;

impl fmt::Display for AmountOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "total is too large to represent")
    }
}

impl std::error::Error for AmountOverflow {}

/// Add up amounts without wrapping.
pub fn checked_sum<I>(amounts: I) -> Result<Cents, AmountOverflow>
where
    I: IntoIterator<Item = Cents>,
{
    amounts
        .into_iter()
        .try_fold(0 as Cents, |acc, amount| acc.checked_add(amount))
        .ok_or(AmountOverflow)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCentsError {
    Empty,
    Negative,
    InvalidFormat,
    TooPrecise,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::Empty => write!(f, "value is empty"),
            ParseCentsError::Negative => write!(f, "value must not be negative"),
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::TooPrecise => write!(f, "at most two decimal places are allowed"),
            ParseCentsError::Overflow => write!(f, "value is too large"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
