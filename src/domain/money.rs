use std::fmt;

use serde::{Deserialize, Serialize};

/// Money is represented as integer minor units (dirams, kopecks, cents).
/// 1 unit = 100 minor units, so 50.00 = 5000.
pub type Money = i64;

/// Format minor units as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_money(amount: Money) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parse a decimal string into minor units.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_money(input: &str) -> Result<Money, ParseMoneyError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');

    let parts: Vec<&str> = input.split('.').collect();
    let (units, fraction) = match parts.as_slice() {
        [units] => (*units, ""),
        [units, fraction] => (*units, *fraction),
        _ => return Err(ParseMoneyError::InvalidFormat),
    };

    if units.is_empty() && fraction.is_empty() {
        return Err(ParseMoneyError::InvalidFormat);
    }

    let units: i64 = if units.is_empty() {
        0
    } else {
        units.parse().map_err(|_| ParseMoneyError::InvalidFormat)?
    };

    // Pad or truncate the fractional part to 2 digits
    let minor: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| ParseMoneyError::InvalidFormat)? * 10,
        _ => fraction
            .get(..2)
            .and_then(|digits| digits.parse().ok())
            .ok_or(ParseMoneyError::InvalidFormat)?,
    };

    let amount = units
        .checked_mul(100)
        .and_then(|major| major.checked_add(minor))
        .ok_or(ParseMoneyError::Overflow)?;
    Ok(if negative { -amount } else { amount })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseMoneyError {
    InvalidFormat,
    Overflow,
}

impl fmt::Display for ParseMoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMoneyError::InvalidFormat => write!(f, "invalid money format"),
            ParseMoneyError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseMoneyError {}

/// Currencies known to the wallet. Used for labelling only; no conversion
/// is ever performed between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Tjs,
    Rub,
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Tjs => "TJS",
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "TJS" => Some(Currency::Tjs),
            "RUB" => Some(Currency::Rub),
            "USD" => Some(Currency::Usd),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
