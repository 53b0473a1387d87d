//! Conversions between user-facing ether amounts and wei.

use alloy_primitives::{
    U256,
    utils::{UnitsError, format_ether, parse_ether},
};

/// Number of decimal places of one ether.
pub const ETHER_DECIMALS: usize = 18;

/// An amount typed by the user that cannot be submitted.
#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    #[error("no amount given")]
    Empty,
    #[error("amount must not be negative: {0}")]
    Negative(String),
    #[error("`{0}` is not a decimal amount")]
    NotDecimal(String),
    #[error("`{0}` has more than {ETHER_DECIMALS} decimal places")]
    TooPrecise(String),
    #[error(transparent)]
    Units(#[from] UnitsError),
}

/// Parses a non-negative decimal ether amount into wei.
///
/// Surrounding whitespace is ignored. Anything other than digits with at most one decimal point
/// is rejected, as are fractions finer than one wei.
pub fn parse_amount(amount: &str) -> Result<U256, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }
    if amount.starts_with('-') {
        return Err(AmountError::Negative(amount.to_string()));
    }

    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) || (whole.is_empty() && fraction.is_empty()) {
        return Err(AmountError::NotDecimal(amount.to_string()));
    }
    if fraction.len() > ETHER_DECIMALS {
        return Err(AmountError::TooPrecise(amount.to_string()));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let fraction = if fraction.is_empty() { "0" } else { fraction };
    Ok(parse_ether(&format!("{whole}.{fraction}"))?)
}

/// Formats a wei amount as ether, trimming trailing zeros but keeping at least one decimal.
///
/// `1000000000000000000` formats as `1.0`, `1500000000000000` as `0.0015`.
pub fn format_amount(wei: U256) -> String {
    let formatted = format_ether(wei);
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() { format!("{whole}.0") } else { format!("{whole}.{fraction}") }
        }
        None => format!("{formatted}.0"),
    }
}
