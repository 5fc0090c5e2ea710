//! Conversion between user-entered decimal amounts and smallest-unit integers.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::SessionError;

/// Parses a positive decimal amount into smallest units.
///
/// Rejects blank input, anything that is not a plain decimal number, zero,
/// negatives, and values with more fractional digits than the unit scale.
pub fn parse_amount(text: &str, decimals: u32) -> Result<u128, SessionError> {
    let text = text.trim();
    if !is_plain_decimal(text) {
        return Err(SessionError::InvalidAmount);
    }

    let value = Decimal::from_str(text)
        .map_err(|_| SessionError::InvalidAmount)?
        .normalize();
    if value <= Decimal::ZERO || value.scale() > decimals {
        return Err(SessionError::InvalidAmount);
    }

    let factor = 10i128
        .checked_pow(decimals - value.scale())
        .ok_or(SessionError::InvalidAmount)?;
    let raw = value
        .mantissa()
        .checked_mul(factor)
        .ok_or(SessionError::InvalidAmount)?;

    u128::try_from(raw).map_err(|_| SessionError::InvalidAmount)
}

/// Optional sign, digits, then at most one `.` followed by digits. Separators
/// and exponents are not accepted.
fn is_plain_decimal(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) if !fraction.is_empty() => (whole, fraction),
        Some(_) => return false,
        None => (unsigned, ""),
    };

    !whole.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

/// Scales a smallest-unit integer down to a display amount.
pub fn to_display(raw: u128, decimals: u32) -> Result<Decimal, SessionError> {
    let out_of_range = || SessionError::Failed(format!("amount {raw} is out of display range"));

    let raw = i128::try_from(raw).map_err(|_| out_of_range())?;
    Decimal::try_from_i128_with_scale(raw, decimals)
        .map(|d| d.normalize())
        .map_err(|_| out_of_range())
}
