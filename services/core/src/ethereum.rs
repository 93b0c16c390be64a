use chrono::{DateTime, SecondsFormat, Utc};
use ethabi::{Address, Uint};

use crate::error::EthereumValueError;

/// Largest power of ten that fits in a u128.
const MAX_DECIMALS: u32 = 38;

pub fn parse_address(input: &str) -> Result<Address, EthereumValueError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() != 40 {
        return Err(EthereumValueError::InvalidAddress(input.to_string()));
    }
    let bytes = hex::decode(digits).map_err(|_| EthereumValueError::InvalidAddress(input.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

pub fn address_string(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

pub fn is_decimal_string(value: &str) -> bool {
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match value.split_once('.') {
        Some((whole, fraction)) => {
            all_digits(whole) && all_digits(fraction) && !(whole.is_empty() && fraction.is_empty())
        }
        None => !value.is_empty() && all_digits(value),
    }
}

/// Parses `"1.5"` with `decimals = 18` into `1_500_000_000_000_000_000`.
pub fn decimal_string_to_u128(value: &str, decimals: u32) -> Result<u128, EthereumValueError> {
    if !is_decimal_string(value) {
        return Err(EthereumValueError::NotDecimal(value.to_string()));
    }
    let decimals = decimals.min(MAX_DECIMALS);
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if fraction.len() > decimals as usize {
        return Err(EthereumValueError::TooManyDecimals { value: value.to_string(), decimals });
    }
    let overflow = || EthereumValueError::Overflow(value.to_string());
    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| overflow())? };
    let padded = format!("{fraction:0<width$}", width = decimals as usize);
    let fraction: u128 = if padded.is_empty() { 0 } else { padded.parse().map_err(|_| overflow())? };
    whole
        .checked_mul(10u128.pow(decimals))
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(overflow)
}

/// Fixed-point to decimal text, truncated to `precision` fractional digits
/// with trailing zeros removed.
pub fn u128_to_decimal_string(value: u128, decimals: u32, precision: usize) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let scale = 10u128.pow(decimals);
    let whole = value / scale;
    let mut fraction = format!("{:0>width$}", value % scale, width = decimals as usize);
    fraction.truncate(precision.min(decimals as usize));
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Like [`u128_to_decimal_string`] but rounds half up and groups the whole
/// part in thousands: `1234567.891` at precision 2 becomes `1,234,567.89`.
pub fn u128_to_rounded_pretty_decimal_string(value: u128, decimals: u32, precision: u32) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let precision = precision.min(decimals);
    let unit = 10u128.pow(decimals - precision);
    let remainder = value % unit;
    let mut rounded = value / unit;
    // remainder < unit <= 10^38, doubling stays below u128::MAX
    if unit > 1 && remainder * 2 >= unit {
        rounded = rounded.saturating_add(1);
    }
    let scale = 10u128.pow(precision);
    let whole = group_thousands(rounded / scale);
    let fraction = format!("{:0>width$}", rounded % scale, width = precision as usize);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole
    } else {
        format!("{whole}.{fraction}")
    }
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Decimal digits only; hex (`0x..`) input is rejected.
pub fn parse_non_hex_u128(value: &str) -> Result<u128, EthereumValueError> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EthereumValueError::NotInteger(value.to_string()));
    }
    value.parse().map_err(|_| EthereumValueError::Overflow(value.to_string()))
}

pub fn format_unix_timestamp_iso(seconds: u128) -> Result<String, EthereumValueError> {
    let secs = i64::try_from(seconds).map_err(|_| EthereumValueError::TimestampOutOfRange(seconds))?;
    let time: DateTime<Utc> =
        DateTime::from_timestamp(secs, 0).ok_or(EthereumValueError::TimestampOutOfRange(seconds))?;
    Ok(time.to_rfc3339_opts(SecondsFormat::Secs, true))
}

pub fn u256_to_u128(value: Uint) -> Result<u128, EthereumValueError> {
    if value.bits() > 128 {
        return Err(EthereumValueError::Overflow(value.to_string()));
    }
    Ok(value.low_u128())
}

/// Reads a two's-complement `int256` word.
pub fn i256_to_i128(value: Uint) -> Result<i128, EthereumValueError> {
    let negative = value.bit(255);
    let magnitude = if negative { (!value).overflowing_add(Uint::one()).0 } else { value };
    if magnitude.bits() > 127 {
        return Err(EthereumValueError::Overflow(value.to_string()));
    }
    let magnitude = magnitude.low_u128() as i128;
    Ok(if negative { -magnitude } else { magnitude })
}

pub fn u128_to_u256(value: u128) -> Uint {
    Uint::from(value)
}
