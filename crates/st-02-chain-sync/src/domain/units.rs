//! # Ledger Unit Codecs
//!
//! The ledger stores integers only. These functions convert between the
//! dashboard's decimal quantities and the ledger's fixed-point encodings:
//!
//! | Quantity | Display | Ledger |
//! |----------|---------|--------|
//! | Coordinate | degrees | degrees × 1e6, rounded |
//! | Emissions | kg | grams, rounded |
//! | Distance | km | meters, rounded |
//! | Probability | 0..=1 | percent, rounded |
//! | Price | decimal string | smallest unit (10^decimals) |
//! | Estimated delay | hours | whole hours, rounded |
//! | Dates | calendar date | unix seconds, UTC |

use chrono::{DateTime, NaiveDate, Utc};
use shared_types::{Coordinates, ValidationError, U256};

/// Fixed-point factor for coordinates.
pub const COORDINATE_SCALE: f64 = 1_000_000.0;

/// Grams per kilogram, meters per kilometer.
pub const MILLI_SCALE: f64 = 1_000.0;

/// Percent per unit probability.
pub const PERCENT_SCALE: f64 = 100.0;

// =============================================================================
// COORDINATES
// =============================================================================

/// Degrees to ledger micro-degrees.
pub fn encode_coordinate(degrees: f64) -> i64 {
    (degrees * COORDINATE_SCALE).round() as i64
}

/// Ledger micro-degrees to degrees.
pub fn decode_coordinate(micro: i64) -> f64 {
    micro as f64 / COORDINATE_SCALE
}

/// Encode a validated position as `(lat, lng)`.
pub fn encode_position(position: &Coordinates) -> (i64, i64) {
    (encode_coordinate(position.lat), encode_coordinate(position.lng))
}

/// Decode a stored location. `(0, 0)` means "never set".
pub fn decode_location(lat: i64, lng: i64) -> Option<Coordinates> {
    if lat == 0 && lng == 0 {
        return None;
    }
    Some(Coordinates {
        lat: decode_coordinate(lat),
        lng: decode_coordinate(lng),
    })
}

// =============================================================================
// MEASURES
// =============================================================================

fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(
            field,
            format!("{value} is not a finite non-negative number"),
        ));
    }
    Ok(value)
}

/// Round a scaled measure onto the wire. `as u64` saturates, so anything
/// past `u64::MAX` is rejected here instead.
fn to_wire(field: &'static str, value: f64, scale: f64) -> Result<u64, ValidationError> {
    let scaled = (non_negative(field, value)? * scale).round();
    if scaled >= u64::MAX as f64 {
        return Err(ValidationError::new(
            field,
            format!("{value} does not fit the ledger encoding"),
        ));
    }
    Ok(scaled as u64)
}

/// Kilograms to grams.
pub fn kg_to_grams(kg: f64) -> Result<u64, ValidationError> {
    to_wire("emissions", kg, MILLI_SCALE)
}

/// Grams to kilograms.
pub fn grams_to_kg(grams: u64) -> f64 {
    grams as f64 / MILLI_SCALE
}

/// Kilometers to meters.
pub fn km_to_meters(km: f64) -> Result<u64, ValidationError> {
    to_wire("distance", km, MILLI_SCALE)
}

/// Meters to kilometers.
pub fn meters_to_km(meters: u64) -> f64 {
    meters as f64 / MILLI_SCALE
}

/// Probability in [0, 1] to integer percent.
pub fn probability_to_percent(probability: f64) -> Result<u64, ValidationError> {
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(ValidationError::new(
            "probability",
            format!("{probability} is outside [0, 1]"),
        ));
    }
    Ok((probability * PERCENT_SCALE).round() as u64)
}

/// Integer percent to probability.
pub fn percent_to_probability(percent: u64) -> f64 {
    percent as f64 / PERCENT_SCALE
}

/// Estimated delay to whole hours.
pub fn hours_to_wire(hours: f64) -> Result<u64, ValidationError> {
    to_wire("estimatedDelay", hours, 1.0)
}

// =============================================================================
// PRICE
// =============================================================================

/// Parse a decimal amount into the smallest unit, exactly.
///
/// `parse_units("1.5", 18)` is 1.5 × 10^18. More fractional digits than
/// `decimals` is rejected rather than truncated.
pub fn parse_units(amount: &str, decimals: u32) -> Result<U256, ValidationError> {
    let amount = amount.trim();
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(ValidationError::new("price", "must not be empty"));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("price", format!("'{amount}' is not a decimal amount")));
    }
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(ValidationError::new(
            "price",
            format!("more than {decimals} fractional digits"),
        ));
    }

    let overflow = || ValidationError::new("price", "amount too large");
    let whole = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).map_err(|_| overflow())?
    };
    let padded = format!("{fraction:0<width$}", width = decimals as usize);
    let fraction = if padded.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(&padded).map_err(|_| overflow())?
    };

    whole
        .checked_mul(U256::exp10(decimals as usize))
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(overflow)
}

/// Format a smallest-unit amount as a decimal string.
///
/// Always carries a fractional part (`"1.0"`, `"0.25"`).
pub fn format_units(value: U256, decimals: u32) -> String {
    let unit = U256::exp10(decimals as usize);
    let whole = value / unit;
    let fraction = value % unit;

    let fraction = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Smallest-unit amount as a display number. Zero means "no price".
pub fn decode_price(value: U256, decimals: u32) -> Option<f64> {
    if value.is_zero() {
        return None;
    }
    format_units(value, decimals).parse().ok()
}

// =============================================================================
// DATES
// =============================================================================

/// Calendar date to unix seconds at UTC midnight.
pub fn date_to_unix(date: NaiveDate) -> u64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp().max(0) as u64)
        .unwrap_or(0)
}

/// Unix seconds to the UTC calendar date. Zero means "unset".
pub fn unix_to_date(secs: u64) -> Option<NaiveDate> {
    unix_to_datetime(secs).map(|dt| dt.date_naive())
}

/// Unix seconds to a UTC timestamp. Zero means "unset".
pub fn unix_to_datetime(secs: u64) -> Option<DateTime<Utc>> {
    if secs == 0 {
        return None;
    }
    DateTime::from_timestamp(i64::try_from(secs).ok()?, 0)
}
