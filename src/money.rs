//! Fixed-point money handling: parsing user input, storing decimals in SQLite
//! and turning ratios into whole percentages.
//!
//! All amounts use [Decimal] with two decimal places. Floating point numbers
//! never touch money.

use std::str::FromStr;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusqlite::{Row, types::Type};

use crate::Error;

/// The number of decimal places stored for every amount.
pub const DECIMAL_PLACES: u32 = 2;

/// Maximum digits for expense and income amounts and budget limits.
pub const AMOUNT_MAX_DIGITS: u32 = 10;
/// Maximum digits for goal targets and saved amounts.
pub const GOAL_MAX_DIGITS: u32 = 15;
/// Maximum digits for the monthly budget on a user's profile.
pub const MONTHLY_BUDGET_MAX_DIGITS: u32 = 12;
/// Maximum digits for the lifetime budget on a user's profile.
pub const LIFETIME_BUDGET_MAX_DIGITS: u32 = 15;

/// Parse a non-negative amount typed in by a user.
///
/// `max_digits` counts digits on both sides of the decimal point, so a limit
/// of 10 allows amounts up to 99,999,999.99.
///
/// # Errors
/// Returns:
/// - [Error::InvalidAmount] if `raw` is not a decimal number,
/// - [Error::NegativeAmount] if the amount is below zero,
/// - [Error::TooManyDecimalPlaces] if the amount has fractional cents,
/// - [Error::TooManyDigits] if the amount does not fit in `max_digits`.
pub fn parse_amount(raw: &str, max_digits: u32) -> Result<Decimal, Error> {
    let amount = parse_signed_amount(raw, max_digits)?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::NegativeAmount);
    }

    Ok(amount)
}

/// Parse an amount that may be negative, e.g. a budget limit.
///
/// # Errors
/// The same as [parse_amount], except that negative amounts are accepted.
pub fn parse_signed_amount(raw: &str, max_digits: u32) -> Result<Decimal, Error> {
    let trimmed = raw.trim();
    let amount =
        Decimal::from_str(trimmed).map_err(|_| Error::InvalidAmount(trimmed.to_owned()))?;

    if amount.scale() > DECIMAL_PLACES {
        return Err(Error::TooManyDecimalPlaces);
    }

    check_digits(amount, max_digits)?;

    Ok(to_money(amount))
}

/// Give `amount` exactly [DECIMAL_PLACES] decimal places, so `30` becomes `30.00`.
///
/// Negative zero becomes zero. Extra places are rounded off.
pub fn to_money(amount: Decimal) -> Decimal {
    // "-0" would otherwise be shown as "-0.00".
    let mut amount = if amount.is_zero() { Decimal::ZERO } else { amount };
    amount.rescale(DECIMAL_PLACES);

    amount
}

/// The text stored in SQLite for `amount`.
pub fn to_sql_text(amount: Decimal) -> String {
    to_money(amount).to_string()
}

/// Check that `amount` fits in a column with `max_digits` digits, two of
/// which are after the decimal point.
///
/// # Errors
/// Returns [Error::TooManyDigits] if it does not fit.
pub fn check_digits(amount: Decimal, max_digits: u32) -> Result<(), Error> {
    let max_whole_digits = max_digits.saturating_sub(DECIMAL_PLACES);
    let whole_digits = amount.abs().trunc().to_string().trim_start_matches('0').len();

    if whole_digits > max_whole_digits as usize {
        return Err(Error::TooManyDigits(max_whole_digits));
    }

    Ok(())
}

/// Sum amounts, treating an empty sequence as zero.
pub fn total(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    to_money(amounts.into_iter().fold(Decimal::ZERO, |sum, amount| sum + amount))
}

/// `part` as a whole percentage of `whole`, or zero if `whole` is not positive.
///
/// The result is not capped, so spending more than the budget gives more than 100.
pub fn percentage(part: Decimal, whole: Decimal) -> i64 {
    if whole <= Decimal::ZERO {
        return 0;
    }

    rounded_percentage(part, whole)
}

/// [percentage] capped at 100.
pub fn capped_percentage(part: Decimal, whole: Decimal) -> i64 {
    percentage(part, whole).min(100)
}

/// Compute `round(part / whole * 100)`.
///
/// Rounds half to even. Returns zero if `whole` is zero or the result does not
/// fit in an `i64`.
pub fn rounded_percentage(part: Decimal, whole: Decimal) -> i64 {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|percent| percent.round().to_i64())
        .unwrap_or(0)
}

/// Read a decimal stored as TEXT from column `index` of `row`.
pub fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let text: String = row.get(index)?;

    Decimal::from_str(&text)
        .map(to_money)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}
