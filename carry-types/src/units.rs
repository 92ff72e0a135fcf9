//! Amount parsing with unit suffixes (`wei`, `gwei`, `finney`, `ether`).

use crate::constants::{ETHER, FINNEY, GWEI, WEI};
use crate::error::TypesError;
use crate::primitives::Amount;

fn unit_multiplier(unit: &str) -> Option<Amount> {
    match unit {
        "" | "wei" => Some(WEI),
        "gwei" => Some(GWEI),
        "finney" => Some(FINNEY),
        "ether" | "eth" => Some(ETHER),
        _ => None,
    }
}

/// Parse an amount such as `"99 finney"`, `"49.9 ether"` or `"1000"` (wei).
///
/// Fractions are allowed as long as the result is a whole number of wei.
/// Underscores are ignored in the numeric part.
pub fn parse_amount(input: &str) -> Result<Amount, TypesError> {
    let invalid = |reason: &str| TypesError::InvalidAmount {
        input: input.to_string(),
        reason: reason.to_string(),
    };
    let overflow = || TypesError::AmountOverflow {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    let split_at = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '_'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split_at);
    let number: String = number.chars().filter(|c| *c != '_').collect();
    let unit = unit.trim().to_ascii_lowercase();

    if number.is_empty() {
        return Err(invalid("missing number"));
    }
    let multiplier = unit_multiplier(&unit).ok_or_else(|| invalid("unknown unit"))?;

    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, f),
        None => (number.as_str(), ""),
    };
    if fraction.contains('.') {
        return Err(invalid("more than one decimal point"));
    }
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("missing digits"));
    }

    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let mut total = whole.checked_mul(multiplier).ok_or_else(overflow)?;

    let fraction = fraction.trim_end_matches('0');
    if !fraction.is_empty() {
        let digits = fraction.len() as u32;
        let scale = 10u128.checked_pow(digits).ok_or_else(overflow)?;
        if multiplier % scale != 0 {
            return Err(invalid("fraction finer than one wei"));
        }
        let frac: Amount = fraction.parse().map_err(|_| overflow())?;
        let frac_wei = frac.checked_mul(multiplier / scale).ok_or_else(overflow)?;
        total = total.checked_add(frac_wei).ok_or_else(overflow)?;
    }

    Ok(total)
}

/// Render an amount of wei as a decimal ether string, e.g. `"49.9"`.
pub fn format_ether(amount: Amount) -> String {
    let whole = amount / ETHER;
    let fraction = amount % ETHER;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:018}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
