//! Checked arithmetic for sale bookkeeping.

use carry_types::Amount;

use crate::error::SaleError;

/// Add two amounts, returning `SaleError::Overflow` on overflow.
pub fn safe_add(a: Amount, b: Amount) -> Result<Amount, SaleError> {
    a.checked_add(b).ok_or(SaleError::Overflow)
}

/// Subtract `b` from `a`, returning `SaleError::Overflow` on underflow.
pub fn safe_sub(a: Amount, b: Amount) -> Result<Amount, SaleError> {
    a.checked_sub(b).ok_or(SaleError::Overflow)
}

/// Multiply two amounts, returning `SaleError::Overflow` on overflow.
pub fn safe_mul(a: Amount, b: Amount) -> Result<Amount, SaleError> {
    a.checked_mul(b).ok_or(SaleError::Overflow)
}

/// `amount * numerator / denominator`, truncating. `denominator` must be non-zero.
pub fn mul_div(amount: Amount, numerator: u64, denominator: u64) -> Result<Amount, SaleError> {
    Ok(safe_mul(amount, numerator as Amount)? / denominator as Amount)
}
