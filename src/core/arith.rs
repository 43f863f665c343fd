//! Checked `Decimal` arithmetic that reports overflow instead of panicking.

use crate::core::error::NumericalFailure;
use rust_decimal::Decimal;

pub(crate) fn add(a: Decimal, b: Decimal) -> Result<Decimal, NumericalFailure> {
    a.checked_add(b).ok_or(NumericalFailure::Overflow)
}

pub(crate) fn sub(a: Decimal, b: Decimal) -> Result<Decimal, NumericalFailure> {
    a.checked_sub(b).ok_or(NumericalFailure::Overflow)
}

pub(crate) fn mul(a: Decimal, b: Decimal) -> Result<Decimal, NumericalFailure> {
    a.checked_mul(b).ok_or(NumericalFailure::Overflow)
}

pub(crate) fn div(a: Decimal, b: Decimal) -> Result<Decimal, NumericalFailure> {
    a.checked_div(b).ok_or(NumericalFailure::Overflow)
}

/// `sum(a[i] * b[i])`.
pub(crate) fn dot(a: &[Decimal], b: &[Decimal]) -> Result<Decimal, NumericalFailure> {
    let mut total = Decimal::ZERO;
    for (x, y) in a.iter().zip(b) {
        total = add(total, mul(*x, *y)?)?;
    }
    Ok(total)
}
