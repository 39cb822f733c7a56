//! Monetary rounding rules shared by line and document computations.
//!
//! Every materialized amount (subtotal, tax, total, synthetic line
//! amounts) is rounded half-up to two decimal places. Intermediate values
//! stay unrounded.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::{AppError, Result};

/// Decimal places of every materialized monetary amount
pub const MONEY_SCALE: u32 = 2;

/// Decimal places used when displaying converted quantities and prices
pub const DISPLAY_SCALE: u32 = 2;

/// Round a monetary amount half-up (away from zero) to 2 decimal places
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a converted quantity or unit price for display
pub fn round_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn out_of_range() -> AppError {
    AppError::invalid_input("Amount out of range")
}

/// `a + b`, or `InvalidInput` when the sum leaves the decimal range
pub fn add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(out_of_range)
}

pub fn sub(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b).ok_or_else(out_of_range)
}

pub fn mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b).ok_or_else(out_of_range)
}

/// `a / b`; callers guarantee a non-zero divisor
pub fn div(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_div(b).ok_or_else(out_of_range)
}

/// Percentage of an amount: `amount * percent / 100`, unrounded
pub fn percent_of(amount: Decimal, percent: Decimal) -> Result<Decimal> {
    div(mul(amount, percent)?, Decimal::ONE_HUNDRED)
}

/// Split a signed balance into its (debit, credit) pair
pub fn debit_credit(balance: Decimal) -> (Decimal, Decimal) {
    if balance >= Decimal::ZERO {
        (balance, Decimal::ZERO)
    } else {
        (Decimal::ZERO, -balance)
    }
}
