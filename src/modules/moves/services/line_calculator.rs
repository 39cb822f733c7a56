use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money::{self, percent_of, round_money};
use crate::core::{AppError, Result};
use crate::modules::moves::models::LineTotals;
use crate::modules::taxes::models::Tax;
use crate::modules::taxes::services::{TaxCalculator, TaxComputation};

/// Inputs of one product line, with its taxes already resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineInput {
    pub quantity: Decimal,
    pub price_unit: Decimal,
    /// Percentage, 0..=100
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub taxes: Vec<Tax>,
}

impl LineInput {
    pub fn new(quantity: Decimal, price_unit: Decimal, discount: Decimal, taxes: Vec<Tax>) -> Self {
        Self {
            quantity,
            price_unit,
            discount,
            taxes,
        }
    }

    /// Reject, never clamp, out-of-range values
    pub fn validate(&self) -> Result<()> {
        if self.quantity < Decimal::ZERO {
            return Err(AppError::invalid_input(format!(
                "Quantity must not be negative, got: {}",
                self.quantity
            )));
        }

        if self.discount < Decimal::ZERO || self.discount > Decimal::ONE_HUNDRED {
            return Err(AppError::invalid_input(format!(
                "Discount must be between 0 and 100, got: {}",
                self.discount
            )));
        }

        Ok(())
    }
}

/// Line totals together with the per-tax detail they were built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineComputation {
    pub totals: LineTotals,
    pub taxes: TaxComputation,
}

/// Computes subtotal, tax and total of a product line.
///
/// Pure: the same input always yields the same output.
pub struct LineCalculator {
    tax_calculator: TaxCalculator,
}

impl LineCalculator {
    pub fn new() -> Self {
        Self {
            tax_calculator: TaxCalculator::new(),
        }
    }

    /// Totals of a line
    ///
    /// Formula:
    /// * gross = quantity × price_unit
    /// * price_subtotal = round(gross − gross × discount / 100)
    /// * price_tax = round(Σ tax amounts on price_subtotal)
    /// * price_total = round(price_subtotal + price_tax)
    pub fn calculate_line_totals(&self, line: &LineInput) -> Result<LineTotals> {
        Ok(self.compute(line)?.totals)
    }

    /// Totals plus the unrounded per-tax amounts and bases.
    ///
    /// An amount beyond the decimal range is `InvalidInput`.
    pub fn compute(&self, line: &LineInput) -> Result<LineComputation> {
        line.validate()?;

        let gross = money::mul(line.quantity, line.price_unit)?;
        let discount_amount = percent_of(gross, line.discount)?;
        let price_subtotal = round_money(money::sub(gross, discount_amount)?);

        let taxes = self
            .tax_calculator
            .compute_taxes(&line.taxes, price_subtotal, line.quantity)?;
        let price_tax = round_money(taxes.total_tax);
        let price_total = round_money(money::add(price_subtotal, price_tax)?);

        Ok(LineComputation {
            totals: LineTotals {
                price_subtotal,
                price_tax,
                price_total,
            },
            taxes,
        })
    }
}

impl Default for LineCalculator {
    fn default() -> Self {
        Self::new()
    }
}
