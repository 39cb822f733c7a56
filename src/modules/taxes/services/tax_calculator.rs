use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::money::{self, percent_of};
use crate::core::Result;
use crate::modules::taxes::models::Tax;

/// Amount computed for one tax of a line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedTax {
    pub tax_id: i64,
    /// Unrounded tax amount
    pub tax_amount: Decimal,
    /// Base the tax was applied to, after chaining
    pub tax_base_amount: Decimal,
    pub include_base_amount: bool,
    pub is_base_affected: bool,
}

/// Result of running a line's tax sequence
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TaxComputation {
    pub taxes_computed: Vec<ComputedTax>,
    /// Unrounded sum of every `tax_amount`
    pub total_tax: Decimal,
}

impl TaxComputation {
    pub fn find(&self, tax_id: i64) -> Option<&ComputedTax> {
        self.taxes_computed.iter().find(|t| t.tax_id == tax_id)
    }
}

/// TaxCalculator runs an ordered tax sequence over a base amount
pub struct TaxCalculator;

impl TaxCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Compute every tax of a line.
    ///
    /// Taxes are applied in ascending (`sort`, `id`) order whatever the input
    /// order. A tax flagged `is_base_affected` is applied to the base plus the
    /// amounts of all prior taxes flagged `include_base_amount`; other taxes
    /// use the original base. Percentage taxes apply `rate / 100` to their
    /// base, fixed taxes charge `amount` per unit of `quantity`.
    ///
    /// Amounts are not rounded and keep the sign of the base. Fails with
    /// `InvalidInput` when an amount leaves the decimal range.
    pub fn compute_taxes(
        &self,
        taxes: &[Tax],
        base_amount: Decimal,
        quantity: Decimal,
    ) -> Result<TaxComputation> {
        let mut ordered: Vec<&Tax> = Vec::with_capacity(taxes.len());
        for tax in taxes {
            if !ordered.iter().any(|t| t.id == tax.id) {
                ordered.push(tax);
            }
        }
        ordered.sort_by_key(|t| (t.sort, t.id));

        let mut computation = TaxComputation::default();
        let mut included_amounts = Decimal::ZERO;

        for tax in ordered {
            let tax_base_amount = if tax.is_base_affected {
                money::add(base_amount, included_amounts)?
            } else {
                base_amount
            };

            let tax_amount = if tax.is_percentage() {
                percent_of(tax_base_amount, tax.amount)?
            } else {
                money::mul(tax.amount, quantity)?
            };

            if tax.include_base_amount {
                included_amounts = money::add(included_amounts, tax_amount)?;
            }

            computation.total_tax = money::add(computation.total_tax, tax_amount)?;
            computation.taxes_computed.push(ComputedTax {
                tax_id: tax.id,
                tax_amount,
                tax_base_amount,
                include_base_amount: tax.include_base_amount,
                is_base_affected: tax.is_base_affected,
            });
        }

        Ok(computation)
    }
}

impl Default for TaxCalculator {
    fn default() -> Self {
        Self::new()
    }
}
