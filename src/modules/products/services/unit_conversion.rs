use rust_decimal::Decimal;

use crate::core::money;
use crate::core::{AppError, Result};
use crate::modules::products::models::Uom;

/// Converts line quantities and prices between a product's base unit and
/// the unit selected on the line.
///
/// Both conversions divide by the selected unit's factor. For prices this
/// means the product's base price is divided to estimate the price of one
/// selected unit, mirroring how quantities are converted.
pub struct UnitConversion;

impl UnitConversion {
    pub fn new() -> Self {
        Self
    }

    /// Quantity expressed in the base unit.
    ///
    /// No unit selected means the quantity is already in the base unit.
    pub fn to_base_quantity(&self, uom: Option<&Uom>, quantity: Decimal) -> Result<Decimal> {
        match uom {
            None => Ok(quantity),
            Some(uom) => money::div(quantity, Self::checked_factor(uom)?),
        }
    }

    /// Unit price applicable to one selected unit, derived from the base price
    pub fn to_base_unit_price(&self, uom: Option<&Uom>, price: Decimal) -> Result<Decimal> {
        match uom {
            None => Ok(price),
            Some(uom) => money::div(price, Self::checked_factor(uom)?),
        }
    }

    fn checked_factor(uom: &Uom) -> Result<Decimal> {
        if !uom.has_valid_factor() {
            return Err(AppError::invalid_unit(format!(
                "Unit '{}' ({}) has non-positive factor {}",
                uom.name, uom.id, uom.factor
            )));
        }

        Ok(uom.factor)
    }
}

impl Default for UnitConversion {
    fn default() -> Self {
        Self::new()
    }
}
