use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product as seen by the billing core (read-only lookup)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,

    /// Sales price in the product's base unit
    pub price: Decimal,

    /// Purchase cost in the product's base unit, preferred over `price` when set
    #[serde(default)]
    pub cost: Option<Decimal>,

    /// Base unit of measure
    #[serde(default)]
    pub uom_id: Option<i64>,

    /// Default taxes proposed when the product is picked on a line
    #[serde(default)]
    pub tax_ids: Vec<i64>,
}

impl Product {
    /// Unit price proposed on a line before any UOM conversion
    pub fn base_unit_price(&self) -> Decimal {
        self.cost.unwrap_or(self.price)
    }
}
