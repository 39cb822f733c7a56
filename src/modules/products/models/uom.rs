use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Unit of measure with its ratio to the category's reference unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Uom {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub factor: Decimal,
}

impl Uom {
    pub fn new(id: i64, name: impl Into<String>, category_id: i64, factor: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            category_id,
            factor,
        }
    }

    /// A usable conversion factor is strictly positive
    pub fn has_valid_factor(&self) -> bool {
        self.factor > Decimal::ZERO
    }
}
