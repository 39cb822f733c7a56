use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money;
use crate::core::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Draft,
    Sent,
    ToApprove,
    Purchase,
    Done,
    Cancel,
}

impl OrderState {
    /// Only confirmed or completed orders can be billed
    pub fn is_billable(&self) -> bool {
        matches!(self, OrderState::Purchase | OrderState::Done)
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderState::Draft => write!(f, "draft"),
            OrderState::Sent => write!(f, "sent"),
            OrderState::ToApprove => write!(f, "to_approve"),
            OrderState::Purchase => write!(f, "purchase"),
            OrderState::Done => write!(f, "done"),
            OrderState::Cancel => write!(f, "cancel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub product_id: i64,
    #[serde(default)]
    pub uom_id: Option<i64>,
    /// Received or ordered quantity not billed yet
    pub qty_to_invoice: Decimal,
    pub price_unit: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub tax_ids: Vec<i64>,
}

/// Snapshot of a purchase order as sent by the purchasing module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: i64,
    /// Order reference, e.g. `PO/2026/00042`
    pub name: String,
    pub state: OrderState,
    #[serde(default)]
    pub partner_id: Option<i64>,
    #[serde(default)]
    pub currency_id: Option<i64>,
    #[serde(default)]
    pub payment_term_id: Option<i64>,
    #[serde(default)]
    pub lines: Vec<PurchaseOrderLine>,
}

impl PurchaseOrder {
    pub fn qty_to_invoice(&self) -> Result<Decimal> {
        self.lines
            .iter()
            .try_fold(Decimal::ZERO, |sum, l| money::add(sum, l.qty_to_invoice))
    }
}
