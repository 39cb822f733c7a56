use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account_move::{AccountMove, MoveType};
use super::move_line::MoveLine;

/// Product line as submitted by the editor.
///
/// Missing `uom_id`, `price_unit` and `tax_ids` default from the product the
/// same way selecting the product in the editor does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLineRequest {
    pub product_id: i64,
    #[serde(default)]
    pub uom_id: Option<i64>,
    pub quantity: Decimal,
    #[serde(default)]
    pub price_unit: Option<Decimal>,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub tax_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMoveRequest {
    pub move_type: MoveType,
    #[serde(default)]
    pub partner_id: Option<i64>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub invoice_origin: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default)]
    pub invoice_date_due: Option<NaiveDate>,
    /// Accounting date, today when omitted
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub invoice_payment_term_id: Option<i64>,
    /// Company currency from the request context when omitted
    #[serde(default)]
    pub currency_id: Option<i64>,
    #[serde(default)]
    pub lines: Vec<ProductLineRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceLinesRequest {
    pub lines: Vec<ProductLineRequest>,
}

/// Move with its lines, as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveResponse {
    #[serde(flatten)]
    pub account_move: AccountMove,
    pub is_editable: bool,
    pub lines: Vec<MoveLine>,
}

impl MoveResponse {
    pub fn new(account_move: AccountMove, lines: Vec<MoveLine>) -> Self {
        Self {
            is_editable: account_move.is_editable(),
            account_move,
            lines,
        }
    }
}
