use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account_move::{AccountMove, MoveState};
use crate::core::money::debit_credit;

/// Discriminates user-entered product lines from the synthetic lines the
/// aggregator maintains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayType {
    Product,
    Tax,
    PaymentTerm,
}

impl std::fmt::Display for DisplayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayType::Product => write!(f, "product"),
            DisplayType::Tax => write!(f, "tax"),
            DisplayType::PaymentTerm => write!(f, "payment_term"),
        }
    }
}

impl std::str::FromStr for DisplayType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "product" => Ok(DisplayType::Product),
            "tax" => Ok(DisplayType::Tax),
            "payment_term" => Ok(DisplayType::PaymentTerm),
            _ => Err(format!("Invalid display type: {}", s)),
        }
    }
}

/// Rounded amounts of one product line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineTotals {
    pub price_subtotal: Decimal,
    pub price_tax: Decimal,
    pub price_total: Decimal,
}

/// One row of a move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveLine {
    /// 0 until the repository stores the line
    pub id: i64,
    pub move_id: i64,
    pub move_name: String,
    pub name: String,
    pub display_type: DisplayType,
    pub sort: i32,

    // Product line inputs
    pub product_id: Option<i64>,
    pub uom_id: Option<i64>,
    pub quantity: Decimal,
    /// Quantity converted to the product's base unit, 2 dp
    pub product_uom_qty: Decimal,
    pub price_unit: Decimal,
    /// Percentage, 0..=100
    pub discount: Decimal,
    pub discount_date: Option<NaiveDate>,
    /// Applied taxes, ordered by tax sort
    pub tax_ids: Vec<i64>,

    // Product line results
    pub price_subtotal: Decimal,
    pub price_tax: Decimal,
    pub price_total: Decimal,

    // Tax line fields
    pub tax_line_id: Option<i64>,
    pub tax_group_id: Option<i64>,
    pub tax_base_amount: Decimal,

    // Accounting amounts
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
    pub amount_currency: Decimal,
    pub amount_residual: Decimal,
    pub amount_residual_currency: Decimal,

    /// Payment-term line only
    pub date_maturity: Option<NaiveDate>,
    pub date: NaiveDate,

    pub currency_id: i64,
    pub company_id: i64,
    pub partner_id: Option<i64>,
    pub parent_state: MoveState,
    pub creator_id: i64,
}

impl MoveLine {
    /// Empty line of `display_type` carrying the move's header fields
    pub fn for_move(
        account_move: &AccountMove,
        display_type: DisplayType,
        name: impl Into<String>,
        creator_id: i64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: 0,
            move_id: account_move.id,
            move_name: account_move.name.clone(),
            name: name.into(),
            display_type,
            sort: 0,
            product_id: None,
            uom_id: None,
            quantity: Decimal::ZERO,
            product_uom_qty: Decimal::ZERO,
            price_unit: Decimal::ZERO,
            discount: Decimal::ZERO,
            discount_date: None,
            tax_ids: vec![],
            price_subtotal: Decimal::ZERO,
            price_tax: Decimal::ZERO,
            price_total: Decimal::ZERO,
            tax_line_id: None,
            tax_group_id: None,
            tax_base_amount: Decimal::ZERO,
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
            balance: Decimal::ZERO,
            amount_currency: Decimal::ZERO,
            amount_residual: Decimal::ZERO,
            amount_residual_currency: Decimal::ZERO,
            date_maturity: None,
            date,
            currency_id: account_move.currency_id,
            company_id: account_move.company_id,
            partner_id: account_move.partner_id,
            parent_state: account_move.state,
            creator_id,
        }
    }

    pub fn is_product(&self) -> bool {
        self.display_type == DisplayType::Product
    }

    /// Set balance and the fields derived from it
    pub fn set_balance(&mut self, balance: Decimal) {
        let (debit, credit) = debit_credit(balance);
        self.balance = balance;
        self.debit = debit;
        self.credit = credit;
        self.amount_currency = balance;
    }

    /// Store computed totals on a product line. `sign` is the move's
    /// direction sign; product lines book the opposite side.
    pub fn apply_totals(&mut self, totals: &LineTotals, sign: Decimal) {
        self.price_subtotal = totals.price_subtotal;
        self.price_tax = totals.price_tax;
        self.price_total = totals.price_total;
        self.set_balance(-sign * totals.price_subtotal);
    }

    /// Refresh header fields copied from the move
    pub fn sync_header(&mut self, account_move: &AccountMove) {
        self.move_id = account_move.id;
        self.move_name = account_move.name.clone();
        self.currency_id = account_move.currency_id;
        self.company_id = account_move.company_id;
        self.partner_id = account_move.partner_id;
        self.parent_state = account_move.state;
    }
}
