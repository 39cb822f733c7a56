// Account move: a vendor bill, customer invoice or one of their refunds.
//
// A move owns its lines (see move_line.rs) and the amount accumulators the
// aggregator rewrites after every save. State runs draft -> posted -> cancel;
// only `reset_to_draft` goes back.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::move_line::LineTotals;
use crate::core::money;
use crate::core::{AppError, Result};

/// Kind of document, which fixes its debit/credit direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    /// Vendor bill
    InInvoice,
    /// Customer invoice
    OutInvoice,
    /// Vendor credit note
    InRefund,
    /// Customer credit note
    OutRefund,
}

impl MoveType {
    /// Sign applied to the `_signed` accumulators and to the payment-term line.
    ///
    /// Bills and customer refunds are payables (-1); invoices and vendor
    /// refunds are receivables (+1). Product and tax lines take the opposite sign.
    pub fn direction_sign(&self) -> Decimal {
        match self {
            MoveType::InInvoice | MoveType::OutRefund => Decimal::NEGATIVE_ONE,
            MoveType::OutInvoice | MoveType::InRefund => Decimal::ONE,
        }
    }

    /// Prefix of the document number sequence
    pub fn sequence_prefix(&self) -> &'static str {
        match self {
            MoveType::InInvoice => "BILL",
            MoveType::OutInvoice => "INV",
            MoveType::InRefund => "RBILL",
            MoveType::OutRefund => "RINV",
        }
    }
}

impl std::fmt::Display for MoveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveType::InInvoice => write!(f, "in_invoice"),
            MoveType::OutInvoice => write!(f, "out_invoice"),
            MoveType::InRefund => write!(f, "in_refund"),
            MoveType::OutRefund => write!(f, "out_refund"),
        }
    }
}

impl std::str::FromStr for MoveType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "in_invoice" => Ok(MoveType::InInvoice),
            "out_invoice" => Ok(MoveType::OutInvoice),
            "in_refund" => Ok(MoveType::InRefund),
            "out_refund" => Ok(MoveType::OutRefund),
            _ => Err(format!("Invalid move type: {}", s)),
        }
    }
}

/// Move lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    #[default]
    Draft,
    Posted,
    Cancel,
}

impl MoveState {
    /// Forward transitions. Going back to draft is a reset, not a transition.
    pub fn can_transition_to(&self, next: MoveState) -> bool {
        matches!(
            (self, next),
            (MoveState::Draft, MoveState::Posted)
                | (MoveState::Draft, MoveState::Cancel)
                | (MoveState::Posted, MoveState::Cancel)
        )
    }
}

impl std::fmt::Display for MoveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveState::Draft => write!(f, "draft"),
            MoveState::Posted => write!(f, "posted"),
            MoveState::Cancel => write!(f, "cancel"),
        }
    }
}

impl std::str::FromStr for MoveState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(MoveState::Draft),
            "posted" => Ok(MoveState::Posted),
            "cancel" => Ok(MoveState::Cancel),
            _ => Err(format!("Invalid move state: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    #[default]
    NotPaid,
    InPayment,
    Paid,
    Partial,
    Reversed,
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentState::NotPaid => write!(f, "not_paid"),
            PaymentState::InPayment => write!(f, "in_payment"),
            PaymentState::Paid => write!(f, "paid"),
            PaymentState::Partial => write!(f, "partial"),
            PaymentState::Reversed => write!(f, "reversed"),
        }
    }
}

impl std::str::FromStr for PaymentState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "not_paid" => Ok(PaymentState::NotPaid),
            "in_payment" => Ok(PaymentState::InPayment),
            "paid" => Ok(PaymentState::Paid),
            "partial" => Ok(PaymentState::Partial),
            "reversed" => Ok(PaymentState::Reversed),
            _ => Err(format!("Invalid payment state: {}", s)),
        }
    }
}

/// Document-level amount accumulators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveTotals {
    pub amount_untaxed: Decimal,
    pub amount_tax: Decimal,
    pub amount_total: Decimal,
    pub amount_residual: Decimal,
    pub amount_untaxed_signed: Decimal,
    pub amount_untaxed_in_currency_signed: Decimal,
    pub amount_tax_signed: Decimal,
    pub amount_total_signed: Decimal,
    pub amount_total_in_currency_signed: Decimal,
    pub amount_residual_signed: Decimal,
}

impl MoveTotals {
    /// Add one product line's totals; `sign` is the move's direction sign.
    ///
    /// Leaves `self` unchanged when a sum overflows.
    pub fn accumulate(&mut self, line: &LineTotals, sign: Decimal) -> Result<()> {
        let untaxed = money::add(self.amount_untaxed, line.price_subtotal)?;
        let tax = money::add(self.amount_tax, line.price_tax)?;
        let total = money::add(self.amount_total, line.price_total)?;
        let residual = money::add(self.amount_residual, line.price_total)?;

        let signed_subtotal = sign * line.price_subtotal;
        let signed_total = sign * line.price_total;
        let untaxed_signed = money::add(self.amount_untaxed_signed, signed_subtotal)?;
        let tax_signed = money::add(self.amount_tax_signed, sign * line.price_tax)?;
        let total_signed = money::add(self.amount_total_signed, signed_total)?;
        let residual_signed = money::add(self.amount_residual_signed, signed_total)?;

        *self = MoveTotals {
            amount_untaxed: untaxed,
            amount_tax: tax,
            amount_total: total,
            amount_residual: residual,
            amount_untaxed_signed: untaxed_signed,
            amount_untaxed_in_currency_signed: untaxed_signed,
            amount_tax_signed: tax_signed,
            amount_total_signed: total_signed,
            amount_total_in_currency_signed: total_signed,
            amount_residual_signed: residual_signed,
        };
        Ok(())
    }
}

/// Represents a bill, invoice or refund
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountMove {
    /// Set by the repository on creation
    pub id: i64,

    /// Document number, e.g. `BILL/2026/00001`
    pub name: String,
    pub move_type: MoveType,
    pub state: MoveState,
    pub payment_state: PaymentState,

    pub partner_id: Option<i64>,
    pub reference: Option<String>,

    /// Source document, e.g. the purchase order a bill was created from
    pub invoice_origin: Option<String>,

    pub invoice_date: Option<NaiveDate>,
    pub invoice_date_due: Option<NaiveDate>,

    /// Accounting date
    pub date: NaiveDate,

    pub invoice_payment_term_id: Option<i64>,
    pub currency_id: i64,
    pub company_id: i64,
    pub creator_id: i64,

    #[serde(flatten)]
    pub totals: MoveTotals,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountMove {
    /// Product lines can only be changed while the move is a draft
    pub fn is_editable(&self) -> bool {
        self.state == MoveState::Draft
    }

    pub fn ensure_editable(&self) -> Result<()> {
        if !self.is_editable() {
            return Err(AppError::invalid_state(format!(
                "Move {} is {} and its lines can no longer be edited",
                self.name, self.state
            )));
        }

        Ok(())
    }

    /// Due date the payment-term line matures from
    pub fn due_date(&self) -> NaiveDate {
        self.invoice_date_due
            .or(self.invoice_date)
            .unwrap_or(self.date)
    }

    /// Move to `next` if the lifecycle allows it
    pub fn transition_to(&mut self, next: MoveState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(AppError::invalid_state(format!(
                "Invalid state transition from {} to {}",
                self.state, next
            )));
        }

        self.state = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Back to draft from posted or cancelled
    pub fn reset_to_draft(&mut self) -> Result<()> {
        if self.state == MoveState::Draft {
            return Err(AppError::invalid_state(format!(
                "Move {} is already a draft",
                self.name
            )));
        }

        self.state = MoveState::Draft;
        self.updated_at = Utc::now();
        Ok(())
    }
}
