use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::core::{AppError, RequestContext, Result};
use crate::modules::moves::models::{CreateMoveRequest, MoveResponse, MoveType, ProductLineRequest};
use crate::modules::moves::services::MoveService;
use crate::modules::purchases::models::PurchaseOrder;

/// Build the draft vendor bill request for what is left to invoice on an order
pub fn bill_request_from_order(order: &PurchaseOrder) -> Result<CreateMoveRequest> {
    if !order.state.is_billable() {
        return Err(AppError::invalid_state(format!(
            "Purchase order {} is {} and cannot be billed",
            order.name, order.state
        )));
    }

    if order.qty_to_invoice()? <= Decimal::ZERO {
        return Err(AppError::invalid_input(format!(
            "Purchase order {} has nothing left to invoice",
            order.name
        )));
    }

    let lines = order
        .lines
        .iter()
        .filter(|l| l.qty_to_invoice > Decimal::ZERO)
        .map(|l| ProductLineRequest {
            product_id: l.product_id,
            uom_id: l.uom_id,
            quantity: l.qty_to_invoice,
            price_unit: Some(l.price_unit),
            discount: l.discount,
            tax_ids: Some(l.tax_ids.clone()),
        })
        .collect();

    Ok(CreateMoveRequest {
        move_type: MoveType::InInvoice,
        partner_id: order.partner_id,
        reference: None,
        invoice_origin: Some(order.name.clone()),
        invoice_date: None,
        invoice_date_due: None,
        date: None,
        invoice_payment_term_id: order.payment_term_id,
        currency_id: order.currency_id,
        lines,
    })
}

/// Creates vendor bills from purchase orders
pub struct BillService {
    moves: Arc<MoveService>,
}

impl BillService {
    pub fn new(moves: Arc<MoveService>) -> Self {
        Self { moves }
    }

    pub async fn create_from_order(
        &self,
        ctx: &RequestContext,
        order: &PurchaseOrder,
    ) -> Result<MoveResponse> {
        let request = bill_request_from_order(order)?;
        let bill = self.moves.create_move(ctx, request).await?;

        info!(
            order_id = order.id,
            order_name = %order.name,
            move_id = bill.account_move.id,
            "Created bill from purchase order"
        );

        Ok(bill)
    }
}
