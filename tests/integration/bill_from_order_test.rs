// Vendor bills created from purchase orders

#[path = "../helpers/mod.rs"]
mod helpers;

use billtrust::core::AppError;
use billtrust::moves::{DisplayType, MoveState, MoveType};
use billtrust::purchases::{OrderState, PurchaseOrder, PurchaseOrderLine};
use helpers::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn order(state: OrderState, lines: Vec<PurchaseOrderLine>) -> PurchaseOrder {
    PurchaseOrder {
        id: 42,
        name: "PO/2026/00042".to_string(),
        state,
        partner_id: Some(7),
        currency_id: None,
        payment_term_id: Some(TERM_30_DAYS),
        lines,
    }
}

fn order_line(product_id: i64, qty_to_invoice: Decimal, price_unit: Decimal) -> PurchaseOrderLine {
    PurchaseOrderLine {
        product_id,
        uom_id: None,
        qty_to_invoice,
        price_unit,
        discount: Decimal::ZERO,
        tax_ids: vec![TAX_VAT],
    }
}

#[tokio::test]
async fn test_bill_created_from_confirmed_order() {
    let services = services(seeded_store().await);

    let po = order(
        OrderState::Purchase,
        vec![
            order_line(PRODUCT_DESK, dec!(2), dec!(100)),
            order_line(PRODUCT_CHAIR, Decimal::ZERO, dec!(50)),
            order_line(PRODUCT_CHAIR, dec!(1), dec!(50)),
        ],
    );

    let bill = services.bill_service.create_from_order(&ctx(), &po).await.unwrap();

    let account_move = &bill.account_move;
    assert_eq!(account_move.move_type, MoveType::InInvoice);
    assert_eq!(account_move.state, MoveState::Draft);
    assert_eq!(account_move.invoice_origin.as_deref(), Some("PO/2026/00042"));
    assert_eq!(account_move.partner_id, Some(7));
    assert_eq!(account_move.invoice_payment_term_id, Some(TERM_30_DAYS));
    assert!(account_move.name.starts_with("BILL/"));

    // Fully billed lines are skipped
    let products = lines_of(&bill.lines, DisplayType::Product);
    assert_eq!(products.len(), 2);
    assert_eq!(account_move.totals.amount_untaxed, dec!(250.00));
    assert_eq!(account_move.totals.amount_total, dec!(275.00));
    assert_eq!(account_move.totals.amount_total_signed, dec!(-275.00));
}

#[tokio::test]
async fn test_unconfirmed_order_rejected() {
    let services = services(seeded_store().await);

    for state in [OrderState::Draft, OrderState::Sent, OrderState::ToApprove, OrderState::Cancel] {
        let po = order(state, vec![order_line(PRODUCT_DESK, dec!(1), dec!(100))]);
        let err = services
            .bill_service
            .create_from_order(&ctx(), &po)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)), "state {}", state);
    }

    assert!(services.move_service.list_moves(10, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_order_with_nothing_to_invoice_rejected() {
    let services = services(seeded_store().await);

    let po = order(
        OrderState::Done,
        vec![order_line(PRODUCT_DESK, Decimal::ZERO, dec!(100))],
    );

    let err = services
        .bill_service
        .create_from_order(&ctx(), &po)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(services.move_service.list_moves(10, 0).await.unwrap().is_empty());
}
