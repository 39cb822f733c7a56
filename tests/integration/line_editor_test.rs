// Interactive line edits resolved against the store

#[path = "../helpers/mod.rs"]
mod helpers;

use billtrust::core::AppError;
use billtrust::moves::services::{FieldEdit, LineState};
use helpers::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_product_unit_and_quantity_edits() {
    let services = services(seeded_store().await);
    let editor = &services.line_edit_service;

    let state = editor
        .apply(LineState::new(), FieldEdit::Product { product_id: PRODUCT_EGGS })
        .await
        .unwrap();
    assert_eq!(state.uom_id, Some(UOM_DOZENS));
    assert_eq!(state.price_unit, dec!(2.00));
    assert_eq!(state.product_uom_qty, dec!(0.08));
    assert_eq!(state.tax_ids, vec![TAX_VAT]);
    assert_eq!(state.price_subtotal, dec!(2.00));
    assert_eq!(state.price_tax, dec!(0.20));
    assert_eq!(state.price_total, dec!(2.20));

    let state = editor
        .apply(state, FieldEdit::Quantity { quantity: dec!(12) })
        .await
        .unwrap();
    assert_eq!(state.product_uom_qty, dec!(1.00));
    assert_eq!(state.price_subtotal, dec!(24.00));
    assert_eq!(state.price_total, dec!(26.40));

    let state = editor
        .apply(state, FieldEdit::Uom { uom_id: Some(UOM_UNITS) })
        .await
        .unwrap();
    assert_eq!(state.price_unit, dec!(24.00));
    assert_eq!(state.product_uom_qty, dec!(12.00));
    assert_eq!(state.price_subtotal, dec!(288.00));

    let state = editor
        .apply(state, FieldEdit::Discount { discount: dec!(50) })
        .await
        .unwrap();
    assert_eq!(state.price_subtotal, dec!(144.00));
    assert_eq!(state.price_tax, dec!(14.40));
}

#[tokio::test]
async fn test_tax_edit_recomputes_totals() {
    let services = services(seeded_store().await);
    let editor = &services.line_edit_service;

    let state = editor
        .apply(LineState::new(), FieldEdit::Product { product_id: PRODUCT_CHAIR })
        .await
        .unwrap();
    assert_eq!(state.price_total, dec!(50.00));

    let state = editor
        .apply(
            state,
            FieldEdit::Taxes {
                tax_ids: vec![TAX_VAT_ON_EXCISE, TAX_EXCISE],
            },
        )
        .await
        .unwrap();
    assert_eq!(state.tax_ids, vec![TAX_EXCISE, TAX_VAT_ON_EXCISE]);
    assert_eq!(state.price_tax, dec!(10.50));
    assert_eq!(state.price_total, dec!(60.50));
}

#[tokio::test]
async fn test_state_taxes_resolved_from_store() {
    let services = services(seeded_store().await);
    let editor = &services.line_edit_service;

    let mut state = editor
        .apply(LineState::new(), FieldEdit::Product { product_id: PRODUCT_CHAIR })
        .await
        .unwrap();
    state.tax_ids = vec![TAX_VAT];
    state.price_tax = dec!(999);

    let state = editor
        .apply(state, FieldEdit::Quantity { quantity: dec!(2) })
        .await
        .unwrap();
    assert_eq!(state.tax_ids, vec![TAX_VAT]);
    assert_eq!(state.price_subtotal, dec!(100.00));
    assert_eq!(state.price_tax, dec!(10.00));

    let mut dangling = state;
    dangling.tax_ids = vec![404];
    let err = editor
        .apply(dangling, FieldEdit::Discount { discount: dec!(5) })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingReference(_)));
}

#[tokio::test]
async fn test_quantity_without_product_only_stored() {
    let services = services(seeded_store().await);

    let state = services
        .line_edit_service
        .apply(LineState::new(), FieldEdit::Quantity { quantity: dec!(5) })
        .await
        .unwrap();

    assert_eq!(state.quantity, dec!(5));
    assert_eq!(state.product_uom_qty, Decimal::ZERO);
    assert_eq!(state.price_subtotal, Decimal::ZERO);
}

#[tokio::test]
async fn test_unresolved_references() {
    let services = services(seeded_store().await);
    let editor = &services.line_edit_service;

    let err = editor
        .apply(LineState::new(), FieldEdit::Product { product_id: 999 })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingReference(_)));

    let state = editor
        .apply(LineState::new(), FieldEdit::Product { product_id: PRODUCT_DESK })
        .await
        .unwrap();

    let err = editor
        .apply(state.clone(), FieldEdit::Uom { uom_id: Some(77) })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidUnit(_)));

    let err = editor
        .apply(state, FieldEdit::Taxes { tax_ids: vec![404] })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingReference(_)));
}

#[tokio::test]
async fn test_discount_out_of_range_rejected() {
    let services = services(seeded_store().await);

    let err = services
        .line_edit_service
        .apply(LineState::new(), FieldEdit::Discount { discount: dec!(120) })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}
