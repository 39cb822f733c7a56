// Document aggregation over the in-memory store
//
// Covers the synthetic payment-term and tax lines, the signed accumulators
// and the guarantee that a failed pass writes nothing.

#[path = "../helpers/mod.rs"]
mod helpers;

use billtrust::core::AppError;
use billtrust::moves::models::{MoveType, ReplaceLinesRequest};
use billtrust::moves::{DisplayType, MoveRepository};
use chrono::NaiveDate;
use helpers::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_bill_totals_and_synthetic_lines() {
    let services = services(seeded_store().await);

    let bill = services
        .move_service
        .create_move(
            &ctx(),
            bill_request(vec![line(PRODUCT_DESK, dec!(2), dec!(100), dec!(10), &[TAX_VAT])]),
        )
        .await
        .unwrap();

    let totals = bill.account_move.totals;
    assert_eq!(totals.amount_untaxed, dec!(180.00));
    assert_eq!(totals.amount_tax, dec!(18.00));
    assert_eq!(totals.amount_total, dec!(198.00));
    assert_eq!(totals.amount_residual, dec!(198.00));
    assert_eq!(totals.amount_total_signed, dec!(-198.00));
    assert_eq!(totals.amount_untaxed_signed, dec!(-180.00));

    assert_eq!(bill.lines.len(), 3);

    let product = lines_of(&bill.lines, DisplayType::Product)[0];
    assert_eq!(product.price_subtotal, dec!(180.00));
    assert_eq!(product.price_total, dec!(198.00));
    assert_eq!(product.debit, dec!(180.00));
    assert_eq!(product.amount_residual, Decimal::ZERO);

    let term = lines_of(&bill.lines, DisplayType::PaymentTerm)[0];
    assert_eq!(term.balance, dec!(-198.00));
    assert_eq!(term.credit, dec!(198.00));
    assert_eq!(term.amount_residual, dec!(-198.00));

    let vat = tax_line(&bill.lines, TAX_VAT).unwrap();
    assert_eq!(vat.debit, dec!(18.00));
    assert_eq!(vat.tax_base_amount, dec!(180.00));
    assert_eq!(vat.tax_group_id, Some(1));
    assert_eq!(vat.name, "VAT 10%");
}

#[tokio::test]
async fn test_customer_refund_is_a_payable() {
    let services = services(seeded_store().await);

    let refund = services
        .move_service
        .create_move(
            &ctx(),
            move_request(
                MoveType::OutRefund,
                vec![line(PRODUCT_CHAIR, dec!(1), dec!(50), dec!(0), &[])],
            ),
        )
        .await
        .unwrap();

    assert_eq!(refund.account_move.totals.amount_total, dec!(50.00));
    assert_eq!(refund.account_move.totals.amount_total_signed, dec!(-50.00));

    let term = lines_of(&refund.lines, DisplayType::PaymentTerm)[0];
    assert_eq!(term.credit, dec!(50.00));
    let product = lines_of(&refund.lines, DisplayType::Product)[0];
    assert_eq!(product.debit, dec!(50.00));
}

#[tokio::test]
async fn test_collect_totals_is_idempotent() {
    let services = services(seeded_store().await);

    let bill = services
        .move_service
        .create_move(
            &ctx(),
            bill_request(vec![
                line(PRODUCT_DESK, dec!(3), dec!(19.99), dec!(5), &[TAX_VAT, TAX_ECO_FEE]),
                line(PRODUCT_CHAIR, dec!(1), dec!(50), dec!(0), &[TAX_EXCISE, TAX_VAT_ON_EXCISE]),
            ]),
        )
        .await
        .unwrap();

    let first = services
        .move_service
        .collect_totals(&ctx(), bill.account_move.id)
        .await
        .unwrap();
    let second = services
        .move_service
        .collect_totals(&ctx(), bill.account_move.id)
        .await
        .unwrap();

    assert_eq!(first.account_move.totals, bill.account_move.totals);
    assert_eq!(second.account_move.totals, bill.account_move.totals);
    assert_eq!(first.lines, bill.lines);
    assert_eq!(second.lines, bill.lines);
}

#[tokio::test]
async fn test_shared_tax_produces_one_line() {
    let services = services(seeded_store().await);

    let bill = services
        .move_service
        .create_move(
            &ctx(),
            bill_request(vec![
                line(PRODUCT_DESK, dec!(1), dec!(100), dec!(0), &[TAX_VAT]),
                line(PRODUCT_CHAIR, dec!(2), dec!(25), dec!(0), &[TAX_VAT]),
            ]),
        )
        .await
        .unwrap();

    let tax_lines = lines_of(&bill.lines, DisplayType::Tax);
    assert_eq!(tax_lines.len(), 1);
    assert_eq!(tax_lines[0].tax_base_amount, dec!(150.00));
    assert_eq!(tax_lines[0].balance, dec!(15.00));
    assert_eq!(bill.account_move.totals.amount_tax, dec!(15.00));
}

#[tokio::test]
async fn test_chained_taxes_on_a_bill() {
    let services = services(seeded_store().await);

    let bill = services
        .move_service
        .create_move(
            &ctx(),
            bill_request(vec![line(
                PRODUCT_CHAIR,
                dec!(1),
                dec!(50),
                dec!(0),
                &[TAX_VAT_ON_EXCISE, TAX_EXCISE],
            )]),
        )
        .await
        .unwrap();

    assert_eq!(bill.account_move.totals.amount_tax, dec!(10.50));
    assert_eq!(bill.account_move.totals.amount_total, dec!(60.50));

    let excise = tax_line(&bill.lines, TAX_EXCISE).unwrap();
    assert_eq!(excise.balance, dec!(5.00));
    assert_eq!(excise.tax_base_amount, dec!(50.00));

    let vat = tax_line(&bill.lines, TAX_VAT_ON_EXCISE).unwrap();
    assert_eq!(vat.balance, dec!(5.50));
    assert_eq!(vat.tax_base_amount, dec!(55.00));

    // Tax lines follow tax sequence order
    assert!(excise.sort < vat.sort);
}

#[tokio::test]
async fn test_tax_line_removed_with_its_tax() {
    let services = services(seeded_store().await);

    let bill = services
        .move_service
        .create_move(
            &ctx(),
            bill_request(vec![line(PRODUCT_DESK, dec!(1), dec!(100), dec!(0), &[TAX_VAT])]),
        )
        .await
        .unwrap();
    assert!(tax_line(&bill.lines, TAX_VAT).is_some());

    let updated = services
        .move_service
        .replace_lines(
            &ctx(),
            bill.account_move.id,
            ReplaceLinesRequest {
                lines: vec![line(PRODUCT_DESK, dec!(1), dec!(100), dec!(0), &[])],
            },
        )
        .await
        .unwrap();

    assert!(lines_of(&updated.lines, DisplayType::Tax).is_empty());
    assert_eq!(updated.account_move.totals.amount_tax, Decimal::ZERO);
    assert_eq!(updated.account_move.totals.amount_total, dec!(100.00));

    // The payment-term line is the same row, rewritten
    let before = lines_of(&bill.lines, DisplayType::PaymentTerm)[0];
    let after = lines_of(&updated.lines, DisplayType::PaymentTerm)[0];
    assert_eq!(before.id, after.id);
    assert_eq!(after.balance, dec!(-100.00));
}

#[tokio::test]
async fn test_missing_tax_leaves_move_untouched() {
    let store = seeded_store().await;
    let services = services(store.clone());

    let bill = services
        .move_service
        .create_move(
            &ctx(),
            bill_request(vec![line(PRODUCT_DESK, dec!(2), dec!(100), dec!(10), &[TAX_VAT])]),
        )
        .await
        .unwrap();
    let move_id = bill.account_move.id;

    store.remove_tax(TAX_VAT).await;

    let err = services
        .move_service
        .collect_totals(&ctx(), move_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingReference(_)));

    let stored = MoveRepository::find_by_id(&*store, move_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.totals, bill.account_move.totals);
    assert_eq!(store.find_lines(move_id).await.unwrap(), bill.lines);
}

#[tokio::test]
async fn test_missing_unit_leaves_move_untouched() {
    let store = seeded_store().await;
    let services = services(store.clone());

    let bill = services
        .move_service
        .create_move(&ctx(), bill_request(vec![product_line(PRODUCT_EGGS, dec!(2))]))
        .await
        .unwrap();
    let move_id = bill.account_move.id;

    store.remove_uom(UOM_DOZENS).await;

    let err = services
        .move_service
        .collect_totals(&ctx(), move_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingReference(_)));

    let stored = MoveRepository::find_by_id(&*store, move_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.totals, bill.account_move.totals);
    assert_eq!(store.find_lines(move_id).await.unwrap(), bill.lines);
}

#[tokio::test]
async fn test_missing_payment_term_leaves_move_untouched() {
    let store = seeded_store().await;
    let services = services(store.clone());

    let mut request = bill_request(vec![line(PRODUCT_CHAIR, dec!(1), dec!(50), dec!(0), &[])]);
    request.invoice_payment_term_id = Some(TERM_30_DAYS);
    let bill = services.move_service.create_move(&ctx(), request).await.unwrap();

    store.remove_payment_term(TERM_30_DAYS).await;

    let err = services
        .move_service
        .collect_totals(&ctx(), bill.account_move.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingReference(_)));
    assert_eq!(
        store.find_lines(bill.account_move.id).await.unwrap(),
        bill.lines
    );
}

#[tokio::test]
async fn test_payment_term_sets_maturity() {
    let services = services(seeded_store().await);

    let mut request = bill_request(vec![line(PRODUCT_CHAIR, dec!(1), dec!(50), dec!(0), &[])]);
    request.invoice_date = NaiveDate::from_ymd_opt(2026, 1, 10);
    request.invoice_payment_term_id = Some(TERM_30_DAYS);

    let bill = services.move_service.create_move(&ctx(), request).await.unwrap();

    assert_eq!(bill.account_move.invoice_date_due, NaiveDate::from_ymd_opt(2026, 1, 10));

    let term = lines_of(&bill.lines, DisplayType::PaymentTerm)[0];
    assert_eq!(term.name, "30 Days");
    assert_eq!(term.date_maturity, NaiveDate::from_ymd_opt(2026, 2, 9));
}

#[tokio::test]
async fn test_empty_bill_keeps_zero_payment_term_line() {
    let services = services(seeded_store().await);

    let bill = services
        .move_service
        .create_move(&ctx(), bill_request(vec![]))
        .await
        .unwrap();

    assert_eq!(bill.account_move.totals.amount_total, Decimal::ZERO);
    let term_lines = lines_of(&bill.lines, DisplayType::PaymentTerm);
    assert_eq!(term_lines.len(), 1);
    assert_eq!(term_lines[0].balance, Decimal::ZERO);
    assert_eq!(term_lines[0].debit, Decimal::ZERO);
    assert_eq!(term_lines[0].credit, Decimal::ZERO);
}

#[tokio::test]
async fn test_untaxed_amount_is_sum_of_subtotals() {
    let services = services(seeded_store().await);

    let mut lines = Vec::new();
    for i in 1..=12i64 {
        let quantity = Decimal::new(i * 7 % 11 + 1, 0) / dec!(3);
        let price = Decimal::new(i * 1234 % 9973, 2);
        let discount = Decimal::new(i * 13 % 100, 0);
        let taxes: &[i64] = match i % 4 {
            0 => &[],
            1 => &[TAX_VAT],
            2 => &[TAX_EXCISE, TAX_VAT_ON_EXCISE],
            _ => &[TAX_VAT, TAX_ECO_FEE],
        };
        lines.push(line(PRODUCT_DESK, quantity, price, discount, taxes));
    }

    let bill = services
        .move_service
        .create_move(&ctx(), bill_request(lines))
        .await
        .unwrap();

    let products = lines_of(&bill.lines, DisplayType::Product);
    let subtotal: Decimal = products.iter().map(|l| l.price_subtotal).sum();
    let tax: Decimal = products.iter().map(|l| l.price_tax).sum();
    let totals = bill.account_move.totals;

    assert_eq!(totals.amount_untaxed, subtotal);
    assert_eq!(totals.amount_tax, tax);
    assert_eq!(totals.amount_total, totals.amount_untaxed + totals.amount_tax);

    let term = lines_of(&bill.lines, DisplayType::PaymentTerm)[0];
    assert_eq!(term.balance, -totals.amount_total);
    assert_eq!(totals.amount_total_signed, -totals.amount_total);
}
