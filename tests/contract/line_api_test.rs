// Contract tests for the stateless line, unit, tax and health endpoints

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{http::StatusCode, test, App};
use helpers::*;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

macro_rules! init_app {
    () => {{
        let services = services(seeded_store().await);
        test::init_service(App::new().configure(move |cfg| services.configure(cfg))).await
    }};
}

#[actix_web::test]
async fn test_compute_line() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/lines/compute")
        .set_json(json!({
            "quantity": "1",
            "price_unit": "50",
            "tax_ids": [TAX_VAT_ON_EXCISE, TAX_EXCISE]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(decimal(&body["totals"]["price_subtotal"]), dec!(50));
    assert_eq!(decimal(&body["totals"]["price_tax"]), dec!(10.50));
    assert_eq!(decimal(&body["totals"]["price_total"]), dec!(60.50));

    let computed = body["taxes"]["taxes_computed"].as_array().unwrap();
    assert_eq!(computed.len(), 2);
    assert_eq!(computed[0]["tax_id"], TAX_EXCISE);
    assert_eq!(decimal(&computed[1]["tax_base_amount"]), dec!(55));
}

#[actix_web::test]
async fn test_compute_line_errors() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/lines/compute")
        .set_json(json!({ "quantity": "1", "price_unit": "10", "tax_ids": [404] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/lines/compute")
        .set_json(json!({ "quantity": "-1", "price_unit": "10" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_error_body(&body, 400);
}

#[actix_web::test]
async fn test_edit_line_sequence() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/lines/edit")
        .set_json(json!({
            "state": { "quantity": "1" },
            "edit": { "field": "product", "product_id": PRODUCT_EGGS }
        }))
        .to_request();
    let state: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(state["uom_id"], UOM_DOZENS);
    assert_eq!(decimal(&state["price_unit"]), dec!(2));
    assert_eq!(decimal(&state["product_uom_qty"]), dec!(0.08));
    assert_eq!(state["tax_ids"], json!([TAX_VAT]));

    let req = test::TestRequest::post()
        .uri("/lines/edit")
        .set_json(json!({
            "state": state,
            "edit": { "field": "quantity", "quantity": "24" }
        }))
        .to_request();
    let state: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(decimal(&state["product_uom_qty"]), dec!(2));
    assert_eq!(decimal(&state["price_total"]), dec!(52.80));

    let req = test::TestRequest::post()
        .uri("/lines/edit")
        .set_json(json!({
            "state": state,
            "edit": { "field": "uom", "uom_id": 77 }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let mut dangling = state.clone();
    dangling["tax_ids"] = json!([404]);
    let req = test::TestRequest::post()
        .uri("/lines/edit")
        .set_json(json!({
            "state": dangling,
            "edit": { "field": "discount", "discount": "5" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_convert_through_unit() {
    let app = init_app!();

    let req = test::TestRequest::get()
        .uri(&format!("/uoms/{}/convert?quantity=1&price=24", UOM_DOZENS))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(decimal(&body["factor"]), dec!(12));
    assert_eq!(decimal(&body["display_quantity"]), dec!(0.08));
    assert_eq!(decimal(&body["display_price"]), dec!(2));

    let req = test::TestRequest::get()
        .uri("/uoms/77/convert?quantity=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_list_and_get_taxes() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/taxes").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let ids: Vec<i64> = body["taxes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![TAX_EXCISE, TAX_VAT_ON_EXCISE, TAX_VAT, TAX_ECO_FEE]);

    let req = test::TestRequest::get()
        .uri(&format!("/taxes/{}", TAX_VAT))
        .to_request();
    let tax: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tax["name"], "VAT 10%");

    let req = test::TestRequest::get().uri("/taxes/404").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_health_and_readiness() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");

    let req = test::TestRequest::get().uri("/ready").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["database"], "not_configured");
}
