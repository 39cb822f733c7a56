use std::sync::Arc;

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::error::AppError;
use crate::core::money::round_display;
use crate::modules::products::repositories::ProductRepository;
use crate::modules::products::services::UnitConversion;

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// Converted values, exact and rounded for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub uom_id: i64,
    pub factor: Decimal,
    pub base_quantity: Option<Decimal>,
    pub display_quantity: Option<Decimal>,
    pub base_price: Option<Decimal>,
    pub display_price: Option<Decimal>,
}

/// Convert a quantity and/or unit price through a unit of measure
/// GET /uoms/{id}/convert?quantity=&price=
pub async fn convert(
    products: web::Data<Arc<dyn ProductRepository>>,
    path: web::Path<i64>,
    query: web::Query<ConvertQuery>,
) -> Result<HttpResponse, AppError> {
    let uom_id = path.into_inner();
    let uom = products
        .find_uom(uom_id)
        .await?
        .ok_or_else(|| AppError::invalid_unit(format!("Unit of measure {} does not exist", uom_id)))?;

    let conversion = UnitConversion::new();
    let base_quantity = query
        .quantity
        .map(|q| conversion.to_base_quantity(Some(&uom), q))
        .transpose()?;
    let base_price = query
        .price
        .map(|p| conversion.to_base_unit_price(Some(&uom), p))
        .transpose()?;

    Ok(HttpResponse::Ok().json(ConversionResponse {
        uom_id,
        factor: uom.factor,
        base_quantity,
        display_quantity: base_quantity.map(round_display),
        base_price,
        display_price: base_price.map(round_display),
    }))
}

/// Configure unit of measure routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/uoms").route("/{id}/convert", web::get().to(convert)));
}
