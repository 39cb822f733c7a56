//! Stateless line endpoints backing the interactive line editor.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::error::AppError;
use crate::modules::moves::services::{FieldEdit, LineCalculator, LineEditService, LineInput, LineState};
use crate::modules::taxes::repositories::{resolve_taxes, TaxRepository};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeLineRequest {
    pub quantity: Decimal,
    pub price_unit: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub tax_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditLineRequest {
    #[serde(default)]
    pub state: LineState,
    pub edit: FieldEdit,
}

/// Totals of one line with its per-tax detail
/// POST /lines/compute
pub async fn compute_line(
    taxes: web::Data<Arc<dyn TaxRepository>>,
    request: web::Json<ComputeLineRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    let line_taxes = resolve_taxes(taxes.get_ref().as_ref(), &request.tax_ids).await?;

    let input = LineInput::new(request.quantity, request.price_unit, request.discount, line_taxes);
    let computation = LineCalculator::new().compute(&input)?;

    Ok(HttpResponse::Ok().json(computation))
}

/// Apply one field edit to an editor line
/// POST /lines/edit
pub async fn edit_line(
    service: web::Data<Arc<LineEditService>>,
    request: web::Json<EditLineRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    let state = service.apply(request.state, request.edit).await?;

    Ok(HttpResponse::Ok().json(state))
}

/// Configure line routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/lines")
            .route("/compute", web::post().to(compute_line))
            .route("/edit", web::post().to(edit_line)),
    );
}
