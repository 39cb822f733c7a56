use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::core::RequestContext;
use crate::modules::purchases::models::PurchaseOrder;
use crate::modules::purchases::services::BillService;

/// Create a draft vendor bill from a confirmed purchase order
/// POST /bills/from-purchase-order
pub async fn create_bill_from_order(
    service: web::Data<Arc<BillService>>,
    ctx: RequestContext,
    order: web::Json<PurchaseOrder>,
) -> Result<HttpResponse, AppError> {
    let bill = service.create_from_order(&ctx, &order).await?;

    Ok(HttpResponse::Created().json(bill))
}

/// Configure bill routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bills").route("/from-purchase-order", web::post().to(create_bill_from_order)),
    );
}
