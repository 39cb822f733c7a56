//! Tax lookup endpoints used by the line editor to populate tax pickers.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::taxes::models::TaxUse;
use crate::modules::taxes::repositories::TaxRepository;

#[derive(Debug, Deserialize)]
pub struct ListTaxesQuery {
    pub type_tax_use: Option<TaxUse>,
}

/// List taxes ordered by sequence
///
/// GET /taxes
pub async fn list_taxes(
    repository: web::Data<Arc<dyn TaxRepository>>,
    query: web::Query<ListTaxesQuery>,
) -> Result<HttpResponse, AppError> {
    let taxes = repository.list(query.type_tax_use).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "taxes": taxes,
    })))
}

/// Get tax by ID
///
/// GET /taxes/{id}
pub async fn get_tax_by_id(
    repository: web::Data<Arc<dyn TaxRepository>>,
    tax_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let tax_id = tax_id.into_inner();
    let tax = repository
        .find_by_id(tax_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Tax {} not found", tax_id)))?;

    Ok(HttpResponse::Ok().json(tax))
}

/// Configure tax routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/taxes")
            .route("", web::get().to(list_taxes))
            .route("/{id}", web::get().to(get_tax_by_id)),
    );
}
