use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::core::RequestContext;
use crate::modules::moves::models::{CreateMoveRequest, ReplaceLinesRequest};
use crate::modules::moves::services::MoveService;

/// Query parameters for listing moves
#[derive(Debug, Deserialize)]
pub struct ListMovesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Create a draft bill, invoice or refund
/// POST /moves
pub async fn create_move(
    service: web::Data<Arc<MoveService>>,
    ctx: RequestContext,
    request: web::Json<CreateMoveRequest>,
) -> Result<HttpResponse, AppError> {
    let account_move = service.create_move(&ctx, request.into_inner()).await?;

    Ok(HttpResponse::Created().json(account_move))
}

/// GET /moves
pub async fn list_moves(
    service: web::Data<Arc<MoveService>>,
    query: web::Query<ListMovesQuery>,
) -> Result<HttpResponse, AppError> {
    let moves = service.list_moves(query.limit, query.offset).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "moves": moves,
        "limit": query.limit,
        "offset": query.offset,
    })))
}

/// GET /moves/{id}
pub async fn get_move(
    service: web::Data<Arc<MoveService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let account_move = service.get_move(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(account_move))
}

/// GET /moves/{id}/lines
pub async fn get_lines(
    service: web::Data<Arc<MoveService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let lines = service.get_lines(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "lines": lines })))
}

/// Replace the product lines of a draft move
/// PUT /moves/{id}/lines
pub async fn replace_lines(
    service: web::Data<Arc<MoveService>>,
    ctx: RequestContext,
    path: web::Path<i64>,
    request: web::Json<ReplaceLinesRequest>,
) -> Result<HttpResponse, AppError> {
    let account_move = service
        .replace_lines(&ctx, path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(account_move))
}

/// POST /moves/{id}/collect-totals
pub async fn collect_totals(
    service: web::Data<Arc<MoveService>>,
    ctx: RequestContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let account_move = service.collect_totals(&ctx, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(account_move))
}

/// POST /moves/{id}/post
pub async fn post_move(
    service: web::Data<Arc<MoveService>>,
    ctx: RequestContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let account_move = service.post(&ctx, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(account_move))
}

/// POST /moves/{id}/cancel
pub async fn cancel_move(
    service: web::Data<Arc<MoveService>>,
    ctx: RequestContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let account_move = service.cancel(&ctx, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(account_move))
}

/// POST /moves/{id}/reset-to-draft
pub async fn reset_to_draft(
    service: web::Data<Arc<MoveService>>,
    ctx: RequestContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let account_move = service.reset_to_draft(&ctx, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(account_move))
}

/// Configure move routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/moves")
            .route("", web::post().to(create_move))
            .route("", web::get().to(list_moves))
            .route("/{id}", web::get().to(get_move))
            .route("/{id}/lines", web::get().to(get_lines))
            .route("/{id}/lines", web::put().to(replace_lines))
            .route("/{id}/collect-totals", web::post().to(collect_totals))
            .route("/{id}/post", web::post().to(post_move))
            .route("/{id}/cancel", web::post().to(cancel_move))
            .route("/{id}/reset-to-draft", web::post().to(reset_to_draft)),
    );
}
