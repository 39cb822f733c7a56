//! Wiring of repositories, services and routes.

use std::sync::Arc;

use actix_web::web;
use sqlx::MySqlPool;

use crate::config::DefaultsConfig;
use crate::middleware::{json_error_handler, query_error_handler};
use crate::modules::health;
use crate::modules::memory_store::MemoryStore;
use crate::modules::moves::{self, MoveRepository, MySqlMoveRepository};
use crate::modules::moves::services::{LineEditService, MoveService};
use crate::modules::payment_terms::{MySqlPaymentTermRepository, PaymentTermRepository};
use crate::modules::products::{self, MySqlProductRepository, ProductRepository};
use crate::modules::purchases::{self, BillService};
use crate::modules::taxes::{self, MySqlTaxRepository, TaxRepository};

/// Everything the HTTP handlers need, built once per process
#[derive(Clone)]
pub struct AppServices {
    pub moves: Arc<dyn MoveRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub taxes: Arc<dyn TaxRepository>,
    pub payment_terms: Arc<dyn PaymentTermRepository>,
    pub move_service: Arc<MoveService>,
    pub line_edit_service: Arc<LineEditService>,
    pub bill_service: Arc<BillService>,
    pub defaults: DefaultsConfig,
    pool: Option<MySqlPool>,
}

impl AppServices {
    pub fn new(
        moves: Arc<dyn MoveRepository>,
        products: Arc<dyn ProductRepository>,
        taxes: Arc<dyn TaxRepository>,
        payment_terms: Arc<dyn PaymentTermRepository>,
        defaults: DefaultsConfig,
    ) -> Self {
        let move_service = Arc::new(MoveService::new(
            moves.clone(),
            products.clone(),
            taxes.clone(),
            payment_terms.clone(),
        ));
        let line_edit_service = Arc::new(LineEditService::new(products.clone(), taxes.clone()));
        let bill_service = Arc::new(BillService::new(move_service.clone()));

        Self {
            moves,
            products,
            taxes,
            payment_terms,
            move_service,
            line_edit_service,
            bill_service,
            defaults,
            pool: None,
        }
    }

    /// Every repository backed by one MySQL pool
    pub fn mysql(pool: MySqlPool, defaults: DefaultsConfig) -> Self {
        let mut services = Self::new(
            Arc::new(MySqlMoveRepository::new(pool.clone())),
            Arc::new(MySqlProductRepository::new(pool.clone())),
            Arc::new(MySqlTaxRepository::new(pool.clone())),
            Arc::new(MySqlPaymentTermRepository::new(pool.clone())),
            defaults,
        );
        services.pool = Some(pool);
        services
    }

    /// Every repository backed by the same in-memory store
    pub fn in_memory(store: Arc<MemoryStore>, defaults: DefaultsConfig) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            defaults,
        )
    }

    /// Register shared data and every route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::Data::new(self.defaults))
            .app_data(web::Data::new(self.products.clone()))
            .app_data(web::Data::new(self.taxes.clone()))
            .app_data(web::Data::new(self.move_service.clone()))
            .app_data(web::Data::new(self.line_edit_service.clone()))
            .app_data(web::Data::new(self.bill_service.clone()));

        if let Some(pool) = &self.pool {
            cfg.app_data(web::Data::new(pool.clone()));
        }

        health::controllers::configure(cfg);
        taxes::controllers::configure(cfg);
        products::controllers::configure(cfg);
        moves::controllers::configure(cfg);
        purchases::controllers::configure(cfg);
    }
}
