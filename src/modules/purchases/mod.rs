pub mod controllers;
pub mod models;
pub mod services;

pub use models::{OrderState, PurchaseOrder, PurchaseOrderLine};
pub use services::BillService;
