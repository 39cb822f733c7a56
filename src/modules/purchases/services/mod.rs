pub mod bill_service;

pub use bill_service::{bill_request_from_order, BillService};
