pub mod models;
pub mod repositories;

pub use models::{DueTerm, PaymentTerm};
pub use repositories::{MySqlPaymentTermRepository, PaymentTermRepository};
