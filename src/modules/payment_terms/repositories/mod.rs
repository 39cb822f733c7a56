pub mod payment_term_repository;

pub use payment_term_repository::{MySqlPaymentTermRepository, PaymentTermRepository};
