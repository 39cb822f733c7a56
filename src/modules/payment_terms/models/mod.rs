mod payment_term;

pub use payment_term::{DueTerm, PaymentTerm};
