pub mod health;
pub mod memory_store;
pub mod moves;
pub mod payment_terms;
pub mod products;
pub mod purchases;
pub mod taxes;
