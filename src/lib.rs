//! Billtrust: vendor bill and customer invoice computation service
//!
//! Line totals, multi-tax computation with base chaining, unit conversion
//! and document aggregation for account moves, behind a JSON HTTP API.

pub mod app;
pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use app::AppServices;
pub use modules::memory_store::MemoryStore;
pub use modules::moves;
pub use modules::payment_terms;
pub use modules::products;
pub use modules::purchases;
pub use modules::taxes;
