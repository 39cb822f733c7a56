pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{AmountType, Tax, TaxGroup, TaxUse};
pub use repositories::{MySqlTaxRepository, TaxRepository};
pub use services::{ComputedTax, TaxCalculator, TaxComputation};
