pub mod tax_repository;

pub use tax_repository::{resolve_taxes, MySqlTaxRepository, TaxRepository};
