pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Product, Uom};
pub use repositories::{MySqlProductRepository, ProductRepository};
pub use services::UnitConversion;
