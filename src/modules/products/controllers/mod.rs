pub mod uom_controller;

pub use uom_controller::configure;
