pub mod unit_conversion;

pub use unit_conversion::UnitConversion;
