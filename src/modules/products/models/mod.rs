mod product;
mod uom;

pub use product::Product;
pub use uom::Uom;
