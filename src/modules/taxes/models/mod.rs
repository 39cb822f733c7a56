mod tax;

pub use tax::{AmountType, Tax, TaxGroup, TaxUse};
