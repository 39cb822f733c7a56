mod purchase_order;

pub use purchase_order::{OrderState, PurchaseOrder, PurchaseOrderLine};
