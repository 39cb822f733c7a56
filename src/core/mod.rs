pub mod context;
pub mod error;
pub mod money;

pub use context::RequestContext;
pub use error::{AppError, Result};
