pub mod error_handler;
pub mod request_context;

pub use error_handler::{json_error_handler, query_error_handler};
pub use request_context::{context_from_request, RequestId, RequestLogger};
