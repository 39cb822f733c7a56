use serde::{Deserialize, Serialize};

/// Actor and company context for an operation.
///
/// Passed explicitly to every operation that stamps creator, company or
/// currency on a record. The HTTP layer builds it from request headers
/// (see `middleware::request_context`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: i64,
    pub company_id: i64,
    pub default_currency_id: i64,
}

impl RequestContext {
    pub fn new(user_id: i64, company_id: i64, default_currency_id: i64) -> Self {
        Self {
            user_id,
            company_id,
            default_currency_id,
        }
    }
}
