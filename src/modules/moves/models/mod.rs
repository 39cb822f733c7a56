mod account_move;
mod aggregation;
mod move_line;
mod requests;

pub use account_move::{AccountMove, MoveState, MoveTotals, MoveType, PaymentState};
pub use aggregation::{AggregationPlan, TaxLineDiff};
pub use move_line::{DisplayType, LineTotals, MoveLine};
pub use requests::{CreateMoveRequest, MoveResponse, ProductLineRequest, ReplaceLinesRequest};
