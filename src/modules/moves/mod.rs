pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{
    AccountMove, AggregationPlan, DisplayType, LineTotals, MoveLine, MoveState, MoveTotals,
    MoveType, PaymentState,
};
pub use repositories::{MoveRepository, MySqlMoveRepository};
pub use services::{
    LineCalculator, LineEditService, LineEditor, MoveAggregator, MoveService,
};
