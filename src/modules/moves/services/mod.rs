pub mod line_calculator;
pub mod line_editor;
pub mod move_aggregator;
pub mod move_service;

pub use line_calculator::{LineCalculator, LineComputation, LineInput};
pub use line_editor::{FieldChange, FieldEdit, LineEditService, LineEditor, LineState};
pub use move_aggregator::{plan_aggregation, MoveAggregator};
pub use move_service::{MoveService, MAX_PAGE_SIZE};
