pub mod move_repository;

pub use move_repository::{MoveRepository, MySqlMoveRepository};
