pub mod line_controller;
pub mod move_controller;

use actix_web::web;

/// Configure every move and line route
pub fn configure(cfg: &mut web::ServiceConfig) {
    move_controller::configure(cfg);
    line_controller::configure(cfg);
}
