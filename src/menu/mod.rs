pub mod dto;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod model;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::menu_routes()
}
