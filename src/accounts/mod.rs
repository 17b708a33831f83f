pub mod dto;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod model;
pub mod repo;
pub mod services;
pub mod validate;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::account_routes()
}
