use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod model;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::application_routes()
}
