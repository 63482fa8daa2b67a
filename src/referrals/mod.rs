use crate::state::AppState;
use axum::Router;

pub mod code;
pub mod dto;
pub mod handlers;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::referral_routes()
}
