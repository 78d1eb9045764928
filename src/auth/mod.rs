use axum::Router;

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use middleware::{authenticate, CurrentUser};
pub use policy::authorize;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
