//! Administrative API for managing endpoint definitions.
//!
//! # Routes (relative to `admin.prefix`)
//! - `GET    /status`
//! - `GET    /endpoints`
//! - `POST   /endpoints`
//! - `GET    /endpoints/{id}`
//! - `PUT    /endpoints/{id}`
//! - `DELETE /endpoints/{id}`

pub mod auth;
pub mod error;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub use error::AdminError;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/endpoints", get(list_endpoints).post(create_endpoint))
        .route(
            "/endpoints/{id}",
            get(get_endpoint).put(update_endpoint).delete(delete_endpoint),
        )
        .layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
