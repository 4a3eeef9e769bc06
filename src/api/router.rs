use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::health;
use super::home;
use super::middleware::logging_middleware;
use super::state::AppState;
use super::users;

/// Create the router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
