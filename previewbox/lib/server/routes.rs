use axum::{
    routing::{get, post},
    Router,
};

use super::{handlers, state::ServerState};

//-------------------------------------------------------------------------------------------------
// Functions
//-------------------------------------------------------------------------------------------------

/// Creates a router with all API endpoints configured.
pub fn create_router(state: ServerState) -> Router {
    Router::new()
        .route("/spawn", post(handlers::spawn_handler))
        .route("/stop/{id}", post(handlers::stop_handler))
        .route("/exec/{id}", post(handlers::exec_handler))
        .route("/sandboxes", get(handlers::list_handler))
        .route("/sandboxes/{id}", get(handlers::get_handler))
        .with_state(state)
}
