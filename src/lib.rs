use axum::Router;
use axum::extract::State;
use axum::http::HeaderName;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routing_utils;


/// Data every request handler has access to
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    /// Header the identity layer uses to pass along the authenticated username
    pub auth_user_header: HeaderName,
}

pub type AppState = State<Arc<SharedData>>;

/// Assembles every route the service exposes, wrapped in HTTP tracing
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let router = Router::new()
        .nest("/tasks", api::task::task_routes())
        .merge(api::swagger_main::build_documentation())
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}
