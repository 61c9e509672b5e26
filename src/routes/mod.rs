pub mod api;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Resource views
        .route("/api/resources/{kind}", get(api::handle_list_resources))
        .route("/api/namespaces", get(api::handle_namespaces))
        .route("/api/summary", get(api::handle_summary))
        .route("/api/status", get(api::handle_status))
        .route("/api/refresh", post(api::handle_refresh))
        // Clusters
        .route("/api/clusters", get(api::handle_clusters))
        .route("/api/clusters/refresh", post(api::handle_reload_clusters))
        // Selection
        .route("/api/selection/cluster", put(api::handle_select_cluster))
        .route("/api/selection/namespace", put(api::handle_select_namespace))
        .route("/api/selection/search", put(api::handle_search))
        // Health
        .route("/healthz", get(api::handle_healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
