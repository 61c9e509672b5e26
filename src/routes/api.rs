use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::AppState;
use crate::error::StoreError;
use crate::models::resources::ResourceKind;

#[derive(Debug, Deserialize)]
pub struct ClusterSelection {
    pub cluster: String,
}

#[derive(Debug, Deserialize)]
pub struct NamespaceSelection {
    pub namespace: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchSelection {
    #[serde(default)]
    pub term: String,
}

fn error_response(err: StoreError) -> Response {
    let status = match err {
        StoreError::InvalidCluster(_) => StatusCode::BAD_REQUEST,
        StoreError::UnknownKind(_) => StatusCode::NOT_FOUND,
    };
    (status, err.to_string()).into_response()
}

pub async fn handle_list_resources(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Response {
    match kind.parse::<ResourceKind>() {
        Ok(kind) => Json(state.store.filtered_resources(kind)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn handle_namespaces(State(state): State<AppState>) -> Response {
    Json(state.store.unique_namespaces()).into_response()
}

pub async fn handle_clusters(State(state): State<AppState>) -> Response {
    Json(state.store.clusters()).into_response()
}

pub async fn handle_reload_clusters(State(state): State<AppState>) -> Response {
    state.store.list_clusters().await;
    Json(state.store.clusters()).into_response()
}

pub async fn handle_select_cluster(
    State(state): State<AppState>,
    Json(body): Json<ClusterSelection>,
) -> Response {
    match state.store.set_cluster(body.cluster).await {
        Ok(()) => Json(state.store.status()).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn handle_select_namespace(
    State(state): State<AppState>,
    Json(body): Json<NamespaceSelection>,
) -> Response {
    state.store.set_namespace(body.namespace).await;
    Json(state.store.status()).into_response()
}

pub async fn handle_search(
    State(state): State<AppState>,
    Json(body): Json<SearchSelection>,
) -> Response {
    state.store.set_search_term(body.term);
    Json(state.store.status()).into_response()
}

pub async fn handle_refresh(State(state): State<AppState>) -> Response {
    state.store.refresh().await;
    Json(state.store.status()).into_response()
}

pub async fn handle_status(State(state): State<AppState>) -> Response {
    Json(state.store.status()).into_response()
}

pub async fn handle_summary(State(state): State<AppState>) -> Response {
    Json(state.store.summary()).into_response()
}

pub async fn handle_healthz() -> &'static str {
    "ok\n"
}
