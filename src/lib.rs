pub mod clients;
pub mod config;
pub mod error;
pub mod helpers;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use store::ResourceStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ResourceStore>,
}
