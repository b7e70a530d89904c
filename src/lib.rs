pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

use std::sync::Arc;

use repository::Repository;
use services::extraction::TextExtractor;

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub extractor: Arc<dyn TextExtractor>,
    pub config: config::AppConfig,
}
