//! Route definitions for the batch validation API.

pub mod auth;
pub mod health;
pub mod history;
pub mod products;
pub mod validation;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Room for multipart boundaries and text fields next to the image.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the full API router. CORS is layered on by the caller.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_image_bytes + MULTIPART_OVERHEAD_BYTES;

    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/users", get(auth::list_users).post(auth::create_user))
        .route("/auth/me", get(auth::me));

    let product_routes = Router::new()
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/barcode/{barcode}",
            get(products::get_by_barcode),
        )
        .route(
            "/products/{id}",
            get(products::get_by_id)
                .put(products::update)
                .delete(products::delete),
        );

    let validation_routes = Router::new()
        .route("/validate/barcode", post(validation::barcode))
        .route("/validate/batch", post(validation::batch))
        .route("/validate/manual", post(validation::manual))
        .route("/formats/check", post(validation::check_format));

    let history_routes = Router::new().route("/history", get(history::list));

    let api = Router::new()
        .merge(auth_routes)
        .merge(product_routes)
        .merge(validation_routes)
        .merge(history_routes);

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(body_limit))
                .layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
}
