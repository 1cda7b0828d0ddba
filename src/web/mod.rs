use axum::{Router, http::Method, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::services::SubscriptionService;

pub use crate::web::error::AppError;
use crate::web::routes::subscription_routes;

pub mod docs;
pub mod error;
pub mod models;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub subscription_service: Arc<SubscriptionService>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = String, content_type = "text/plain"))
)]
async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(subscription_service: Arc<SubscriptionService>) -> Router {
    let app_state = Arc::new(AppState {
        subscription_service,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .merge(subscription_routes::create_subscriptions_router())
        .merge(docs::swagger_ui())
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
