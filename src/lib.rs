pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod utils;
pub mod validation;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Config,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/orders",
            post(handlers::orders::create_order).get(handlers::orders::list_my_orders),
        )
        .route("/orders/:id", get(handlers::orders::get_order))
        .route("/orders/:id/status", put(handlers::orders::update_order_status))
        .route("/orders/:id/cancel", post(handlers::orders::cancel_order))
        .route("/admin/orders", get(handlers::admin::list_all_orders))
        .route("/seller/orders", get(handlers::seller::list_seller_orders))
        .route("/wallet/balance", get(handlers::wallet::get_balance))
        .route("/wallet/deposit", post(handlers::wallet::deposit))
        .route("/wallet/transactions", get(handlers::wallet::list_transactions))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
