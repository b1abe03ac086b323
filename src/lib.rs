pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod printer;
pub mod storage;

#[cfg(test)]
mod tests;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use config::Config;
use db::Database;
use error::AppError;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
}

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "restro-pos",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Business day
        .route("/business-day/open", post(handlers::business_day::open_day))
        .route("/business-day/close", post(handlers::business_day::close_day))
        .route("/business-day/current", get(handlers::business_day::current))
        // Orders
        .route("/order_id", get(handlers::orders::next_order_id))
        .route(
            "/orders",
            post(handlers::orders::place_order).get(handlers::orders::list_orders),
        )
        .route("/orders/:id", patch(handlers::orders::update_status))
        .route("/orders/:id/bill", post(handlers::orders::finalize_bill))
        // Purchases
        .route(
            "/purchase_categories",
            get(handlers::purchases::list_purchase_categories)
                .post(handlers::purchases::create_purchase_category),
        )
        .route(
            "/purchases",
            get(handlers::purchases::list_purchases).post(handlers::purchases::record_purchase),
        )
        // Sales
        .route("/sales", get(handlers::sales::history))
        .route("/sales/daily", get(handlers::sales::daily))
        // Dashboard stats
        .route("/stats/monthly-sales", get(handlers::stats::monthly_sales))
        .route("/stats/monthly-purchases", get(handlers::stats::monthly_purchases))
        .route("/stats/monthly-orders", get(handlers::stats::monthly_orders))
        .route("/stats/weekly-sales", get(handlers::stats::weekly_sales))
        .route("/stats/daily-sales", get(handlers::stats::daily_sales))
        // Printing
        .route("/print/kitchen", post(handlers::print::kitchen_ticket))
        // Menu
        .route("/menu", get(handlers::menu::menu))
        .route(
            "/categories",
            get(handlers::menu::list_categories).post(handlers::menu::create_category),
        )
        .route("/categories/:id", axum::routing::delete(handlers::menu::delete_category))
        .route("/items", post(handlers::menu::create_item))
        .route(
            "/items/:id",
            get(handlers::menu::get_item)
                .put(handlers::menu::update_item)
                .delete(handlers::menu::delete_item),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let db = Database::open(&config.db_path)?;
        db.initialize()?;

        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| AppError::Internal(format!("invalid listen address: {}", e)))?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::Internal(e.to_string())
        })?;
        let port = listener
            .local_addr()
            .map_err(|e| AppError::Internal(e.to_string()))?
            .port();

        tracing::info!("restro-pos listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState {
                db: Arc::new(db),
                config,
            },
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, router(self.state)).await
    }
}
