use axum::{
    routing::{get, patch},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::storage::FoodStore;
use crate::ui::Icons;

pub mod routes;

/// Server state: one store, every request takes the lock
pub struct AppState {
    pub store: Mutex<FoodStore>,
    pub recent_limit: usize,
}

impl AppState {
    pub fn new(store: FoodStore, recent_limit: usize) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            recent_limit,
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/overview", get(routes::get_overview))
        .route("/recent", get(routes::get_recent))
        .route("/catalog", get(routes::list_catalog))
        .route("/catalog/all", get(routes::run_catalog))
        .route("/catalog/{number}", get(routes::run_catalog_query))
        .route("/analytics/{name}", get(routes::run_analytic))
        .route(
            "/providers",
            get(routes::list_providers).post(routes::add_provider),
        )
        .route("/providers/{id}", axum::routing::delete(routes::delete_provider))
        .route("/providers/{id}/contact", patch(routes::update_provider_contact))
        .route(
            "/receivers",
            get(routes::list_receivers).post(routes::add_receiver),
        )
        .route("/receivers/{id}", axum::routing::delete(routes::delete_receiver))
        .route("/receivers/{id}/contact", patch(routes::update_receiver_contact))
        .route(
            "/food-listings",
            get(routes::list_food_listings).post(routes::add_food_listing),
        )
        .route("/food-listings/options", get(routes::get_listing_options))
        .route("/food-listings/{id}", axum::routing::delete(routes::delete_food_listing))
        .route("/food-listings/{id}/quantity", patch(routes::update_food_quantity))
        .route("/claims", get(routes::list_claims).post(routes::add_claim))
        .route("/claims/{id}", axum::routing::delete(routes::delete_claim))
        .route("/claims/{id}/status", patch(routes::update_claim_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, store: FoodStore, recent_limit: usize) -> anyhow::Result<()> {
    let app = build_router(AppState::new(store, recent_limit));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);
    println!("{} Server running at http://{}", Icons::GLOBE, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
