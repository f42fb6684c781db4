pub mod clients;
pub mod config;
pub mod db;
pub mod errors;
mod http;
mod middleware;
pub mod models;
pub mod service;
mod state;

use axum::{Router, middleware as axum_middleware};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use crate::{
    clients::{PersistenceClient, RecommendationClient},
    config::Config,
    middleware::{cors_layer, create_global_rate_limiter, rate_limit_middleware},
    state::AppState,
};

pub async fn start_server() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env().expect("Environment misconfigured");

    let store = db::connect_store(&config)
        .await
        .expect("Failed to connect to the feedback store");

    let recommendation = RecommendationClient::new(config.recommendation_service_url.clone());

    // Config::from_env already rejected the enabled-but-unset combination.
    let reference_checker = if config.reference_checks_enabled {
        config
            .persistence_service_url
            .clone()
            .map(PersistenceClient::new)
    } else {
        None
    };

    let state = AppState {
        store,
        recommendation,
        reference_checker,
    };

    let global_rate_limiter = create_global_rate_limiter();

    let app = Router::new()
        .merge(http::create_http_routes(state))
        .layer(axum_middleware::from_fn(move |req, next| {
            rate_limit_middleware(global_rate_limiter.clone(), req, next)
        }))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .fallback(|| async { "404 Not Found" });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("Failed to bind address");

    tracing::info!("Feedback service listening on port {}", config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
