//! DermaScan backend
//!
//! Cosmetic skin health assessment service: face photo analysis with
//! rule-based skincare recommendations and lifestyle risk screening.
//!
//! ⚠️ DISCLAIMER:
//! This system is NOT a medical diagnostic tool.

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod engine;
mod error;
mod handlers;
mod inference;
mod models;
mod normalize;
mod report;
mod state;
mod validation;

use crate::config::Settings;
use crate::inference::ModelRegistry;
use crate::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env
    dotenv::dotenv().ok();

    // Logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dermascan=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();

    // Load configuration
    let settings = Settings::from_env().expect("Failed to load configuration");
    let bind_address = format!("{}:{}", settings.server.host, settings.server.port);

    info!("Starting DermaScan backend");
    info!("Binding server to {}", bind_address);

    // Model registry: deterministic startup-time initialization.
    // A configured-but-missing model directory aborts here instead of
    // failing per-request.
    let registry =
        ModelRegistry::initialize(&settings.models).expect("Failed to initialize model registry");

    let app_state = AppState::new(registry, settings.upload.clone());

    // ---------------------------------------------------------------------
    // HTTP server
    // ---------------------------------------------------------------------
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
