//! # El-Memoir API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting El-Memoir API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::from_config(&config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    state.connect_in_background();

    HttpServer::new(move || build_app(state.clone()))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}

/// Assemble the application: tracing, shared state, routes and the 404 fallback.
fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(TracingLogger::default())
        .app_data(web::Data::new(state))
        .app_data(handlers::json_config())
        .configure(handlers::configure_routes)
        .default_service(web::to(handlers::route_not_found))
}
