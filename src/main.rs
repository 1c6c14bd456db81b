use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use profile_scout::config::Settings;
use profile_scout::core::ProfileAggregator;
use profile_scout::error::handle_json_payload_error;
use profile_scout::routes::{self, AppState};
use profile_scout::services::GitHubClient;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("Configuration error: {}", e))
    })?;

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting Profile Scout service...");

    let client = GitHubClient::new(&settings.github).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, format!("GitHub client error: {}", e))
    })?;

    if client.has_token() {
        info!("GitHub client initialized with API token");
    } else {
        warn!("GITHUB_API_TOKEN not set: contribution stats will be empty and rate limits are lower");
    }

    let aggregator = ProfileAggregator::new(Arc::new(client), settings.github.language_concurrency);

    // Build application state
    let app_state = AppState {
        aggregator,
        upload: settings.upload.clone(),
        report: settings.report.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
