use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use bitbucket_sync::clients::{BitbucketApiClient, GitCli, GitClient};
use bitbucket_sync::config::Config;
use bitbucket_sync::storage::memory::InMemoryStorage;
use bitbucket_sync::storage::Storage;
use bitbucket_sync::{api, AppState};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bitbucket_sync=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    let host = config.host.clone();
    let port = config.port;

    info!("Starting bitbucket-sync on {}:{}", host, port);
    info!("Bitbucket API URL: {}", config.bitbucket_api_url);
    info!("Git executable: {}", config.git_binary);
    info!("Connector assets directory: {}", config.assets_dir.display());
    match &config.sync_root {
        Some(root) => info!("Sync targets confined to {}", root.display()),
        None => warn!("SYNC_ROOT not set; sync targets may be any writable path"),
    }
    if let Some(max_pages) = config.max_pages {
        info!("Repository listing capped at {} pages", max_pages);
    }

    // Initialize clients
    let bitbucket_client = Arc::new(
        BitbucketApiClient::with_base_url(config.bitbucket_api_url.clone())
            .with_max_pages(config.max_pages),
    );
    let git_client: Arc<dyn GitClient> = Arc::new(GitCli::new(config.git_binary.clone()));

    // Initialize storage
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::with_retention(config.job_retention));

    let app_state = web::Data::new(AppState {
        config,
        storage,
        bitbucket_client,
        git_client,
        started_at: Instant::now(),
    });

    HttpServer::new(move || {
        // Configuration UI origins
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_origin("http://127.0.0.1:5173")
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(api::configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
