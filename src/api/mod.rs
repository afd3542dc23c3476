pub mod health;
pub mod bitbucket;
pub mod response;
pub mod sync_jobs;

use actix_web::web;

/// Configure all API routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Health endpoints
    cfg.service(
        web::scope("")
            .route("/health", web::get().to(health::health_check))
            .route("/status", web::get().to(health::status))
            // Bitbucket connector endpoints
            .service(
                web::scope("/api/connectors/bitbucket")
                    .route("/connection", web::get().to(bitbucket::get_connection))
                    .route("/icon", web::get().to(bitbucket::get_icon))
                    .route("/sync", web::post().to(bitbucket::start_sync))
            )
            // Sync job endpoints
            .service(
                web::scope("/api/sync/jobs")
                    .route("", web::get().to(sync_jobs::list_jobs))
                    .route("/{id}", web::get().to(sync_jobs::get_job))
            )
    );
}
