//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::{HttpResponse, error, web};

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/category/{category}", web::get().to(posts::posts_by_category))
                    .route("/search/{query}", web::get().to(posts::search_posts))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            ),
    );
}

/// Malformed JSON bodies become RFC 7807 bad requests.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| error::Error::from(AppError::BadRequest(err.to_string())))
}

/// Fallback for unmatched routes.
pub async fn route_not_found() -> AppResult<HttpResponse> {
    Err(AppError::NotFound("Route not found".to_string()))
}
