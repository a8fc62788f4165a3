//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod health;
mod posts;

use actix_web::web;

use crate::middleware::error::AppError;

/// Malformed JSON bodies become RFC 7807 400s instead of plain text.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Static segments are registered before `/{id}` so they win.
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create))
                    .route("", web::get().to(posts::list))
                    .route("/tags", web::get().to(posts::by_tag))
                    .route("/filter", web::get().to(posts::filter))
                    .route("/popular-post", web::get().to(posts::popular))
                    .route("/search", web::get().to(posts::search))
                    .route("/category/{category_id}", web::get().to(posts::by_category))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/comments", web::post().to(posts::add_comment))
                    .route("/{id}/related", web::get().to(posts::related)),
            )
            .service(
                web::scope("/category")
                    .route("", web::post().to(categories::create))
                    .route("", web::get().to(categories::list))
                    .route("/{id}", web::get().to(categories::get))
                    .route("/{id}", web::put().to(categories::update))
                    .route("/{id}", web::delete().to(categories::delete)),
            ),
    );
}
