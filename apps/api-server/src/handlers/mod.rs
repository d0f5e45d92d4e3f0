//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

use actix_web::web;

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
            // Post routes. "/posts/create" is registered before the
            // "{post_id}" routes so it never resolves as an id.
            .route("/posts", web::get().to(posts::index))
            .route("/posts/create", web::get().to(posts::post_create_form))
            .route("/posts/create", web::post().to(posts::post_create))
            .route("/posts/{post_id}", web::get().to(posts::post_detail))
            .route("/posts/{post_id}/edit", web::get().to(posts::post_edit_form))
            .route("/posts/{post_id}/edit", web::post().to(posts::post_edit))
            .route("/groups/{slug}", web::get().to(posts::group_list))
            .route("/profile/{username}", web::get().to(posts::profile)),
    );
}
