//! HTTP handlers and route configuration.

mod auth;
mod blogs;
mod health;
mod seed;

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
                    .route("/signup", web::post().to(auth::signup))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Blog routes; /me/posts is registered before /{id} so it is
            // never captured as an id.
            .service(
                web::scope("/blogs")
                    .route("", web::get().to(blogs::list_published))
                    .route("", web::post().to(blogs::create))
                    .route("/me/posts", web::get().to(blogs::my_blogs))
                    .route("/{id}", web::get().to(blogs::get_by_id))
                    .route("/{id}", web::put().to(blogs::update))
                    .route("/{id}", web::delete().to(blogs::delete))
                    .route("/{id}/state", web::patch().to(blogs::update_state)),
            )
            // Demo tooling
            .service(
                web::scope("/seed")
                    .route("", web::post().to(seed::seed))
                    .route("", web::delete().to(seed::clear))
                    .route("/stats", web::get().to(seed::stats)),
            ),
    );
}
