use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/pins", pin_routes(config))
        .nest("/users", user_routes())
        .nest("/media", media_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn pin_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::pin::list_pins, handlers::pin::create_pin))
        .routes(routes!(handlers::pin::get_pin))
        .routes(routes!(handlers::pin::like_pin, handlers::pin::unlike_pin))
        .routes(routes!(handlers::pin::save_pin, handlers::pin::unsave_pin))
        .layer(handlers::pin::upload_body_limit(
            config.storage.max_image_size,
        ))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::get_user))
        .routes(routes!(handlers::user::created_pins))
        .routes(routes!(handlers::user::liked_pins))
        .routes(routes!(handlers::user::saved_pins))
}

fn media_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::media::get_media))
}
