pub mod generation;
pub mod media;
pub mod pages;
pub mod responses;
pub mod sessions;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/api/styles", get(sessions::list_styles))
        .route("/api/sessions", post(sessions::create_session))
        .route(
            "/api/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/api/sessions/:id/image", post(media::upload_image))
        .route("/api/sessions/:id/style", post(sessions::select_style))
        .route("/api/sessions/:id/prompt", post(sessions::update_prompt))
        .route("/api/sessions/:id/generate", post(generation::generate))
        .route("/api/sessions/:id/refine", post(generation::refine))
        .route("/api/sessions/:id/download", get(media::download_result))
        .route("/api/previews/:handle", get(media::get_preview))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
