use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::handlers::responses::{not_found, session_not_found};
use crate::media::{self, PreviewHandle};
use crate::state::AppState;

pub const DOWNLOAD_FILENAME: &str = "ai-headshot.png";

/// Base64 payload from the browser's `FileReader.readAsDataURL`; the
/// data-URL prefix is tolerated and stripped.
#[derive(Debug, Deserialize)]
pub struct UploadBody {
    pub data: String,
    #[serde(default)]
    pub content_type: String,
}

pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UploadBody>,
) -> Response {
    let mut sessions = state.sessions.lock();
    let Some(session) = sessions.get_mut(&id) else {
        return session_not_found();
    };

    let asset = match media::ingest_upload(
        &body.content_type,
        &body.data,
        state.max_upload_bytes,
        &state.previews,
    ) {
        Ok(asset) => asset,
        Err(err) => return err.into_response(),
    };

    info!(
        "Session {id}: accepted {} upload",
        asset.content_type.mime_type()
    );
    session.select_image(asset, &state.previews);
    Json(session.snapshot()).into_response()
}

pub async fn get_preview(
    State(state): State<AppState>,
    Path(handle): Path<PreviewHandle>,
) -> Response {
    match state.previews.fetch(handle) {
        Some((bytes, content_type)) => (
            [(header::CONTENT_TYPE, content_type.mime_type())],
            bytes.as_ref().clone(),
        )
            .into_response(),
        None => not_found("Preview not found."),
    }
}

pub async fn download_result(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let (bytes, content_type) = {
        let sessions = state.sessions.lock();
        let Some(session) = sessions.get(&id) else {
            return session_not_found();
        };
        let Some(asset) = session.result_asset() else {
            return crate::error::AppError::validation("No generated image to download.")
                .into_response();
        };
        match asset.decode_bytes() {
            Ok(bytes) => (bytes, asset.content_type),
            Err(err) => return err.into_response(),
        }
    };

    (
        [
            (header::CONTENT_TYPE, content_type.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
