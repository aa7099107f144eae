use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::handlers::responses::session_not_found;
use crate::session::Session;
use crate::state::AppState;
use crate::styles;

pub async fn create_session(State(state): State<AppState>) -> Response {
    let session_id = Uuid::new_v4().to_string();
    state
        .sessions
        .lock()
        .insert(session_id.clone(), Session::new());
    info!("Session {session_id} created");
    (StatusCode::CREATED, Json(json!({ "session_id": session_id }))).into_response()
}

pub async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let sessions = state.sessions.lock();
    match sessions.get(&id) {
        Some(session) => Json(session.snapshot()).into_response(),
        None => session_not_found(),
    }
}

pub async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let removed = state.sessions.lock().remove(&id);
    match removed {
        Some(session) => {
            session.end(&state.previews);
            info!("Session {id} ended");
            StatusCode::NO_CONTENT.into_response()
        }
        None => session_not_found(),
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectStyleBody {
    pub style_id: String,
}

pub async fn select_style(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SelectStyleBody>,
) -> Response {
    let Some(style) = styles::find(&body.style_id) else {
        return crate::error::AppError::validation(format!("Unknown style: {}", body.style_id))
            .into_response();
    };

    let mut sessions = state.sessions.lock();
    let Some(session) = sessions.get_mut(&id) else {
        return session_not_found();
    };
    session.select_style(style);
    Json(session.snapshot()).into_response()
}

/// Partial update of the three text inputs; absent fields keep their
/// current value.
#[derive(Debug, Deserialize)]
pub struct PromptBody {
    pub freeform_text: Option<String>,
    pub extra_instructions: Option<String>,
    pub refinement_text: Option<String>,
}

pub async fn update_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PromptBody>,
) -> Response {
    let mut sessions = state.sessions.lock();
    let Some(session) = sessions.get_mut(&id) else {
        return session_not_found();
    };

    if let Some(freeform_text) = body.freeform_text {
        session.set_freeform_text(freeform_text);
    }
    if let Some(extra_instructions) = body.extra_instructions {
        session.set_extra_instructions(extra_instructions);
    }
    if let Some(refinement_text) = body.refinement_text {
        session.set_refinement_text(refinement_text);
    }
    Json(session.snapshot()).into_response()
}

pub async fn list_styles() -> Response {
    Json(styles::all()).into_response()
}
