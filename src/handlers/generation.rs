use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use crate::error::AppError;
use crate::handlers::responses::session_not_found;
use crate::media;
use crate::state::AppState;
use crate::utils::timing::{complete_operation_timer, start_operation_timer};

#[derive(Debug, Clone, Copy)]
enum Operation {
    Generate,
    Refine,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Operation::Generate => "generate",
            Operation::Refine => "refine",
        }
    }
}

pub async fn generate(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    run_operation(state, id, Operation::Generate).await
}

pub async fn refine(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    run_operation(state, id, Operation::Refine).await
}

/// Dispatch under the lock, await without it, apply the outcome under the
/// lock again. The session's in-flight marker is what rejects a second
/// dispatch in the window where the lock is released.
async fn run_operation(state: AppState, id: String, operation: Operation) -> Response {
    let mut timer = start_operation_timer(operation.as_str(), &id);

    let request = {
        let mut sessions = state.sessions.lock();
        let Some(session) = sessions.get_mut(&id) else {
            complete_operation_timer(&mut timer, "not_found", None);
            return session_not_found();
        };
        let begun = match operation {
            Operation::Generate => session.begin_generate(),
            Operation::Refine => session.begin_refine(),
        };
        match begun {
            Ok(request) => request,
            Err(err) => {
                complete_operation_timer(&mut timer, "validation_error", Some(err.to_string()));
                return err.into_response();
            }
        }
    };

    let outcome = state
        .backend
        .generate(request)
        .await
        .map_err(AppError::from)
        .and_then(|image| {
            media::asset_from_generated(image.bytes, &image.mime_type, &state.previews)
                .map_err(AppError::from)
        });

    let mut sessions = state.sessions.lock();
    let Some(session) = sessions.get_mut(&id) else {
        // The session ended while the call was outstanding; drop the
        // fresh asset instead of leaking its preview handle.
        if let Ok(asset) = outcome {
            asset.release(&state.previews);
        }
        warn!("Session {id} ended during an outstanding {} call", operation.as_str());
        complete_operation_timer(&mut timer, "not_found", None);
        return session_not_found();
    };

    let failure = outcome.as_ref().err().map(|err| err.to_string());
    session.complete(outcome, &state.previews);

    match failure {
        Some(detail) => {
            complete_operation_timer(&mut timer, "error", Some(detail));
            (StatusCode::BAD_GATEWAY, Json(session.snapshot())).into_response()
        }
        None => {
            complete_operation_timer(&mut timer, "success", None);
            Json(session.snapshot()).into_response()
        }
    }
}
