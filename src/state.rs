use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::llm::GenerationBackend;
use crate::media::PreviewStore;
use crate::session::Session;

/// Shared handler state: live sessions, the preview registry, and the
/// generation backend. The session lock is never held across an await;
/// the per-session in-flight marker is what serializes dispatches.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<Mutex<HashMap<String, Session>>>,
    pub previews: Arc<PreviewStore>,
    pub backend: Arc<dyn GenerationBackend>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(backend: Arc<dyn GenerationBackend>, max_upload_bytes: usize) -> Self {
        AppState {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            previews: Arc::new(PreviewStore::new()),
            backend,
            max_upload_bytes,
        }
    }
}
