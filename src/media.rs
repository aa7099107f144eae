use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::AppError;
use crate::llm::ImageGenerationError;

/// The image kinds the studio accepts and produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        match mime_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Webp => "image/webp",
        }
    }
}

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    infer::get(data).map(|kind| kind.mime_type().to_string())
}

/// Declared type first, sniffed magic bytes second; the first candidate
/// that maps to a supported kind wins.
fn resolve_image_kind(declared: &str, data: &[u8]) -> Option<ImageKind> {
    let mut candidates = Vec::new();
    if !declared.trim().is_empty() {
        candidates.push(declared.to_string());
    }
    if let Some(detected) = detect_mime_type(data) {
        candidates.push(detected);
    }

    candidates
        .iter()
        .find_map(|candidate| ImageKind::from_mime(candidate))
}

/// Browsers hand us `FileReader.readAsDataURL` output; the API only wants
/// the base64 tail.
pub fn strip_data_url_prefix(payload: &str) -> &str {
    if !payload.starts_with("data:") {
        return payload;
    }
    match payload.find("base64,") {
        Some(index) => &payload[index + "base64,".len()..],
        None => payload,
    }
}

pub type PreviewHandle = u64;

#[derive(Debug, Clone)]
struct PreviewEntry {
    bytes: Arc<Vec<u8>>,
    content_type: ImageKind,
}

/// Process-local registry backing `GET /api/previews/{handle}`. Every
/// live `ImageAsset` owns exactly one handle; releasing the handle is what
/// keeps long sessions from accumulating superseded images.
#[derive(Debug, Default)]
pub struct PreviewStore {
    entries: Mutex<HashMap<PreviewHandle, PreviewEntry>>,
    next_handle: AtomicU64,
}

impl PreviewStore {
    pub fn new() -> Self {
        PreviewStore::default()
    }

    pub fn register(&self, bytes: Vec<u8>, content_type: ImageKind) -> PreviewHandle {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries.lock().insert(
            handle,
            PreviewEntry {
                bytes: Arc::new(bytes),
                content_type,
            },
        );
        handle
    }

    pub fn fetch(&self, handle: PreviewHandle) -> Option<(Arc<Vec<u8>>, ImageKind)> {
        self.entries
            .lock()
            .get(&handle)
            .map(|entry| (Arc::clone(&entry.bytes), entry.content_type))
    }

    pub fn release(&self, handle: PreviewHandle) {
        self.entries.lock().remove(&handle);
    }

    pub fn live_count(&self) -> usize {
        self.entries.lock().len()
    }
}

/// An image's encoded content plus its local display handle. Superseded,
/// never mutated; whoever replaces one releases its preview.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub data: String,
    pub content_type: ImageKind,
    pub preview: PreviewHandle,
}

impl ImageAsset {
    pub fn release(&self, previews: &PreviewStore) {
        previews.release(self.preview);
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>, AppError> {
        general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|err| AppError::Unknown(format!("Stored image is not valid base64: {err}")))
    }
}

/// Validates an uploaded payload and turns it into an asset. Rejections
/// are all user-correctable and leave the store untouched.
pub fn ingest_upload(
    declared_type: &str,
    payload: &str,
    max_bytes: usize,
    previews: &PreviewStore,
) -> Result<ImageAsset, AppError> {
    let encoded = strip_data_url_prefix(payload.trim());
    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| AppError::validation("Uploaded image is not valid base64 data."))?;

    if bytes.is_empty() {
        return Err(AppError::validation("Uploaded image is empty."));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Uploaded image exceeds the {max_bytes} byte limit."
        )));
    }

    // A recognizable payload of an unsupported kind is rejected even when
    // the declared type claims otherwise.
    if let Some(detected) = detect_mime_type(&bytes) {
        if ImageKind::from_mime(&detected).is_none() {
            return Err(AppError::validation(
                "Please upload a valid image file (jpg, png, webp).",
            ));
        }
    }

    let Some(content_type) = resolve_image_kind(declared_type, &bytes) else {
        return Err(AppError::validation(
            "Please upload a valid image file (jpg, png, webp).",
        ));
    };

    let data = general_purpose::STANDARD.encode(&bytes);
    let preview = previews.register(bytes, content_type);
    Ok(ImageAsset {
        data,
        content_type,
        preview,
    })
}

/// Builds an asset from the generation service's output. An unsupported
/// returned type is a generation failure, not a weaker asset.
pub fn asset_from_generated(
    bytes: Vec<u8>,
    mime_type: &str,
    previews: &PreviewStore,
) -> Result<ImageAsset, ImageGenerationError> {
    let content_type = ImageKind::from_mime(mime_type)
        .or_else(|| detect_mime_type(&bytes).and_then(|mime| ImageKind::from_mime(&mime)))
        .ok_or_else(|| {
            ImageGenerationError(format!(
                "Service returned an unsupported content type: {mime_type}"
            ))
        })?;

    let data = general_purpose::STANDARD.encode(&bytes);
    let preview = previews.register(bytes, content_type);
    Ok(ImageAsset {
        data,
        content_type,
        preview,
    })
}
