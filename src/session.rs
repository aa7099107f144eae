use serde::Serialize;

use crate::error::AppError;
use crate::llm::GenerationRequest;
use crate::media::{ImageAsset, PreviewHandle, PreviewStore};
use crate::prompt::compose_prompt;
use crate::styles::StyleTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingStyle,
    Ready,
    Generating,
    Generated,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlightKind {
    Generate,
    Refine,
}

/// One user's interactive state. Transitions are synchronous; the single
/// suspension point (the backend call) happens between `begin_*` and
/// `complete`, guarded by the in-flight marker rather than a lock.
#[derive(Debug, Default)]
pub struct Session {
    source: Option<ImageAsset>,
    result: Option<ImageAsset>,
    selected_style: Option<&'static StyleTemplate>,
    freeform_text: String,
    extra_instructions: String,
    refinement_text: String,
    in_flight: Option<InFlightKind>,
    last_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub is_busy: bool,
    pub style_id: Option<&'static str>,
    pub freeform_text: String,
    pub extra_instructions: String,
    pub refinement_text: String,
    pub source_preview: Option<PreviewHandle>,
    pub result_preview: Option<PreviewHandle>,
    pub last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Replaces the uploaded photo. Allowed in any phase; the previous
    /// source and any stale result are released along the way.
    pub fn select_image(&mut self, asset: ImageAsset, previews: &PreviewStore) {
        if let Some(old) = self.source.replace(asset) {
            old.release(previews);
        }
        if let Some(old) = self.result.take() {
            old.release(previews);
        }
        self.last_error = None;
    }

    pub fn select_style(&mut self, style: &'static StyleTemplate) {
        self.selected_style = Some(style);
        // Extra instructions belong to the previously selected template.
        self.extra_instructions.clear();
        self.last_error = None;
    }

    pub fn set_freeform_text(&mut self, text: String) {
        self.freeform_text = text;
    }

    pub fn set_extra_instructions(&mut self, text: String) {
        self.extra_instructions = text;
    }

    pub fn set_refinement_text(&mut self, text: String) {
        self.refinement_text = text;
    }

    /// Validates and dispatches a generation from the uploaded photo.
    /// Rejections never touch the in-flight marker.
    pub fn begin_generate(&mut self) -> Result<GenerationRequest, AppError> {
        self.ensure_not_busy()?;

        let (Some(source), Some(style)) = (self.source.as_ref(), self.selected_style) else {
            return Err(AppError::validation(
                "Please upload an image and select a style.",
            ));
        };

        let instruction = compose_prompt(style, &self.freeform_text, &self.extra_instructions)
            .map_err(|err| AppError::validation(err.to_string()))?;

        self.in_flight = Some(InFlightKind::Generate);
        self.last_error = None;
        Ok(GenerationRequest {
            image_data: source.data.clone(),
            content_type: source.content_type,
            instruction,
        })
    }

    /// Validates and dispatches a refinement. The input image is always
    /// the most recent result, never the original upload, so edits chain.
    pub fn begin_refine(&mut self) -> Result<GenerationRequest, AppError> {
        self.ensure_not_busy()?;

        let refinement = self.refinement_text.trim();
        let Some(result) = self.result.as_ref() else {
            return Err(AppError::validation("Please add a refinement instruction."));
        };
        if refinement.is_empty() {
            return Err(AppError::validation("Please add a refinement instruction."));
        }

        let request = GenerationRequest {
            image_data: result.data.clone(),
            content_type: result.content_type,
            instruction: refinement.to_string(),
        };
        self.in_flight = Some(InFlightKind::Refine);
        self.last_error = None;
        Ok(request)
    }

    /// Applies the outcome of the outstanding call. The busy marker clears
    /// on both paths; a failure leaves the prior result untouched and, for
    /// refinements, keeps the instruction text so the user can retry.
    pub fn complete(&mut self, outcome: Result<ImageAsset, AppError>, previews: &PreviewStore) {
        let kind = self.in_flight.take();
        match outcome {
            Ok(asset) => {
                if let Some(old) = self.result.replace(asset) {
                    old.release(previews);
                }
                self.last_error = None;
                if kind == Some(InFlightKind::Refine) {
                    self.refinement_text.clear();
                }
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
            }
        }
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight.is_some() {
            return Phase::Generating;
        }
        if self.last_error.is_some() {
            return Phase::Failed;
        }
        if self.result.is_some() {
            return Phase::Generated;
        }
        match (self.source.as_ref(), self.selected_style) {
            (Some(_), Some(style)) => {
                if compose_prompt(style, &self.freeform_text, &self.extra_instructions).is_ok() {
                    Phase::Ready
                } else {
                    Phase::AwaitingStyle
                }
            }
            (Some(_), None) => Phase::AwaitingStyle,
            _ => Phase::Idle,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn result_asset(&self) -> Option<&ImageAsset> {
        self.result.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            is_busy: self.is_busy(),
            style_id: self.selected_style.map(|style| style.id),
            freeform_text: self.freeform_text.clone(),
            extra_instructions: self.extra_instructions.clone(),
            refinement_text: self.refinement_text.clone(),
            source_preview: self.source.as_ref().map(|asset| asset.preview),
            result_preview: self.result.as_ref().map(|asset| asset.preview),
            last_error: self.last_error.clone(),
        }
    }

    /// Ending the session returns every live preview handle.
    pub fn end(self, previews: &PreviewStore) {
        if let Some(asset) = self.source {
            asset.release(previews);
        }
        if let Some(asset) = self.result {
            asset.release(previews);
        }
    }

    fn ensure_not_busy(&self) -> Result<(), AppError> {
        if self.in_flight.is_some() {
            return Err(AppError::validation(
                "Another generation is already in progress.",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose, Engine as _};

    use super::*;
    use crate::media::test_fixtures::{jpeg_bytes, png_bytes};
    use crate::media::{ingest_upload, ImageKind, PreviewStore};
    use crate::styles;

    const MAX: usize = 10 * 1024 * 1024;

    fn uploaded_png(previews: &PreviewStore) -> ImageAsset {
        let payload = general_purpose::STANDARD.encode(png_bytes());
        ingest_upload("image/png", &payload, MAX, previews).unwrap()
    }

    fn generated_asset(previews: &PreviewStore, bytes: &[u8]) -> ImageAsset {
        ImageAsset {
            data: general_purpose::STANDARD.encode(bytes),
            content_type: ImageKind::Png,
            preview: previews.register(bytes.to_vec(), ImageKind::Png),
        }
    }

    #[test]
    fn phases_progress_from_idle_through_ready() {
        let previews = PreviewStore::new();
        let mut session = Session::new();
        assert_eq!(session.phase(), Phase::Idle);

        session.select_image(uploaded_png(&previews), &previews);
        assert_eq!(session.phase(), Phase::AwaitingStyle);

        session.select_style(styles::find("linkedin").unwrap());
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn open_style_is_not_ready_until_freeform_text_arrives() {
        let previews = PreviewStore::new();
        let mut session = Session::new();
        session.select_image(uploaded_png(&previews), &previews);
        session.select_style(styles::find(styles::OPEN_STYLE_ID).unwrap());
        assert_eq!(session.phase(), Phase::AwaitingStyle);

        session.set_freeform_text("as a watercolor portrait".to_string());
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn generate_without_an_image_is_rejected_and_never_busy() {
        let mut session = Session::new();
        let err = session.begin_generate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!session.is_busy());
    }

    #[test]
    fn open_style_with_empty_freeform_is_rejected_and_never_busy() {
        let previews = PreviewStore::new();
        let mut session = Session::new();
        session.select_image(uploaded_png(&previews), &previews);
        session.select_style(styles::find(styles::OPEN_STYLE_ID).unwrap());

        let err = session.begin_generate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!session.is_busy());
    }

    #[test]
    fn generate_composes_the_template_with_extra_instructions() {
        let previews = PreviewStore::new();
        let mut session = Session::new();
        session.select_image(uploaded_png(&previews), &previews);
        let style = styles::find("linkedin").unwrap();
        session.select_style(style);
        session.set_extra_instructions("wearing glasses".to_string());

        let request = session.begin_generate().unwrap();
        assert_eq!(
            request.instruction,
            format!("{}. wearing glasses", style.instruction)
        );
        assert_eq!(request.content_type, ImageKind::Png);
        assert!(session.is_busy());
        assert_eq!(session.phase(), Phase::Generating);
    }

    #[test]
    fn a_second_dispatch_is_rejected_while_one_is_outstanding() {
        let previews = PreviewStore::new();
        let mut session = Session::new();
        session.select_image(uploaded_png(&previews), &previews);
        session.select_style(styles::find("studio").unwrap());

        session.begin_generate().unwrap();
        let err = session.begin_generate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(session.is_busy());

        session.set_refinement_text("darker".to_string());
        assert!(session.begin_refine().is_err());
    }

    #[test]
    fn success_replaces_the_result_and_clears_error_and_busy() {
        let previews = PreviewStore::new();
        let mut session = Session::new();
        session.select_image(uploaded_png(&previews), &previews);
        session.select_style(styles::find("studio").unwrap());
        session.begin_generate().unwrap();

        session.complete(Ok(generated_asset(&previews, b"first")), &previews);
        assert!(!session.is_busy());
        assert_eq!(session.phase(), Phase::Generated);
        assert!(session.result_asset().is_some());
    }

    #[test]
    fn failure_preserves_the_result_and_sets_the_error() {
        let previews = PreviewStore::new();
        let mut session = Session::new();
        session.select_image(uploaded_png(&previews), &previews);
        session.select_style(styles::find("studio").unwrap());

        session.begin_generate().unwrap();
        session.complete(Ok(generated_asset(&previews, b"first")), &previews);
        let first_data = session.result_asset().unwrap().data.clone();

        session.set_refinement_text("brighter".to_string());
        session.begin_refine().unwrap();
        session.complete(
            Err(AppError::RemoteGeneration("model overloaded".to_string())),
            &previews,
        );

        assert!(!session.is_busy());
        assert_eq!(session.phase(), Phase::Failed);
        assert_eq!(session.result_asset().unwrap().data, first_data);
        // Text stays so the user can edit and retry.
        assert_eq!(session.snapshot().refinement_text, "brighter");
    }

    #[test]
    fn refinement_chains_off_the_most_recent_result() {
        let previews = PreviewStore::new();
        let mut session = Session::new();
        session.select_image(uploaded_png(&previews), &previews);
        session.select_style(styles::find("studio").unwrap());

        session.begin_generate().unwrap();
        session.complete(Ok(generated_asset(&previews, b"first")), &previews);

        session.set_refinement_text("make background darker".to_string());
        let request = session.begin_refine().unwrap();
        assert_eq!(
            request.image_data,
            general_purpose::STANDARD.encode(b"first")
        );
        assert_eq!(request.instruction, "make background darker");

        session.complete(Ok(generated_asset(&previews, b"second")), &previews);
        assert_eq!(session.snapshot().refinement_text, "");

        session.set_refinement_text("now brighter".to_string());
        let request = session.begin_refine().unwrap();
        assert_eq!(
            request.image_data,
            general_purpose::STANDARD.encode(b"second")
        );
    }

    #[test]
    fn refine_without_a_result_or_text_is_rejected() {
        let previews = PreviewStore::new();
        let mut session = Session::new();
        assert!(session.begin_refine().is_err());

        session.select_image(uploaded_png(&previews), &previews);
        session.select_style(styles::find("studio").unwrap());
        session.begin_generate().unwrap();
        session.complete(Ok(generated_asset(&previews, b"first")), &previews);

        session.set_refinement_text("   ".to_string());
        assert!(session.begin_refine().is_err());
        assert!(!session.is_busy());
    }

    #[test]
    fn selecting_a_style_clears_extra_instructions() {
        let mut session = Session::new();
        session.select_style(styles::find("studio").unwrap());
        session.set_extra_instructions("wearing a suit".to_string());

        session.select_style(styles::find("outdoor").unwrap());
        assert_eq!(session.snapshot().extra_instructions, "");
    }

    #[test]
    fn replacing_the_image_drops_the_stale_result_and_previews() {
        let previews = PreviewStore::new();
        let mut session = Session::new();
        session.select_image(uploaded_png(&previews), &previews);
        session.select_style(styles::find("studio").unwrap());
        session.begin_generate().unwrap();
        session.complete(Ok(generated_asset(&previews, b"first")), &previews);
        assert_eq!(previews.live_count(), 2);

        let payload = general_purpose::STANDARD.encode(jpeg_bytes());
        let replacement = ingest_upload("image/jpeg", &payload, MAX, &previews).unwrap();
        session.select_image(replacement, &previews);

        assert!(session.result_asset().is_none());
        assert_eq!(previews.live_count(), 1);
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn superseded_results_release_their_preview_handles() {
        let previews = PreviewStore::new();
        let mut session = Session::new();
        session.select_image(uploaded_png(&previews), &previews);
        session.select_style(styles::find("studio").unwrap());

        session.begin_generate().unwrap();
        session.complete(Ok(generated_asset(&previews, b"first")), &previews);
        let first_preview = session.result_asset().unwrap().preview;

        session.set_refinement_text("darker".to_string());
        session.begin_refine().unwrap();
        session.complete(Ok(generated_asset(&previews, b"second")), &previews);

        assert!(previews.fetch(first_preview).is_none());
        assert_eq!(previews.live_count(), 2);
    }

    #[test]
    fn ending_the_session_releases_every_preview() {
        let previews = PreviewStore::new();
        let mut session = Session::new();
        session.select_image(uploaded_png(&previews), &previews);
        session.select_style(styles::find("studio").unwrap());
        session.begin_generate().unwrap();
        session.complete(Ok(generated_asset(&previews, b"first")), &previews);
        assert_eq!(previews.live_count(), 2);

        session.end(&previews);
        assert_eq!(previews.live_count(), 0);
    }

    #[test]
    fn full_scenario_generate_then_refine() {
        let previews = PreviewStore::new();
        let mut session = Session::new();

        session.select_image(uploaded_png(&previews), &previews);
        let style = styles::find("linkedin").unwrap();
        session.select_style(style);

        let request = session.begin_generate().unwrap();
        assert_eq!(request.instruction, style.instruction);
        session.complete(Ok(generated_asset(&previews, b"headshot-v1")), &previews);
        assert_eq!(session.phase(), Phase::Generated);

        session.set_refinement_text("make background darker".to_string());
        let request = session.begin_refine().unwrap();
        assert_eq!(
            request.image_data,
            general_purpose::STANDARD.encode(b"headshot-v1")
        );
        session.complete(Ok(generated_asset(&previews, b"headshot-v2")), &previews);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Generated);
        assert_eq!(snapshot.refinement_text, "");
        assert!(snapshot.last_error.is_none());
    }
}
