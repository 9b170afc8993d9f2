//! One capture cycle: capture, detect, filter, translate, place.

use std::sync::Arc;

use kage_capture::{CaptureError, DetectError, Detector, ScreenCapture};
use kage_core::{into_absolute, DetectionFilter};
use kage_translator::FallbackChain;
use kage_types::{DetectionSet, Point, SelectionRegion, TranslatedDetection};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("capture stage failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("detection stage failed: {0}")]
    Detect(#[from] DetectError),

    #[error("capture cycle aborted: {0}")]
    Aborted(String),
}

pub struct CapturePipeline {
    capture: Arc<dyn ScreenCapture>,
    detector: Arc<dyn Detector>,
    filter: DetectionFilter,
    chain: FallbackChain,
}

impl CapturePipeline {
    pub fn new(
        capture: Arc<dyn ScreenCapture>,
        detector: Arc<dyn Detector>,
        filter: DetectionFilter,
        chain: FallbackChain,
    ) -> Self {
        Self {
            capture,
            detector,
            filter,
            chain,
        }
    }

    /// Run a cycle over the whole display, or over `region` only.
    ///
    /// The returned set is always absolute, on the canvas of the display
    /// raster the capture was taken from, whichever mode ran.
    pub async fn run(&self, region: Option<SelectionRegion>) -> Result<DetectionSet, PipelineError> {
        let capture = Arc::clone(&self.capture);
        let captured = tokio::task::spawn_blocking(move || capture.capture(region))
            .await
            .map_err(|e| PipelineError::Aborted(e.to_string()))??;

        tracing::debug!(
            "[PIPELINE] Captured {}x{} of {} ({})",
            captured.image.width(),
            captured.image.height(),
            captured.display,
            region.map_or_else(|| "full display".to_string(), |r| r.to_string())
        );

        let detections = self.detector.detect(&captured.image).await?;
        tracing::debug!(
            "[PIPELINE] {} returned {} detections",
            self.detector.name(),
            detections.len()
        );

        let detections = self.filter.retain(detections);

        let mut translated = Vec::with_capacity(detections.len());
        for detection in detections {
            let outcome = self.chain.translate(&detection.text).await;
            translated.push(TranslatedDetection {
                detection,
                translated_text: outcome.text,
                source: outcome.source,
            });
        }

        let origin = region.map_or(Point::ORIGIN, |r| r.origin());
        Ok(into_absolute(DetectionSet::region_relative(
            translated,
            origin,
            captured.display,
        )))
    }
}
