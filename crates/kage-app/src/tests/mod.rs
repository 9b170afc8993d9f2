//! Pipeline and orchestrator tests against in-memory collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{Rgb, RgbImage, RgbaImage};
use kage_capture::{CaptureError, Captured, DetectError, Detector, ScreenCapture};
use kage_core::{AnyScript, DetectionFilter};
use kage_translator::{
    FallbackChain, LanguageCode, ProviderMetadata, TranslateError, Translation, Translator,
};
use kage_types::{CanvasSize, Detection, DisplayGeometry, SelectionRegion};
use kage_ui::{FontResolver, NoCatalog, OverlayRenderer, RenderStyle, RenderSurface};
use tokio::sync::Notify;

use crate::pipeline::CapturePipeline;

mod pipeline_tests;

pub fn geometry(width: u32, height: u32) -> DisplayGeometry {
    DisplayGeometry {
        x: 0,
        y: 0,
        width,
        height,
        scale_factor: 1.0,
    }
}

/// Returns a blank raster of the display size, or of the requested region.
pub struct FakeScreen {
    geometry: DisplayGeometry,
    raster: CanvasSize,
    pub requests: Mutex<Vec<Option<SelectionRegion>>>,
}

impl FakeScreen {
    pub fn new(geometry: DisplayGeometry) -> Arc<Self> {
        let raster = CanvasSize::new(geometry.width, geometry.height);
        Self::with_raster(geometry, raster)
    }

    /// A backend whose rasters differ in size from the reported geometry.
    pub fn with_raster(geometry: DisplayGeometry, raster: CanvasSize) -> Arc<Self> {
        Arc::new(Self {
            geometry,
            raster,
            requests: Mutex::new(Vec::new()),
        })
    }
}

impl ScreenCapture for FakeScreen {
    fn display_geometry(&self) -> Result<DisplayGeometry, CaptureError> {
        Ok(self.geometry)
    }

    fn capture(&self, region: Option<SelectionRegion>) -> Result<Captured, CaptureError> {
        self.requests.lock().unwrap().push(region);
        let (width, height) = match region {
            Some(region) => (region.width(), region.height()),
            None => (self.raster.width, self.raster.height),
        };
        Ok(Captured {
            image: RgbImage::from_pixel(width, height, Rgb([30, 30, 30])),
            display: self.raster,
        })
    }
}

/// Replies with a fixed detection list, optionally waiting for a release.
pub struct ScriptedDetector {
    reply: Result<Vec<Detection>, ()>,
    gate: Option<Arc<Notify>>,
    pub seen_sizes: Mutex<Vec<(u32, u32)>>,
}

impl ScriptedDetector {
    pub fn replying(detections: Vec<Detection>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(detections),
            gate: None,
            seen_sizes: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(()),
            gate: None,
            seen_sizes: Mutex::new(Vec::new()),
        })
    }

    pub fn gated(detections: Vec<Detection>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(detections),
            gate: Some(gate),
            seen_sizes: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Detector for ScriptedDetector {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, DetectError> {
        self.seen_sizes.lock().unwrap().push(image.dimensions());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.reply {
            Ok(detections) => Ok(detections.clone()),
            Err(()) => Err(DetectError::Engine("recognizer offline".to_string())),
        }
    }
}

/// Translates every input to the same reply, or always fails.
pub struct FixedTranslator {
    name: &'static str,
    reply: Option<&'static str>,
    pub calls: AtomicUsize,
}

impl FixedTranslator {
    pub fn replying(name: &'static str, reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: Some(reply),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for FixedTranslator {
    async fn translate(
        &self,
        _text: &str,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<Translation, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Some(reply) => Ok(Translation {
                text: reply.to_string(),
                from,
                to,
                provider: self.name.to_string(),
            }),
            None => Err(TranslateError::RateLimitExceeded),
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: self.name.to_string(),
            requires_api_key: false,
            local: false,
        }
    }
}

/// Keeps every presented frame and visibility change.
#[derive(Default)]
pub struct RecordingSurface {
    pub frames: Vec<RgbaImage>,
    pub visible: Option<bool>,
}

impl RecordingSurface {
    pub fn last_frame(&self) -> &RgbaImage {
        self.frames.last().expect("no frame presented")
    }
}

impl RenderSurface for RecordingSurface {
    fn present(&mut self, frame: RgbaImage) {
        self.frames.push(frame);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = Some(visible);
    }
}

pub fn pipeline(
    screen: Arc<FakeScreen>,
    detector: Arc<ScriptedDetector>,
    primary: Option<Arc<FixedTranslator>>,
    secondary: Option<Arc<FixedTranslator>>,
) -> CapturePipeline {
    let chain = FallbackChain::new(
        primary.map(|t| t as Arc<dyn Translator>),
        secondary.map(|t| t as Arc<dyn Translator>),
        "ja",
        "en-US",
    );
    CapturePipeline::new(
        screen,
        detector,
        DetectionFilter::new(0.5, Arc::new(AnyScript)),
        chain,
    )
}

pub fn renderer() -> OverlayRenderer {
    let fonts = FontResolver::with_paths(Arc::new(NoCatalog), Vec::new(), Vec::new());
    OverlayRenderer::new(RenderStyle::default(), Arc::new(fonts))
}

pub fn opaque_pixels(frame: &RgbaImage) -> usize {
    frame.pixels().filter(|p| p.0[3] != 0).count()
}
