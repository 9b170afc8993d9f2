use async_trait::async_trait;
use image::RgbImage;
use kage_types::{BoxRect, Detection};
use windows::{
    core::HSTRING,
    Foundation::Rect,
    Globalization::Language,
    Graphics::Imaging::BitmapDecoder,
    Media::Ocr::OcrEngine,
    Storage::Streams::{DataWriter, InMemoryRandomAccessStream},
};

use crate::com::ComGuard;
use crate::detect::{encode_png, DetectError, Detector};

fn engine_error(context: &'static str) -> impl Fn(windows::core::Error) -> DetectError {
    move |e| DetectError::Engine(format!("{context}: {e}"))
}

fn create_engine(language_code: &str) -> Result<OcrEngine, DetectError> {
    let language = Language::CreateLanguage(&HSTRING::from(language_code))
        .map_err(engine_error("Failed to create language"))?;

    OcrEngine::TryCreateFromLanguage(&language)
        .map_err(engine_error("Failed to create OCR engine for language"))
}

fn word_box(rect: Rect) -> BoxRect {
    BoxRect::new(
        rect.X.floor() as i32,
        rect.Y.floor() as i32,
        (rect.X + rect.Width).ceil() as i32,
        (rect.Y + rect.Height).ceil() as i32,
    )
}

fn union(a: BoxRect, b: BoxRect) -> BoxRect {
    BoxRect::new(a.x1.min(b.x1), a.y1.min(b.y1), a.x2.max(b.x2), a.y2.max(b.y2))
}

fn recognize_blocking(language: &str, png: &[u8]) -> Result<Vec<Detection>, DetectError> {
    let _com = ComGuard::initialize()?;
    let engine = create_engine(language)?;

    let stream =
        InMemoryRandomAccessStream::new().map_err(engine_error("Failed to create stream"))?;
    let writer =
        DataWriter::CreateDataWriter(&stream).map_err(engine_error("Failed to create writer"))?;

    writer
        .WriteBytes(png)
        .map_err(engine_error("Failed to write image bytes"))?;
    writer
        .StoreAsync()
        .and_then(|op| op.get())
        .map_err(engine_error("Failed to store data"))?;
    writer
        .FlushAsync()
        .and_then(|op| op.get())
        .map_err(engine_error("Failed to flush"))?;

    stream.Seek(0).map_err(engine_error("Failed to seek"))?;

    let decoder = BitmapDecoder::CreateAsync(&stream)
        .and_then(|op| op.get())
        .map_err(engine_error("Failed to create decoder"))?;

    let bitmap = decoder
        .GetSoftwareBitmapAsync()
        .and_then(|op| op.get())
        .map_err(engine_error("Failed to get software bitmap"))?;

    let result = engine
        .RecognizeAsync(&bitmap)
        .and_then(|op| op.get())
        .map_err(engine_error("Failed to recognize"))?;

    let mut detections = Vec::new();
    for line in result.Lines().map_err(engine_error("Failed to read lines"))? {
        let text = line
            .Text()
            .map_err(engine_error("Failed to read line text"))?
            .to_string();

        let mut bbox: Option<BoxRect> = None;
        for word in line.Words().map_err(engine_error("Failed to read words"))? {
            let rect = word
                .BoundingRect()
                .map_err(engine_error("Failed to read word bounds"))?;
            let current = word_box(rect);
            bbox = Some(bbox.map_or(current, |b| union(b, current)));
        }

        // The engine reports no per-line confidence
        if let Some(bbox) = bbox {
            detections.push(Detection::new(bbox, text, 1.0));
        }
    }

    Ok(detections)
}

/// Windows.Media.Ocr. Each recognized line becomes one detection.
pub struct WindowsOcrDetector {
    language: String,
}

impl WindowsOcrDetector {
    /// Fails if no recognizer is installed for `language`.
    pub fn new(language: impl Into<String>) -> Result<Self, DetectError> {
        let language = language.into();
        let _com = ComGuard::initialize()?;
        let engine = create_engine(&language)?;

        if let Ok(tag) = engine
            .RecognizerLanguage()
            .and_then(|lang| lang.LanguageTag())
        {
            tracing::info!("Windows OCR recognizer language: {}", tag);
        }

        Ok(Self { language })
    }
}

#[async_trait]
impl Detector for WindowsOcrDetector {
    fn name(&self) -> &str {
        "windows"
    }

    async fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, DetectError> {
        let png = encode_png(image)?;
        let language = self.language.clone();

        tokio::task::spawn_blocking(move || recognize_blocking(&language, &png))
            .await
            .map_err(|e| DetectError::Engine(format!("OCR task failed: {e}")))?
    }
}
