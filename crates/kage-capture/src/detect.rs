use std::io::Cursor;

use async_trait::async_trait;
use image::{ImageFormat, RgbImage};
use kage_types::{BoxRect, Detection};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("failed to encode raster: {0}")]
    Encode(#[from] image::ImageError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("recognition service returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    #[error("malformed recognition reply: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("recognition engine failed: {0}")]
    Engine(String),
}

/// Text-region detection and recognition over a raster.
///
/// Boxes come back in raster-local pixels.
#[async_trait]
pub trait Detector: Send + Sync {
    fn name(&self) -> &str;

    async fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, DetectError>;
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, DetectError> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

#[derive(Debug, Deserialize)]
struct WireDetection {
    #[serde(rename = "box")]
    bbox: [f64; 4],
    #[serde(default)]
    text: String,
    #[serde(default = "full_confidence")]
    confidence: f32,
}

fn full_confidence() -> f32 {
    1.0
}

impl From<WireDetection> for Detection {
    fn from(wire: WireDetection) -> Self {
        let [x1, y1, x2, y2] = wire.bbox.map(|v| v.round() as i32);
        Detection::new(
            BoxRect::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)),
            wire.text,
            wire.confidence.clamp(0.0, 1.0),
        )
    }
}

/// Parse `[{"box": [x1, y1, x2, y2], "text": "...", "confidence": 0.9}, ...]`.
pub fn parse_detections(body: &[u8]) -> Result<Vec<Detection>, DetectError> {
    let wire: Vec<WireDetection> = serde_json::from_slice(body)?;
    Ok(wire.into_iter().map(Detection::from).collect())
}

/// Recognition service reached over HTTP. The raster is posted as a PNG body.
pub struct HttpDetector {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDetector {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Detector for HttpDetector {
    fn name(&self) -> &str {
        "http"
    }

    async fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, DetectError> {
        let png = encode_png(image)?;
        tracing::debug!(
            "Posting {}x{} raster ({} bytes) to {}",
            image.width(),
            image.height(),
            png.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(png)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DetectError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        parse_detections(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_reply() {
        let body = r#"[
            {"box": [10, 10, 50, 30], "text": "こんにちは", "confidence": 0.93},
            {"box": [60.4, 5.6, 20.0, 25.2], "text": "猫"}
        ]"#
        .as_bytes();

        let detections = parse_detections(body).unwrap();

        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].bbox, BoxRect::new(10, 10, 50, 30));
        assert_eq!(detections[0].text, "こんにちは");
        assert!((detections[0].confidence - 0.93).abs() < f32::EPSILON);

        // Swapped corners are normalized; missing confidence means certain
        assert_eq!(detections[1].bbox, BoxRect::new(20, 6, 60, 25));
        assert_eq!(detections[1].confidence, 1.0);
    }

    #[test]
    fn empty_reply_is_no_detections() {
        assert!(parse_detections(b"[]").unwrap().is_empty());
    }

    #[test]
    fn confidence_is_clamped() {
        let detections =
            parse_detections(br#"[{"box": [0, 0, 1, 1], "text": "a", "confidence": 7.5}]"#)
                .unwrap();
        assert_eq!(detections[0].confidence, 1.0);
    }

    #[test]
    fn malformed_reply_is_parse_error() {
        assert!(matches!(
            parse_detections(br#"{"boxes": []}"#),
            Err(DetectError::Parse(_))
        ));
        assert!(matches!(
            parse_detections(br#"[{"box": [1, 2, 3], "text": "a"}]"#),
            Err(DetectError::Parse(_))
        ));
    }

    #[test]
    fn png_encoding_has_signature() {
        let png = encode_png(&RgbImage::new(4, 3)).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
