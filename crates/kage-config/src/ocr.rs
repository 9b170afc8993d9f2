use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    /// Recognition service reached over HTTP
    #[default]
    Http,
    /// Windows.Media.Ocr, only on Windows
    Windows,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8866/detect".to_string()
}

fn default_language() -> String {
    "ja".to_string()
}

fn default_subject_script() -> String {
    "ja".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OcrConfig {
    #[serde(default)]
    pub backend: OcrBackend,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Recognizer language for backends that need one
    #[serde(default = "default_language")]
    pub language: String,
    /// Detections below this confidence are dropped
    #[serde(default)]
    pub min_confidence: f32,
    /// Script detected text must contain ("ja" or "any")
    #[serde(default = "default_subject_script")]
    pub subject_script: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackend::default(),
            endpoint: default_endpoint(),
            language: default_language(),
            min_confidence: 0.0,
            subject_script: default_subject_script(),
        }
    }
}
