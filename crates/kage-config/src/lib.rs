use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use self::hotkeys::HotkeyConfig;
use self::local_model::LocalModelConfig;
use self::ocr::OcrConfig;
use self::overlay::OverlayConfig;
use self::translator::TranslatorConfig;

pub mod hotkeys;
pub mod local_model;
pub mod ocr;
pub mod overlay;
pub mod translator;

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hotkeys: HotkeyConfig,
    /// Primary (cloud) translator
    pub translator: TranslatorConfig,
    /// Secondary translator served by a local model
    pub local_model: LocalModelConfig,
    pub ocr: OcrConfig,
    pub overlay: OverlayConfig,
}

impl Config {
    /// Defaults, then the JSON file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        // .env is optional
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    tracing::info!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };

        config.apply_env(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("Loading config from {}", path.display());
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("DEEPL_AUTH_KEY").filter(|k| !k.trim().is_empty()) {
            self.translator.api_key = key.trim().to_string();
            self.translator.enabled = true;
        }

        if let Some(url) = lookup("KAGE_DEEPL_URL") {
            self.translator.api_url = url;
        }

        if let Some(url) = lookup("KAGE_LOCAL_MT_URL") {
            self.local_model.url = url;
        }

        if let Some(endpoint) = lookup("KAGE_OCR_ENDPOINT") {
            self.ocr.endpoint = endpoint;
        }

        if let Some(raw) = lookup("KAGE_MIN_CONFIDENCE") {
            match raw.trim().parse::<f32>() {
                Ok(value) => self.ocr.min_confidence = value,
                Err(e) => tracing::warn!("Ignoring KAGE_MIN_CONFIDENCE={raw:?}: {e}"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.ocr.min_confidence) {
            return Err(ConfigError::Invalid {
                field: "ocr.min_confidence",
                reason: format!("{} is outside 0.0..=1.0", self.ocr.min_confidence),
            });
        }

        if !(self.overlay.font_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "overlay.font_size",
                reason: format!("{} must be positive", self.overlay.font_size),
            });
        }

        if self.translator.from_lang.trim().is_empty() || self.translator.to_lang.trim().is_empty()
        {
            return Err(ConfigError::Invalid {
                field: "translator.from_lang/to_lang",
                reason: "language codes must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
