//! Startup probing of optional collaborators.
//!
//! Everything here is resolved once; the rest of the app consumes the
//! result as plain data.

use std::sync::Arc;

use anyhow::bail;
#[cfg(windows)]
use anyhow::Context;
use kage_capture::{Detector, HttpDetector};
use kage_config::ocr::{OcrBackend, OcrConfig};
use kage_config::Config;
use kage_core::{AnyScript, ScriptPredicate};
use kage_lang_japanese::{DeeplTranslator, JapaneseScript, LocalModelTranslator};
use kage_translator::Translator;
use kage_ui::{FontCatalog, FontConfigCatalog};

pub struct Capabilities {
    pub primary: Option<Arc<dyn Translator>>,
    pub secondary: Option<Arc<dyn Translator>>,
    pub font_catalog: Arc<dyn FontCatalog>,
}

impl Capabilities {
    pub async fn resolve(config: &Config, probe_local_model: bool) -> Self {
        let primary = primary_translator(config);

        let secondary = if !config.local_model.enabled {
            tracing::info!("Local model disabled in config");
            None
        } else if !probe_local_model {
            tracing::info!("Local model probe skipped");
            None
        } else {
            match LocalModelTranslator::connect(
                &config.local_model.url,
                config.local_model.api_key.clone(),
                &config.translator.from_lang,
                &config.translator.to_lang,
            )
            .await
            {
                Ok(local) => Some(Arc::new(local) as Arc<dyn Translator>),
                Err(e) => {
                    tracing::warn!("{}; continuing without a secondary translator", e);
                    None
                }
            }
        };

        Self {
            primary,
            secondary,
            font_catalog: Arc::new(FontConfigCatalog::detect()),
        }
    }

    /// `(capability, state)` pairs for the startup log.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let provider = |t: &Option<Arc<dyn Translator>>| match t {
            Some(t) => t.metadata().name,
            None => "none".to_string(),
        };
        let catalog = if self.font_catalog.is_available() {
            self.font_catalog.name().to_string()
        } else {
            "none".to_string()
        };

        vec![
            ("primary translator", provider(&self.primary)),
            ("secondary translator", provider(&self.secondary)),
            ("font catalog", catalog),
        ]
    }

    pub fn log(&self) {
        for (what, state) in self.describe() {
            tracing::info!("{}: {}", what, state);
        }
    }
}

fn primary_translator(config: &Config) -> Option<Arc<dyn Translator>> {
    let translator = &config.translator;
    if !translator.is_configured() {
        tracing::info!("Primary translator not configured");
        return None;
    }

    match translator.provider.to_ascii_lowercase().as_str() {
        "deepl" => Some(Arc::new(DeeplTranslator::new(
            translator.api_key.clone(),
            translator.api_url.clone(),
        ))),
        other => {
            tracing::warn!("Unknown translator provider {:?}, primary disabled", other);
            None
        }
    }
}

pub fn build_detector(config: &OcrConfig) -> anyhow::Result<Arc<dyn Detector>> {
    match config.backend {
        OcrBackend::Http => Ok(Arc::new(HttpDetector::new(config.endpoint.clone()))),
        #[cfg(windows)]
        OcrBackend::Windows => {
            let detector = kage_capture::WindowsOcrDetector::new(config.language.clone())
                .context("failed to start Windows OCR")?;
            Ok(Arc::new(detector))
        }
        #[cfg(not(windows))]
        OcrBackend::Windows => bail!("the windows OCR backend is only available on Windows"),
    }
}

pub fn subject_script(name: &str) -> anyhow::Result<Arc<dyn ScriptPredicate>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "ja" | "japanese" => Ok(Arc::new(JapaneseScript)),
        "any" | "" => Ok(Arc::new(AnyScript)),
        other => bail!("unknown subject script {other:?} (expected \"ja\" or \"any\")"),
    }
}
