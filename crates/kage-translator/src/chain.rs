//! Primary/secondary translation with a visible failure marker.

use std::sync::Arc;

use kage_types::TranslationSource;

use crate::{LanguageCode, TranslateError, Translator};

/// Marker used when no provider is configured at all.
pub const NO_TRANSLATOR_MARKER: &str = "[No Translator]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOutcome {
    pub text: String,
    pub source: TranslationSource,
}

impl TranslationOutcome {
    fn untranslated(text: String) -> Self {
        Self {
            text,
            source: TranslationSource::None,
        }
    }
}

/// Two-tier translator. Each call tries the primary, then the secondary, and
/// never retries or caches.
#[derive(Clone)]
pub struct FallbackChain {
    primary: Option<Arc<dyn Translator>>,
    secondary: Option<Arc<dyn Translator>>,
    from: LanguageCode,
    to: LanguageCode,
}

impl FallbackChain {
    pub fn new(
        primary: Option<Arc<dyn Translator>>,
        secondary: Option<Arc<dyn Translator>>,
        from: impl Into<LanguageCode>,
        to: impl Into<LanguageCode>,
    ) -> Self {
        Self {
            primary,
            secondary,
            from: from.into(),
            to: to.into(),
        }
    }

    pub async fn translate(&self, text: &str) -> TranslationOutcome {
        if text.is_empty() {
            return TranslationOutcome::untranslated(String::new());
        }

        let tiers = [
            ("primary", TranslationSource::Primary, &self.primary),
            ("secondary", TranslationSource::Secondary, &self.secondary),
        ];

        let mut last_failed: Option<String> = None;
        for (stage, source, provider) in tiers {
            let Some(provider) = provider else {
                continue;
            };
            let name = provider.metadata().name;

            match self.call(provider, text).await {
                Ok(translated) => {
                    tracing::debug!("[TRANSLATE] {stage} ({name}) ok: {text:?} -> {translated:?}");
                    return TranslationOutcome {
                        text: translated,
                        source,
                    };
                }
                Err(e) => {
                    tracing::warn!("[TRANSLATE] {stage} ({name}) failed for {text:?}: {e}");
                    last_failed = Some(name);
                }
            }
        }

        let marked = match last_failed {
            Some(name) => format!("[{name} Error] {text}"),
            None => format!("{NO_TRANSLATOR_MARKER} {text}"),
        };
        TranslationOutcome::untranslated(marked)
    }

    // Runs the provider on its own task so a panic surfaces as an error
    async fn call(
        &self,
        provider: &Arc<dyn Translator>,
        text: &str,
    ) -> Result<String, TranslateError> {
        let provider = Arc::clone(provider);
        let text = text.to_string();
        let from = self.from.clone();
        let to = self.to.clone();

        let translation = tokio::spawn(async move { provider.translate(&text, from, to).await })
            .await
            .map_err(|e| TranslateError::Fault(e.to_string()))??;

        if translation.text.trim().is_empty() {
            return Err(TranslateError::EmptyResponse);
        }
        Ok(translation.text)
    }
}
