//! Machine translation served by a model on this machine.
//!
//! The server speaks the LibreTranslate HTTP protocol. It is only used if the
//! startup probe succeeds; after that it is assumed to stay available.

use async_trait::async_trait;
use kage_core::ResourceError;
use kage_translator::{LanguageCode, ProviderMetadata, TranslateError, Translation, Translator};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    code: String,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    error: Option<String>,
}

/// Base language of a tag: `"en-US"` -> `"en"`.
fn base_code(code: &str) -> String {
    code.split(['-', '_'])
        .next()
        .unwrap_or(code)
        .to_lowercase()
}

pub struct LocalModelTranslator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl LocalModelTranslator {
    /// Probe the server and keep it only if it offers `from -> to`.
    pub async fn connect(
        base_url: &str,
        api_key: Option<String>,
        from: &str,
        to: &str,
    ) -> Result<Self, ResourceError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::new();

        let unreachable = |reason: String| ResourceError::ModelUnreachable {
            url: base_url.clone(),
            reason,
        };

        let response = client
            .get(format!("{base_url}/languages"))
            .send()
            .await
            .map_err(|e| unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unreachable(format!("HTTP {}", response.status())));
        }

        let languages: Vec<LanguageEntry> = response
            .json()
            .await
            .map_err(|e| unreachable(format!("bad /languages reply: {e}")))?;

        let (from, to) = (base_code(from), base_code(to));
        let offers = |code: &str| languages.iter().any(|l| base_code(&l.code) == code);
        if !offers(&from) || !offers(&to) {
            return Err(ResourceError::ModelLanguages {
                url: base_url,
                from,
                to,
            });
        }

        tracing::info!(
            "Local model at {} ready ({} languages)",
            base_url,
            languages.len()
        );

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl Translator for LocalModelTranslator {
    async fn translate(
        &self,
        text: &str,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<Translation, TranslateError> {
        let (source, target) = (base_code(&from), base_code(&to));
        let request = TranslateRequest {
            q: text,
            source: &source,
            target: &target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == 429 {
            return Err(TranslateError::RateLimitExceeded);
        }
        if status == 403 {
            return Err(TranslateError::AuthenticationError);
        }

        let body: TranslateResponse = response.json().await.map_err(|e| {
            TranslateError::ApiError(format!("Failed to parse response: {}", e))
        })?;

        if !status.is_success() {
            let detail = body.error.unwrap_or_else(|| format!("HTTP {status}"));
            return Err(TranslateError::ApiError(detail));
        }

        match body.translated_text {
            Some(text) if !text.trim().is_empty() => Ok(Translation {
                text,
                from,
                to,
                provider: "local".to_string(),
            }),
            _ => Err(TranslateError::EmptyResponse),
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Local".to_string(),
            requires_api_key: false,
            local: true,
        }
    }
}
