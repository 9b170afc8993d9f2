use async_trait::async_trait;
use kage_translator::{LanguageCode, ProviderMetadata, TranslateError, Translation, Translator};

/// DeepL REST API (`/v2/translate`).
#[derive(Clone)]
pub struct DeeplTranslator {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl DeeplTranslator {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url,
        }
    }
}

/// DeepL wants upper-case codes and rejects regional variants as a source.
fn source_code(code: &str) -> String {
    code.split('-').next().unwrap_or(code).to_uppercase()
}

fn target_code(code: &str) -> String {
    code.to_uppercase()
}

pub(crate) fn parse_response(json: &serde_json::Value) -> Result<String, TranslateError> {
    let text = json["translations"]
        .get(0)
        .and_then(|t| t["text"].as_str())
        .ok_or_else(|| TranslateError::ApiError("No translation in response".to_string()))?;

    if text.trim().is_empty() {
        return Err(TranslateError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[async_trait]
impl Translator for DeeplTranslator {
    async fn translate(
        &self,
        text: &str,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<Translation, TranslateError> {
        if self.api_key.is_empty() {
            return Err(TranslateError::AuthenticationError);
        }

        let source_lang = source_code(&from);
        let target_lang = target_code(&to);
        let params = [
            ("text", text),
            ("source_lang", source_lang.as_str()),
            ("target_lang", target_lang.as_str()),
        ];

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&params)
            .send()
            .await?;

        if response.status() == 429 {
            return Err(TranslateError::RateLimitExceeded);
        }

        if response.status() == 403 {
            return Err(TranslateError::AuthenticationError);
        }

        if !response.status().is_success() {
            return Err(TranslateError::ApiError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            TranslateError::ApiError(format!("Failed to parse response: {}", e))
        })?;

        Ok(Translation {
            text: parse_response(&json)?,
            from,
            to,
            provider: "deepl".to_string(),
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "DeepL".to_string(),
            requires_api_key: true,
            local: false,
        }
    }
}
