pub mod chain;

pub use chain::{FallbackChain, TranslationOutcome};

pub type LanguageCode = String;

/// Translation provider interface
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate text from source to target language
    async fn translate(
        &self,
        text: &str,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<Translation, TranslateError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct Translation {
    pub text: String,
    pub from: LanguageCode,
    pub to: LanguageCode,
    pub provider: String,
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub requires_api_key: bool,
    /// Runs on this machine rather than a remote service
    pub local: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication error")]
    AuthenticationError,

    #[error("Provider returned an empty translation")]
    EmptyResponse,

    #[error("Provider faulted: {0}")]
    Fault(String),
}
