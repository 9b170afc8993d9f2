use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

/// Locally hosted translation model (LibreTranslate protocol)
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LocalModelConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_url")]
    pub url: String,
    /// Only needed when the local server was started with keys enabled
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            url: default_url(),
            api_key: None,
        }
    }
}
