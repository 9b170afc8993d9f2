use serde::{Deserialize, Serialize};

fn default_box_alpha() -> u8 {
    200
}

fn default_text_inset() -> u32 {
    2
}

fn default_font_size() -> f32 {
    14.0
}

fn default_font_families() -> Vec<String> {
    [
        "Noto Sans CJK JP",
        "Noto Sans JP",
        "Meiryo",
        "Yu Gothic",
        "Hiragino Sans",
        "DejaVu Sans",
        "Arial",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OverlayConfig {
    /// Alpha of the redaction box painted over each detection
    #[serde(default = "default_box_alpha")]
    pub box_alpha: u8,
    /// Offset of the translated text from the box's top-left corner
    #[serde(default = "default_text_inset")]
    pub text_inset: u32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Families asked of the system font catalog, best first
    #[serde(default = "default_font_families")]
    pub font_families: Vec<String>,
    /// Font files tried before the built-in well-known paths
    #[serde(default)]
    pub font_paths: Vec<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            box_alpha: default_box_alpha(),
            text_inset: default_text_inset(),
            font_size: default_font_size(),
            font_families: default_font_families(),
            font_paths: Vec::new(),
        }
    }
}
