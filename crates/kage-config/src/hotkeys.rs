use kage_types::Command;
use serde::{Deserialize, Serialize};

fn default_capture_full() -> Vec<String> {
    vec!["F8".to_string(), "Ctrl+Alt+Q".to_string()]
}

fn default_begin_region_select() -> Vec<String> {
    vec!["Ctrl+Alt+W".to_string()]
}

fn default_clear_overlay() -> Vec<String> {
    vec!["Ctrl+Alt+E".to_string(), "F9".to_string()]
}

fn default_quit() -> Vec<String> {
    vec!["Ctrl+Alt+R".to_string(), "F10".to_string()]
}

/// Chord strings per command, e.g. `"Ctrl+Alt+Q"` or `"F8"`
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HotkeyConfig {
    #[serde(default = "default_capture_full")]
    pub capture_full: Vec<String>,
    #[serde(default = "default_begin_region_select")]
    pub begin_region_select: Vec<String>,
    #[serde(default = "default_clear_overlay")]
    pub clear_overlay: Vec<String>,
    #[serde(default = "default_quit")]
    pub quit: Vec<String>,
}

impl HotkeyConfig {
    /// Flattened `(command, chord)` pairs in declaration order
    pub fn bindings(&self) -> Vec<(Command, &str)> {
        Command::ALL
            .iter()
            .flat_map(|command| {
                self.chords_for(*command)
                    .iter()
                    .map(move |chord| (*command, chord.as_str()))
            })
            .collect()
    }

    pub fn chords_for(&self, command: Command) -> &[String] {
        match command {
            Command::CaptureFull => &self.capture_full,
            Command::BeginRegionSelect => &self.begin_region_select,
            Command::ClearOverlay => &self.clear_overlay,
            Command::Quit => &self.quit,
        }
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            capture_full: default_capture_full(),
            begin_region_select: default_begin_region_select(),
            clear_overlay: default_clear_overlay(),
            quit: default_quit(),
        }
    }
}
