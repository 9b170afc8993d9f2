use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::keys::{KeyCode, Modifier};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HotkeyError {
    #[error("empty hotkey")]
    Empty,

    #[error("hotkey {chord:?} has no trigger key")]
    MissingTrigger { chord: String },

    #[error("hotkey {chord:?} names more than one trigger key")]
    MultipleTriggers { chord: String },

    #[error("unknown key {key:?} in hotkey {chord:?}")]
    UnknownKey { chord: String, key: String },
}

/// Required modifiers plus one trigger key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    modifiers: BTreeSet<Modifier>,
    trigger: KeyCode,
}

impl Chord {
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>, trigger: KeyCode) -> Self {
        Self {
            modifiers: modifiers.into_iter().collect(),
            trigger,
        }
    }

    pub fn trigger(&self) -> KeyCode {
        self.trigger
    }

    pub fn modifiers(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.modifiers.iter().copied()
    }

    /// Trigger held and every required modifier held on either side.
    /// Extra modifiers do not matter.
    pub fn is_satisfied(&self, held: &HashSet<KeyCode>) -> bool {
        held.contains(&self.trigger)
            && self
                .modifiers
                .iter()
                .all(|m| held.iter().any(|key| key.modifier() == Some(*m)))
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{modifier}+")?;
        }
        write!(f, "{}", self.trigger)
    }
}

fn parse_modifier(upper: &str) -> Option<Modifier> {
    match upper {
        "CTRL" | "CONTROL" => Some(Modifier::Ctrl),
        "SHIFT" => Some(Modifier::Shift),
        "ALT" | "OPTION" => Some(Modifier::Alt),
        "META" | "SUPER" | "WIN" | "CMD" => Some(Modifier::Meta),
        _ => None,
    }
}

/// Parse a chord like `"Ctrl+Alt+Q"` or `"F8"`.
pub fn parse_chord(s: &str) -> Result<Chord, HotkeyError> {
    if s.trim().is_empty() {
        return Err(HotkeyError::Empty);
    }

    let mut modifiers = BTreeSet::new();
    let mut trigger: Option<KeyCode> = None;

    for part in s.split('+') {
        let upper = part.trim().to_ascii_uppercase();
        if upper.is_empty() {
            continue;
        }

        if let Some(modifier) = parse_modifier(&upper) {
            modifiers.insert(modifier);
            continue;
        }

        let key = KeyCode::parse(&upper).ok_or_else(|| HotkeyError::UnknownKey {
            chord: s.to_string(),
            key: part.trim().to_string(),
        })?;
        if trigger.replace(key).is_some() {
            return Err(HotkeyError::MultipleTriggers {
                chord: s.to_string(),
            });
        }
    }

    let trigger = trigger.ok_or_else(|| HotkeyError::MissingTrigger {
        chord: s.to_string(),
    })?;
    Ok(Chord { modifiers, trigger })
}
