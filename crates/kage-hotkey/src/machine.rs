use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use kage_types::Command;

use crate::chord::{parse_chord, Chord, HotkeyError};
use crate::keys::KeyCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub chord: Chord,
    pub command: Command,
}

/// Every recognized chord and the command it maps to.
#[derive(Debug, Clone, Default)]
pub struct ChordTable {
    bindings: Vec<Binding>,
}

impl ChordTable {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    /// Parse `(command, chord string)` pairs; the first bad chord is an error.
    pub fn from_strings<'a>(
        pairs: impl IntoIterator<Item = (Command, &'a str)>,
    ) -> Result<Self, HotkeyError> {
        let bindings = pairs
            .into_iter()
            .map(|(command, chord)| {
                parse_chord(chord).map(|chord| Binding { chord, command })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { bindings })
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}

/// A held key with no press or auto-repeat for this long is assumed to have
/// lost its release, e.g. to a lock screen or a focus change.
pub const STALE_HOLD: Duration = Duration::from_secs(10);

/// Tracks held keys and turns presses into commands.
///
/// A command fires only on the press that moves its chord from unsatisfied to
/// satisfied. Auto-repeat presses of a key already held, and releases, never
/// fire anything.
#[derive(Debug, Clone)]
pub struct ChordMachine {
    table: ChordTable,
    held: HashSet<KeyCode>,
    last_seen: HashMap<KeyCode, Instant>,
}

impl ChordMachine {
    pub fn new(table: ChordTable) -> Self {
        Self {
            table,
            held: HashSet::new(),
            last_seen: HashMap::new(),
        }
    }

    pub fn held(&self) -> &HashSet<KeyCode> {
        &self.held
    }

    pub fn press(&mut self, key: KeyCode) -> Vec<Command> {
        self.press_at(key, Instant::now())
    }

    /// [`press`](Self::press) with an explicit event time.
    pub fn press_at(&mut self, key: KeyCode, now: Instant) -> Vec<Command> {
        self.forget_stale(now);
        let repeat = self.held.contains(&key);
        self.last_seen.insert(key, now);
        if repeat {
            return Vec::new();
        }

        let before: Vec<bool> = self
            .table
            .bindings
            .iter()
            .map(|b| b.chord.is_satisfied(&self.held))
            .collect();
        self.held.insert(key);

        self.table
            .bindings
            .iter()
            .zip(before)
            .filter(|(binding, was)| !was && binding.chord.is_satisfied(&self.held))
            .map(|(binding, _)| binding.command)
            .collect()
    }

    pub fn release(&mut self, key: KeyCode) {
        self.held.remove(&key);
        self.last_seen.remove(&key);
    }

    fn forget_stale(&mut self, now: Instant) {
        let last_seen = &mut self.last_seen;
        self.held.retain(|key| {
            let fresh = last_seen
                .get(key)
                .is_some_and(|seen| now.saturating_duration_since(*seen) < STALE_HOLD);
            if !fresh {
                tracing::debug!("[HOTKEY] Dropping {:?}, no release seen", key);
                last_seen.remove(key);
            }
            fresh
        });
    }
}
