pub mod chord;
pub mod keys;
pub mod listener;
pub mod machine;

pub use chord::{parse_chord, Chord, HotkeyError};
pub use keys::{KeyCode, Modifier};
pub use listener::{process_events, CommandSink, DispatchError, EventRouter, HotkeyListener};
pub use machine::{Binding, ChordMachine, ChordTable};
