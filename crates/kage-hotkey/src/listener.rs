//! Global keyboard listener.
//!
//! `rdev::listen` blocks its thread for as long as the OS hook lives and
//! cannot be stopped from outside, so shutdown cancels a token and the
//! router drops every event that arrives afterwards.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kage_types::Command;
use rdev::EventType;
use tokio_util::sync::CancellationToken;

use crate::keys::KeyCode;
use crate::machine::{ChordMachine, ChordTable};

const RESTART_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("command receiver is gone")]
    Closed,

    #[error("dispatch failed: {0}")]
    Failed(String),
}

/// Receives commands on the listener thread. Implementations hand them off
/// to the GUI loop and return promptly.
pub trait CommandSink: Send + Sync + 'static {
    fn dispatch(&self, command: Command) -> Result<(), DispatchError>;
}

/// Feeds raw events into a [`ChordMachine`] and dispatches what fires.
pub struct EventRouter<S: CommandSink> {
    machine: ChordMachine,
    sink: Arc<S>,
    cancel: CancellationToken,
}

impl<S: CommandSink> EventRouter<S> {
    pub fn new(table: ChordTable, sink: Arc<S>, cancel: CancellationToken) -> Self {
        Self {
            machine: ChordMachine::new(table),
            sink,
            cancel,
        }
    }

    pub fn machine(&self) -> &ChordMachine {
        &self.machine
    }

    pub fn handle(&mut self, event: &EventType) {
        if self.cancel.is_cancelled() {
            return;
        }

        let commands = match event {
            EventType::KeyPress(key) => match KeyCode::from_rdev(*key) {
                Some(code) => self.machine.press(code),
                None => return,
            },
            EventType::KeyRelease(key) => {
                if let Some(code) = KeyCode::from_rdev(*key) {
                    self.machine.release(code);
                }
                return;
            }
            _ => return,
        };

        for command in commands {
            self.dispatch(command);
        }
    }

    fn dispatch(&self, command: Command) {
        tracing::debug!("[HOTKEY] {}", command);
        let sink = &self.sink;
        match panic::catch_unwind(AssertUnwindSafe(|| sink.dispatch(command))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("[HOTKEY] Failed to dispatch {}: {}", command, e),
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!("[HOTKEY] Dispatch of {} panicked: {}", command, reason);
            }
        }
    }
}

/// Feed a fixed event sequence through a router.
pub fn process_events<S: CommandSink>(router: &mut EventRouter<S>, events: &[EventType]) {
    for event in events {
        router.handle(event);
    }
}

/// Handle to the background listener thread.
pub struct HotkeyListener {
    cancel: CancellationToken,
}

impl HotkeyListener {
    pub fn spawn<S: CommandSink>(
        table: ChordTable,
        sink: S,
        cancel: CancellationToken,
    ) -> std::io::Result<Self> {
        let sink = Arc::new(sink);
        let token = cancel.clone();

        for binding in table.bindings() {
            tracing::info!("[HOTKEY] {} -> {}", binding.chord, binding.command);
        }

        thread::Builder::new()
            .name("kage-hotkey".to_string())
            .spawn(move || {
                loop {
                    let mut router = EventRouter::new(table.clone(), Arc::clone(&sink), token.clone());
                    let result = rdev::listen(move |event| router.handle(&event.event_type));

                    if token.is_cancelled() {
                        return;
                    }
                    match result {
                        Ok(()) => tracing::warn!("[HOTKEY] Listener exited unexpectedly. Restarting shortly"),
                        Err(e) => tracing::warn!("[HOTKEY] Listener failed: {:?}. Retrying shortly", e),
                    }
                    thread::sleep(RESTART_DELAY);
                }
            })?;

        Ok(Self { cancel })
    }

    /// Stop dispatching. The OS hook itself stays until the process exits.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
