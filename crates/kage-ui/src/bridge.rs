use std::sync::{Arc, OnceLock};

use eframe::egui;
use kanal::{Receiver, Sender};

/// Wakes the GUI loop from another thread.
///
/// The egui context only exists once the window is up, so it is attached
/// late; requests made before that are dropped and the periodic repaint
/// picks up the work.
#[derive(Clone, Default)]
pub struct RepaintSignal {
    ctx: Arc<OnceLock<egui::Context>>,
}

impl RepaintSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, ctx: &egui::Context) {
        let _ = self.ctx.set(ctx.clone());
    }

    pub fn request(&self) {
        if let Some(ctx) = self.ctx.get() {
            ctx.request_repaint();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("GUI loop is gone")]
    Closed,

    #[error("GUI inbox is full")]
    Full,
}

/// Sending half: any thread hands a message to the GUI loop and wakes it.
pub struct UiBridge<T> {
    tx: Sender<T>,
    repaint: RepaintSignal,
}

impl<T> Clone for UiBridge<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            repaint: self.repaint.clone(),
        }
    }
}

impl<T> UiBridge<T> {
    /// Queue `message` without blocking. A full inbox drops the message.
    pub fn send(&self, message: T) -> Result<(), BridgeError> {
        match self.tx.try_send(message) {
            Ok(true) => {
                self.repaint.request();
                Ok(())
            }
            Ok(false) => {
                // Still wake the loop so it drains what is queued
                self.repaint.request();
                Err(BridgeError::Full)
            }
            Err(_) => Err(BridgeError::Closed),
        }
    }
}

/// Receiving half, drained by the GUI loop once per frame.
pub struct UiInbox<T> {
    rx: Receiver<T>,
}

impl<T> UiInbox<T> {
    pub fn drain(&self) -> Vec<T> {
        let mut messages = Vec::new();
        while let Ok(Some(message)) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }
}

pub fn ui_bridge<T>(capacity: usize, repaint: RepaintSignal) -> (UiBridge<T>, UiInbox<T>) {
    let (tx, rx) = kanal::bounded(capacity);
    (UiBridge { tx, repaint }, UiInbox { rx })
}
