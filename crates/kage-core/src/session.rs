//! Single-owner application state.
//!
//! The session is owned by the orchestrator on the GUI loop and is the only
//! writer of the mode and the detection set.

use kage_types::{AppMode, BoxRect, DetectionSet, PointerEvent, SelectionRegion};

use crate::selection::{RegionSelector, SelectionEvent, SelectorUpdate};

/// Why a capture could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRefusal {
    /// Another capture cycle has not finished yet.
    InFlight,
    /// The selection surface is up and would end up in the capture.
    Selecting,
}

/// A finished selection waiting for its surface to leave the screen.
#[derive(Debug, Clone, Copy)]
struct PendingRegion {
    region: SelectionRegion,
    surface_gone: bool,
}

#[derive(Debug, Default)]
pub struct Session {
    mode: AppMode,
    mode_before_selection: AppMode,
    selector: RegionSelector,
    detections: DetectionSet,
    capture_in_flight: bool,
    pending: Option<PendingRegion>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn detections(&self) -> &DetectionSet {
        &self.detections
    }

    pub fn is_capture_in_flight(&self) -> bool {
        self.capture_in_flight
    }

    /// Enter selection mode. Returns `false` if a selection is already running.
    pub fn begin_selection(&mut self) -> bool {
        if self.mode == AppMode::Selecting {
            return false;
        }
        self.mode_before_selection = self.mode;
        self.mode = AppMode::Selecting;
        self.selector.reset();
        self.pending = None;
        true
    }

    pub fn live_selection(&self) -> Option<BoxRect> {
        if self.mode != AppMode::Selecting {
            return None;
        }
        self.selector.live_rect()
    }

    /// Feed pointer input to the selector.
    ///
    /// When the gesture ends the pre-selection mode is restored and the
    /// outcome returned.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<SelectionEvent> {
        if self.mode != AppMode::Selecting {
            return None;
        }

        match self.selector.handle(event) {
            SelectorUpdate::Finished(outcome) => {
                self.mode = self.mode_before_selection;
                Some(outcome)
            }
            SelectorUpdate::Live(_) | SelectorUpdate::Unchanged => None,
        }
    }

    /// Hold an emitted region until a frame without the selection surface
    /// has been painted.
    pub fn defer_region(&mut self, region: SelectionRegion) {
        self.pending = Some(PendingRegion {
            region,
            surface_gone: false,
        });
    }

    pub fn pending_region(&self) -> Option<SelectionRegion> {
        self.pending.map(|p| p.region)
    }

    /// Record that a frame went out without the selection surface.
    /// Returns `true` if this made a held region ready.
    pub fn selection_surface_hidden(&mut self) -> bool {
        match &mut self.pending {
            Some(pending) if !pending.surface_gone && self.mode != AppMode::Selecting => {
                pending.surface_gone = true;
                true
            }
            _ => false,
        }
    }

    /// Hand out the held region once its surface is gone.
    pub fn take_ready_region(&mut self) -> Option<SelectionRegion> {
        match self.pending {
            Some(pending) if pending.surface_gone => {
                self.pending = None;
                Some(pending.region)
            }
            _ => None,
        }
    }

    pub fn try_begin_capture(&mut self) -> Result<(), CaptureRefusal> {
        if self.capture_in_flight {
            return Err(CaptureRefusal::InFlight);
        }
        if self.mode == AppMode::Selecting {
            return Err(CaptureRefusal::Selecting);
        }
        self.capture_in_flight = true;
        Ok(())
    }

    /// Mark the in-flight cycle done, whatever its outcome.
    pub fn end_capture(&mut self) {
        self.capture_in_flight = false;
    }

    /// Swap in the result of a capture cycle.
    pub fn replace_detections(&mut self, set: DetectionSet) {
        self.detections = set;
        self.set_resting_mode(AppMode::Overlaying);
    }

    /// Drop every detection and reset the canvas to the empty marker.
    pub fn clear(&mut self) {
        self.detections = DetectionSet::empty();
        self.set_resting_mode(AppMode::Idle);
    }

    // While selecting, the new mode takes effect once the gesture ends
    fn set_resting_mode(&mut self, mode: AppMode) {
        if self.mode == AppMode::Selecting {
            self.mode_before_selection = mode;
        } else {
            self.mode = mode;
        }
    }
}
