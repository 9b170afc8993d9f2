//! Drag-to-select interaction on the selection surface.

use kage_types::{BoxRect, Point, PointerEvent, SelectionRegion};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Inactive,
    Dragging {
        start: Point,
        current: Point,
    },
}

/// How a selection gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Released with a non-empty rectangle.
    Emitted(SelectionRegion),
    /// Released over a zero-width or zero-height rectangle.
    Discarded,
    /// Secondary button (or Escape) pressed.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorUpdate {
    /// Nothing visible changed.
    Unchanged,
    /// The live rectangle moved; repaint the feedback.
    Live(BoxRect),
    /// The gesture is over.
    Finished(SelectionEvent),
}

#[derive(Debug, Default)]
pub struct RegionSelector {
    state: DragState,
}

impl RegionSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.state = DragState::Inactive;
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Normalized rectangle between the drag start and the pointer.
    pub fn live_rect(&self) -> Option<BoxRect> {
        match self.state {
            DragState::Inactive => None,
            DragState::Dragging { start, current } => Some(BoxRect::from_corners(start, current)),
        }
    }

    pub fn handle(&mut self, event: PointerEvent) -> SelectorUpdate {
        match (self.state, event) {
            (_, PointerEvent::SecondaryDown) => {
                self.state = DragState::Inactive;
                SelectorUpdate::Finished(SelectionEvent::Cancelled)
            }
            // A press while dragging means the release was lost; start over
            (_, PointerEvent::PrimaryDown(point)) => {
                self.state = DragState::Dragging {
                    start: point,
                    current: point,
                };
                SelectorUpdate::Live(BoxRect::from_corners(point, point))
            }
            (DragState::Dragging { start, .. }, PointerEvent::Moved(point)) => {
                self.state = DragState::Dragging {
                    start,
                    current: point,
                };
                SelectorUpdate::Live(BoxRect::from_corners(start, point))
            }
            (DragState::Dragging { start, .. }, PointerEvent::PrimaryUp(point)) => {
                self.state = DragState::Inactive;
                let rect = BoxRect::from_corners(start, point);
                match SelectionRegion::from_rect(rect) {
                    Some(region) => SelectorUpdate::Finished(SelectionEvent::Emitted(region)),
                    None => SelectorUpdate::Finished(SelectionEvent::Discarded),
                }
            }
            (DragState::Inactive, PointerEvent::Moved(_) | PointerEvent::PrimaryUp(_)) => {
                SelectorUpdate::Unchanged
            }
        }
    }
}
