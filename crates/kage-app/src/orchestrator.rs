//! Drives the session from hotkey commands, selection gestures and finished
//! capture cycles. Lives on the GUI loop; capture cycles run on the worker
//! runtime and report back through a completion channel.

use std::sync::Arc;

use kage_core::{CaptureRefusal, SelectionEvent, Session};
use kage_types::{AppMode, Command, DetectionSet, PointerEvent, SelectionRegion};
use kage_ui::{
    ui_bridge, ControlFlow, OverlayController, OverlayRenderer, RenderSurface, RepaintSignal,
    SelectionView, UiBridge, UiInbox,
};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::pipeline::{CapturePipeline, PipelineError};

type Completion = Result<DetectionSet, PipelineError>;

pub struct Orchestrator {
    session: Session,
    renderer: OverlayRenderer,
    pipeline: Arc<CapturePipeline>,
    commands: UiInbox<Command>,
    completion_tx: UiBridge<Completion>,
    completions: UiInbox<Completion>,
    repaint: RepaintSignal,
    runtime: Handle,
    shutdown: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        pipeline: Arc<CapturePipeline>,
        renderer: OverlayRenderer,
        commands: UiInbox<Command>,
        repaint: RepaintSignal,
        runtime: Handle,
        shutdown: CancellationToken,
    ) -> Self {
        let (completion_tx, completions) = ui_bridge(8, repaint.clone());
        Self {
            session: Session::new(),
            renderer,
            pipeline,
            commands,
            completion_tx,
            completions,
            repaint,
            runtime,
            shutdown,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn handle_command(&mut self, command: Command, surface: &mut dyn RenderSurface) -> ControlFlow {
        tracing::info!("Command: {}", command);
        match command {
            Command::CaptureFull => self.start_capture(None),
            Command::BeginRegionSelect => {
                if self.session.begin_selection() {
                    tracing::info!("[SELECT] Drag a region, right-click or Escape to cancel");
                } else {
                    tracing::debug!("[SELECT] Already selecting");
                }
            }
            Command::ClearOverlay => {
                self.session.clear();
                self.redraw(surface);
            }
            Command::Quit => {
                self.shutdown.cancel();
                return ControlFlow::Quit;
            }
        }
        ControlFlow::Continue
    }

    fn start_capture(&mut self, region: Option<SelectionRegion>) {
        if let Err(refusal) = self.session.try_begin_capture() {
            match refusal {
                CaptureRefusal::InFlight => {
                    tracing::warn!("[PIPELINE] Capture refused: previous cycle still running")
                }
                CaptureRefusal::Selecting => {
                    tracing::warn!("[PIPELINE] Capture refused: region selection in progress")
                }
            }
            return;
        }

        let pipeline = Arc::clone(&self.pipeline);
        let done = self.completion_tx.clone();
        self.runtime.spawn(async move {
            let result = match tokio::spawn(async move { pipeline.run(region).await }).await {
                Ok(result) => result,
                Err(e) => Err(PipelineError::Aborted(e.to_string())),
            };
            if let Err(e) = done.send(result) {
                tracing::warn!("[PIPELINE] Dropping capture result: {}", e);
            }
        });
    }

    fn finish_capture(&mut self, completion: Completion, surface: &mut dyn RenderSurface) {
        self.session.end_capture();
        match completion {
            Ok(set) => {
                tracing::info!("[PIPELINE] Showing {} detections", set.len());
                self.session.replace_detections(set);
                self.redraw(surface);
            }
            Err(e) => tracing::error!("[PIPELINE] {}; keeping the current overlay", e),
        }
    }

    fn redraw(&mut self, surface: &mut dyn RenderSurface) {
        match self.renderer.render(self.session.detections()) {
            Ok(frame) => surface.present(frame),
            Err(e) => {
                tracing::error!("[PIPELINE] Render failed: {}", e);
                return;
            }
        }

        let visible = match self.session.mode() {
            AppMode::Overlaying => true,
            AppMode::Idle => false,
            // The overlay behind the selection surface keeps its state
            AppMode::Selecting => !self.session.detections().is_empty(),
        };
        surface.set_visible(visible);
    }
}

impl OverlayController for Orchestrator {
    fn poll(&mut self, surface: &mut dyn RenderSurface) -> ControlFlow {
        for completion in self.completions.drain() {
            self.finish_capture(completion, surface);
        }

        if let Some(region) = self.session.take_ready_region() {
            self.start_capture(Some(region));
        }

        for command in self.commands.drain() {
            if self.handle_command(command, surface) == ControlFlow::Quit {
                return ControlFlow::Quit;
            }
        }

        if self.shutdown.is_cancelled() {
            return ControlFlow::Quit;
        }
        ControlFlow::Continue
    }

    fn pointer(&mut self, event: PointerEvent, _surface: &mut dyn RenderSurface) {
        match self.session.handle_pointer(event) {
            Some(SelectionEvent::Emitted(region)) => {
                tracing::info!("[SELECT] Region {}", region);
                // The selection surface is still on screen this frame
                self.session.defer_region(region);
            }
            Some(SelectionEvent::Discarded) => tracing::debug!("[SELECT] Empty region discarded"),
            Some(SelectionEvent::Cancelled) => tracing::info!("[SELECT] Cancelled"),
            None => {}
        }
    }

    fn selection(&self) -> SelectionView {
        if self.session.mode() == AppMode::Selecting {
            SelectionView::Active {
                live: self.session.live_selection(),
            }
        } else {
            SelectionView::Hidden
        }
    }

    fn frame_painted(&mut self, shown: SelectionView) {
        if shown == SelectionView::Hidden && self.session.selection_surface_hidden() {
            tracing::debug!("[SELECT] Selection surface gone, capturing next frame");
            self.repaint.request();
        }
    }
}
