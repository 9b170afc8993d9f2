//! Overlay window, region selection surface, and the rasterizer that turns
//! translated detections into overlay frames.

use eframe::egui;
use kage_types::{BoxRect, DisplayGeometry, PointerEvent};

pub mod app;
pub mod bridge;
pub mod font;
pub mod render;
pub mod selection;
pub mod surface;

pub use app::OverlayApp;
pub use bridge::{ui_bridge, BridgeError, RepaintSignal, UiBridge, UiInbox};
pub use font::{
    FontCatalog, FontConfigCatalog, FontHandle, FontOrigin, FontResolver, NoCatalog,
};
pub use render::{OverlayRenderer, RenderError, RenderStyle};
pub use surface::{EguiSurface, RenderSurface};

#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error("overlay window failed: {0}")]
    Window(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// What the selection surface should show this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionView {
    Hidden,
    Active { live: Option<BoxRect> },
}

/// Application side of the GUI loop. Everything runs on the GUI thread.
pub trait OverlayController {
    /// Called once per frame before painting.
    fn poll(&mut self, surface: &mut dyn RenderSurface) -> ControlFlow;

    fn pointer(&mut self, event: PointerEvent, surface: &mut dyn RenderSurface);

    fn selection(&self) -> SelectionView;

    /// Called once per frame after painting, with the selection view that
    /// frame actually showed.
    fn frame_painted(&mut self, shown: SelectionView);
}

/// Open the overlay over `geometry` and run the GUI loop on the calling
/// thread until the controller asks to quit.
pub fn run_overlay<C, F>(
    geometry: DisplayGeometry,
    repaint: RepaintSignal,
    make_controller: F,
) -> Result<(), UiError>
where
    C: OverlayController + 'static,
    F: FnOnce() -> C + 'static,
{
    let scale = geometry.scale_factor.max(f32::EPSILON);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("kage")
            .with_position(egui::pos2(geometry.x as f32 / scale, geometry.y as f32 / scale))
            .with_inner_size(egui::vec2(
                geometry.width as f32 / scale,
                geometry.height as f32 / scale,
            ))
            .with_decorations(false)
            .with_transparent(true)
            .with_always_on_top()
            .with_mouse_passthrough(true)
            .with_taskbar(false),
        ..Default::default()
    };

    tracing::info!(
        "Opening overlay {}x{} at ({}, {}), scale {}",
        geometry.width,
        geometry.height,
        geometry.x,
        geometry.y,
        geometry.scale_factor
    );

    eframe::run_native(
        "kage",
        options,
        Box::new(move |cc| {
            repaint.attach(&cc.egui_ctx);
            let controller = make_controller();
            Ok(Box::new(OverlayApp::new(&cc.egui_ctx, geometry, controller)) as Box<dyn eframe::App>)
        }),
    )
    .map_err(|e| UiError::Window(e.to_string()))
}
