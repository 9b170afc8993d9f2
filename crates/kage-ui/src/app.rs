use std::time::Duration;

use eframe::egui;
use kage_types::DisplayGeometry;

use crate::selection::{collect_pointer_events, paint_selection};
use crate::surface::EguiSurface;
use crate::{ControlFlow, OverlayController, SelectionView};

/// Upper bound between frames when nothing wakes the loop.
const IDLE_REPAINT: Duration = Duration::from_millis(100);

/// The eframe application: one passthrough overlay viewport plus, while a
/// region is being selected, an input-grabbing selection viewport.
pub struct OverlayApp<C: OverlayController> {
    controller: C,
    surface: EguiSurface,
    geometry: DisplayGeometry,
    closing: bool,
}

impl<C: OverlayController> OverlayApp<C> {
    pub fn new(ctx: &egui::Context, geometry: DisplayGeometry, controller: C) -> Self {
        Self {
            controller,
            surface: EguiSurface::new(ctx),
            geometry,
            closing: false,
        }
    }

    fn show_selection(&mut self, ctx: &egui::Context, live: Option<kage_types::BoxRect>) {
        let scale = self.geometry.scale_factor.max(f32::EPSILON);
        let builder = egui::ViewportBuilder::default()
            .with_title("kage selection")
            .with_position(egui::pos2(
                self.geometry.x as f32 / scale,
                self.geometry.y as f32 / scale,
            ))
            .with_inner_size(egui::vec2(
                self.geometry.width as f32 / scale,
                self.geometry.height as f32 / scale,
            ))
            .with_decorations(false)
            .with_transparent(true)
            .with_always_on_top()
            .with_taskbar(false);

        let geometry = self.geometry;
        let mut events = Vec::new();
        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("kage-selection"),
            builder,
            |ctx, _class| {
                ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
                events = collect_pointer_events(ctx, &geometry);

                let pixels_per_point = ctx.pixels_per_point();
                egui::CentralPanel::default()
                    .frame(egui::Frame::NONE)
                    .show(ctx, |ui| {
                        let rect = ui.max_rect();
                        paint_selection(ui.painter(), rect, live, pixels_per_point);
                    });
            },
        );

        for event in events {
            self.controller.pointer(event, &mut self.surface);
        }
    }
}

impl<C: OverlayController> eframe::App for OverlayApp<C> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.closing {
            return;
        }

        if self.controller.poll(&mut self.surface) == ControlFlow::Quit {
            tracing::info!("Closing overlay");
            self.closing = true;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.surface.paint(ui.painter(), rect);
            });

        let shown = self.controller.selection();
        if let SelectionView::Active { live } = shown {
            self.show_selection(ctx, live);
            // Pointer input may have finished or cancelled the gesture
            if self.controller.selection() != shown {
                ctx.request_repaint();
            }
        }
        self.controller.frame_painted(shown);

        ctx.request_repaint_after(IDLE_REPAINT);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0; 4]
    }
}
