use eframe::egui;
use image::RgbaImage;

/// Where composited overlay frames end up.
pub trait RenderSurface {
    fn present(&mut self, frame: RgbaImage);

    fn set_visible(&mut self, visible: bool);
}

/// Overlay frame held as an egui texture and painted over the whole viewport.
pub struct EguiSurface {
    ctx: egui::Context,
    texture: Option<egui::TextureHandle>,
    visible: bool,
}

impl EguiSurface {
    pub fn new(ctx: &egui::Context) -> Self {
        Self {
            ctx: ctx.clone(),
            texture: None,
            visible: false,
        }
    }

    pub fn paint(&self, painter: &egui::Painter, rect: egui::Rect) {
        if !self.visible {
            return;
        }
        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
    }
}

impl RenderSurface for EguiSurface {
    fn present(&mut self, frame: RgbaImage) {
        if frame.width() == 0 || frame.height() == 0 {
            self.texture = None;
            self.ctx.request_repaint();
            return;
        }

        let size = [frame.width() as usize, frame.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, frame.as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture =
                    Some(self.ctx.load_texture("kage-overlay", image, egui::TextureOptions::NEAREST));
            }
        }
        self.ctx.request_repaint();
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.ctx.request_repaint();
        }
    }
}
