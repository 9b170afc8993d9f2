//! Selection surface input and feedback drawing.

use eframe::egui;
use kage_types::{BoxRect, DisplayGeometry, Point, PointerEvent};

const DIM_ALPHA: u8 = 110;
const BORDER_WIDTH: f32 = 2.0;

/// Surface-local logical point to absolute display pixels, clamped to the display.
pub fn to_display_pixels(pos: egui::Pos2, pixels_per_point: f32, geometry: &DisplayGeometry) -> Point {
    let x = (pos.x * pixels_per_point).round() as i32;
    let y = (pos.y * pixels_per_point).round() as i32;
    Point::new(
        x.clamp(0, geometry.width as i32),
        y.clamp(0, geometry.height as i32),
    )
}

fn to_logical(bbox: BoxRect, pixels_per_point: f32) -> egui::Rect {
    egui::Rect::from_min_max(
        egui::pos2(bbox.x1 as f32, bbox.y1 as f32) / pixels_per_point,
        egui::pos2(bbox.x2 as f32, bbox.y2 as f32) / pixels_per_point,
    )
}

/// Translate one egui event into selection input. Escape cancels like the
/// secondary button.
pub fn map_event(
    event: &egui::Event,
    pixels_per_point: f32,
    geometry: &DisplayGeometry,
) -> Option<PointerEvent> {
    let at = |pos: &egui::Pos2| to_display_pixels(*pos, pixels_per_point, geometry);
    match event {
        egui::Event::PointerMoved(pos) => Some(PointerEvent::Moved(at(pos))),
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            ..
        } => Some(if *pressed {
            PointerEvent::PrimaryDown(at(pos))
        } else {
            PointerEvent::PrimaryUp(at(pos))
        }),
        egui::Event::PointerButton {
            button: egui::PointerButton::Secondary,
            pressed: true,
            ..
        } => Some(PointerEvent::SecondaryDown),
        egui::Event::Key {
            key: egui::Key::Escape,
            pressed: true,
            ..
        } => Some(PointerEvent::SecondaryDown),
        _ => None,
    }
}

pub fn collect_pointer_events(ctx: &egui::Context, geometry: &DisplayGeometry) -> Vec<PointerEvent> {
    let pixels_per_point = ctx.pixels_per_point();
    ctx.input(|input| {
        input
            .events
            .iter()
            .filter_map(|event| map_event(event, pixels_per_point, geometry))
            .collect()
    })
}

/// Dim everything outside the live rectangle and stroke its border. With no
/// drag in progress the whole surface is dimmed.
pub fn paint_selection(
    painter: &egui::Painter,
    screen_rect: egui::Rect,
    live: Option<BoxRect>,
    pixels_per_point: f32,
) {
    let color = egui::Color32::from_black_alpha(DIM_ALPHA);

    let Some(live) = live else {
        painter.rect_filled(screen_rect, 0.0, color);
        return;
    };
    let selection_rect = to_logical(live, pixels_per_point);

    // Above
    painter.rect_filled(
        egui::Rect::from_min_max(
            screen_rect.min,
            egui::pos2(screen_rect.max.x, selection_rect.min.y),
        ),
        0.0,
        color,
    );
    // Below
    painter.rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(screen_rect.min.x, selection_rect.max.y),
            screen_rect.max,
        ),
        0.0,
        color,
    );
    // Left
    painter.rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(screen_rect.min.x, selection_rect.min.y),
            egui::pos2(selection_rect.min.x, selection_rect.max.y),
        ),
        0.0,
        color,
    );
    // Right
    painter.rect_filled(
        egui::Rect::from_min_max(
            egui::pos2(selection_rect.max.x, selection_rect.min.y),
            egui::pos2(screen_rect.max.x, selection_rect.max.y),
        ),
        0.0,
        color,
    );

    painter.rect_stroke(
        selection_rect,
        0.0,
        egui::Stroke::new(BORDER_WIDTH, egui::Color32::WHITE),
        egui::StrokeKind::Middle,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> DisplayGeometry {
        DisplayGeometry {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
            scale_factor: 1.5,
        }
    }

    #[test]
    fn logical_points_scale_to_pixels() {
        let point = to_display_pixels(egui::pos2(100.0, 200.0), 1.5, &geometry());
        assert_eq!(point, Point::new(150, 300));
    }

    #[test]
    fn points_outside_the_display_are_clamped() {
        let geometry = geometry();
        assert_eq!(to_display_pixels(egui::pos2(-4.0, -1.0), 1.0, &geometry), Point::new(0, 0));
        assert_eq!(
            to_display_pixels(egui::pos2(5000.0, 5000.0), 1.0, &geometry),
            Point::new(1920, 1080)
        );
    }

    #[test]
    fn buttons_and_escape_map_to_pointer_events() {
        let geometry = geometry();
        let press = egui::Event::PointerButton {
            pos: egui::pos2(10.0, 20.0),
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        };
        let release = egui::Event::PointerButton {
            pos: egui::pos2(30.0, 40.0),
            button: egui::PointerButton::Primary,
            pressed: false,
            modifiers: egui::Modifiers::NONE,
        };
        let right = egui::Event::PointerButton {
            pos: egui::pos2(0.0, 0.0),
            button: egui::PointerButton::Secondary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        };
        let escape = egui::Event::Key {
            key: egui::Key::Escape,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        };

        assert_eq!(
            map_event(&press, 1.0, &geometry),
            Some(PointerEvent::PrimaryDown(Point::new(10, 20)))
        );
        assert_eq!(
            map_event(&release, 1.0, &geometry),
            Some(PointerEvent::PrimaryUp(Point::new(30, 40)))
        );
        assert_eq!(map_event(&right, 1.0, &geometry), Some(PointerEvent::SecondaryDown));
        assert_eq!(map_event(&escape, 1.0, &geometry), Some(PointerEvent::SecondaryDown));
        assert_eq!(
            map_event(&egui::Event::PointerGone, 1.0, &geometry),
            None
        );
    }
}
