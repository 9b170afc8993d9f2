use std::fmt;

use serde::{Deserialize, Serialize};

/// Pixel position on the primary display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in corner form.
///
/// `x2` and `y2` are exclusive, so `(10, 10, 50, 30)` covers 40×20 pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoxRect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Rectangle spanned by two arbitrary corners, normalized so that
    /// width and height are never negative.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x1: a.x.min(b.x),
            y1: a.y.min(b.y),
            x2: a.x.max(b.x),
            y2: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// Size of the raster a [`DetectionSet`] is drawn onto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Marker recorded after an explicit clear.
    pub const EMPTY: CanvasSize = CanvasSize { width: 0, height: 0 };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Geometry of the primary display as reported by the capture backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f32,
}

/// One recognized text region, as produced by the detection engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoxRect,
    pub text: String,
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: BoxRect, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            text: text.into(),
            confidence,
        }
    }
}

/// Which tier of the translation chain produced a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranslationSource {
    Primary,
    Secondary,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedDetection {
    pub detection: Detection,
    pub translated_text: String,
    pub source: TranslationSource,
}

impl TranslatedDetection {
    pub fn bbox(&self) -> BoxRect {
        self.detection.bbox
    }

    pub fn original_text(&self) -> &str {
        &self.detection.text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSpace {
    /// Boxes are in primary-display pixels.
    Absolute,
    /// Boxes are relative to a captured sub-region whose top-left is `origin`.
    RegionRelative { origin: Point },
}

/// Translated detections currently shown in the overlay.
///
/// The canvas size travels with the detections so a set can never be drawn
/// onto a raster of a different size.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSet {
    items: Vec<TranslatedDetection>,
    space: CoordinateSpace,
    canvas: CanvasSize,
}

impl DetectionSet {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            space: CoordinateSpace::Absolute,
            canvas: CanvasSize::EMPTY,
        }
    }

    pub fn absolute(items: Vec<TranslatedDetection>, canvas: CanvasSize) -> Self {
        Self {
            items,
            space: CoordinateSpace::Absolute,
            canvas,
        }
    }

    pub fn region_relative(
        items: Vec<TranslatedDetection>,
        origin: Point,
        canvas: CanvasSize,
    ) -> Self {
        Self {
            items,
            space: CoordinateSpace::RegionRelative { origin },
            canvas,
        }
    }

    pub fn items(&self) -> &[TranslatedDetection] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn into_parts(self) -> (Vec<TranslatedDetection>, CoordinateSpace, CanvasSize) {
        (self.items, self.space, self.canvas)
    }
}

impl Default for DetectionSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// A user-dragged capture rectangle in absolute coordinates.
///
/// Only constructible with a strictly positive width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SelectionRegion {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl SelectionRegion {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Region spanned by a normalized rectangle, if it has any area.
    pub fn from_rect(rect: BoxRect) -> Option<Self> {
        if rect.is_empty() {
            return None;
        }
        Self::new(rect.x1, rect.y1, rect.width() as u32, rect.height() as u32)
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bounds(&self) -> BoxRect {
        BoxRect::new(
            self.x,
            self.y,
            self.x + self.width as i32,
            self.y + self.height as i32,
        )
    }
}

impl fmt::Display for SelectionRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Which window is visible and interactive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppMode {
    #[default]
    Idle,
    Overlaying,
    Selecting,
}

/// Commands produced by the hotkey listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    CaptureFull,
    BeginRegionSelect,
    ClearOverlay,
    Quit,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::CaptureFull,
        Command::BeginRegionSelect,
        Command::ClearOverlay,
        Command::Quit,
    ];
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::CaptureFull => "capture-full",
            Command::BeginRegionSelect => "begin-region-select",
            Command::ClearOverlay => "clear-overlay",
            Command::Quit => "quit",
        };
        f.write_str(name)
    }
}

/// Pointer input on the selection surface, already in absolute pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    PrimaryDown(Point),
    Moved(Point),
    PrimaryUp(Point),
    SecondaryDown,
}
