use image::{DynamicImage, RgbImage, RgbaImage};
use kage_types::{CanvasSize, DisplayGeometry, SelectionRegion};
use xcap::Monitor;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to enumerate monitors: {0}")]
    Monitors(String),

    #[error("no monitor found")]
    NoMonitor,

    #[error("screen capture failed: {0}")]
    Capture(String),

    #[error("captured buffer does not match {width}x{height}")]
    Buffer { width: u32, height: u32 },

    #[error("region {region} is not inside the {width}x{height} capture")]
    OutOfBounds {
        region: SelectionRegion,
        width: u32,
        height: u32,
    },
}

/// A raster plus the pixel size of the full display it was cut from.
///
/// `display` is the same for full and region captures, so both place their
/// boxes on one canvas.
#[derive(Debug, Clone)]
pub struct Captured {
    pub image: RgbImage,
    pub display: CanvasSize,
}

impl Captured {
    pub fn full(image: RgbImage) -> Self {
        let display = CanvasSize::new(image.width(), image.height());
        Self { image, display }
    }

    /// Cut `region` out of a full-display raster, keeping the full size.
    pub fn region(full: &RgbImage, region: SelectionRegion) -> Result<Self, CaptureError> {
        Ok(Self {
            image: crop_region(full, region)?,
            display: CanvasSize::new(full.width(), full.height()),
        })
    }
}

/// Source of opaque RGB rasters of the primary display.
pub trait ScreenCapture: Send + Sync {
    fn display_geometry(&self) -> Result<DisplayGeometry, CaptureError>;

    /// Capture the whole primary display, or only `region` of it.
    fn capture(&self, region: Option<SelectionRegion>) -> Result<Captured, CaptureError>;
}

/// Captures through `xcap`.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapCapture;

impl XcapCapture {
    pub fn new() -> Self {
        Self
    }

    fn primary_monitor() -> Result<Monitor, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Monitors(e.to_string()))?;
        let primary = monitors.iter().position(|m| m.is_primary()).unwrap_or(0);
        monitors.into_iter().nth(primary).ok_or(CaptureError::NoMonitor)
    }
}

impl ScreenCapture for XcapCapture {
    fn display_geometry(&self) -> Result<DisplayGeometry, CaptureError> {
        let monitor = Self::primary_monitor()?;
        Ok(DisplayGeometry {
            x: monitor.x(),
            y: monitor.y(),
            width: monitor.width(),
            height: monitor.height(),
            scale_factor: monitor.scale_factor(),
        })
    }

    fn capture(&self, region: Option<SelectionRegion>) -> Result<Captured, CaptureError> {
        let monitor = Self::primary_monitor()?;
        let captured = monitor
            .capture_image()
            .map_err(|e| CaptureError::Capture(e.to_string()))?;

        let (width, height) = (captured.width(), captured.height());
        let rgba = RgbaImage::from_raw(width, height, captured.into_raw())
            .ok_or(CaptureError::Buffer { width, height })?;
        let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

        tracing::debug!("Captured primary display at {}x{}", width, height);

        match region {
            Some(region) => Captured::region(&rgb, region),
            None => Ok(Captured::full(rgb)),
        }
    }
}

/// Cut `region` out of a full-display raster. The region must lie inside.
fn crop_region(full: &RgbImage, region: SelectionRegion) -> Result<RgbImage, CaptureError> {
    let out_of_bounds = || CaptureError::OutOfBounds {
        region,
        width: full.width(),
        height: full.height(),
    };

    let x = u32::try_from(region.x()).map_err(|_| out_of_bounds())?;
    let y = u32::try_from(region.y()).map_err(|_| out_of_bounds())?;
    if x + region.width() > full.width() || y + region.height() > full.height() {
        return Err(out_of_bounds());
    }

    Ok(image::imageops::crop_imm(full, x, y, region.width(), region.height()).to_image())
}
