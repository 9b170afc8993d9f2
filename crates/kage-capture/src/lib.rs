mod capture;
#[cfg(windows)]
mod com;
mod detect;
#[cfg(windows)]
mod windows_ocr;

pub use capture::{CaptureError, Captured, ScreenCapture, XcapCapture};
#[cfg(windows)]
pub use com::ComGuard;
pub use detect::{encode_png, parse_detections, DetectError, Detector, HttpDetector};
#[cfg(windows)]
pub use windows_ocr::WindowsOcrDetector;
