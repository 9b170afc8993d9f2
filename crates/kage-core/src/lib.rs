pub mod coords;
pub mod error;
pub mod filter;
pub mod language;
pub mod preprocess;
pub mod selection;
pub mod session;

pub use coords::{into_absolute, to_absolute, to_relative};
pub use error::ResourceError;
pub use filter::DetectionFilter;
pub use language::{AnyScript, ScriptPredicate};
pub use selection::{RegionSelector, SelectionEvent};
pub use session::{CaptureRefusal, Session};
