use std::path::PathBuf;

/// A resource that failed to initialize. Callers fall back to the next
/// option and log the error once.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("font {path} could not be loaded: {reason}")]
    Font { path: PathBuf, reason: String },

    #[error("built-in font could not be parsed: {0}")]
    BuiltinFont(String),

    #[error("local model at {url} is unreachable: {reason}")]
    ModelUnreachable { url: String, reason: String },

    #[error("local model at {url} does not offer {from} -> {to}")]
    ModelLanguages {
        url: String,
        from: String,
        to: String,
    },
}
