/// Core error type.
///
/// Adapter crates map their library errors into this type so the dispatcher
/// can tell fatal startup failures from per-command failures it replies to.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("screen capture failed: {0}")]
    Capture(String),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
