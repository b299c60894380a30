//! Desktop-facing ports. Implementations live in `deskbot-desktop`; tests use
//! in-memory fakes.

use image::RgbaImage;

use crate::Result;

/// Captures the primary display. Blocking; callers move it off the runtime.
pub trait ScreenCapture: Send + Sync {
    fn capture_primary(&self) -> Result<RgbaImage>;
}

/// Reads the current clipboard text. Blocking.
pub trait ClipboardSource: Send + Sync {
    fn read_text(&self) -> Result<String>;
}

/// Name of the logged-in OS user, if it can be determined.
pub trait LocalUser: Send + Sync {
    fn name(&self) -> Option<String>;
}

/// Desktop notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice) -> Result<()>;
}

/// A desktop notification shown at a lifecycle point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn no_connection() -> Self {
        Self::new(
            "No Internet Connection",
            "Please Check your connectivity and try again!",
        )
    }

    pub fn config_generated() -> Self {
        Self::new(
            "Attention Needed!!!",
            "Config.json file is generated, Please review the file to fill the details required",
        )
    }

    pub fn token_missing() -> Self {
        Self::new(
            "Attention!!!",
            "Please provide your Telegram Bot API Token in config.json file",
        )
    }

    pub fn invalid_token() -> Self {
        Self::new("Error!!!", "Please verify your Token and try again.")
    }

    pub fn ready() -> Self {
        Self::new(
            "Bot Initialized...",
            "Now you are good to go, Enter /start in telegram bot.",
        )
    }

    pub fn terminated() -> Self {
        Self::new("Bot Terminated...", "Bot exited and cleared from memory...")
    }
}

/// Show a notice; failures are logged, never propagated.
pub fn notify_best_effort(notifier: &dyn Notifier, notice: &Notice) {
    if let Err(e) = notifier.notify(notice) {
        tracing::warn!(title = %notice.title, "desktop notification failed: {e}");
    }
}
