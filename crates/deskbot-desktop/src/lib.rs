//! Desktop adapters: screen capture, clipboard, notifications, local user.
//!
//! Implements the `deskbot-core` desktop ports over `xcap`, `arboard` and
//! `notify-rust`.

use std::sync::Arc;

use deskbot_core::dispatcher::DesktopPorts;

pub mod capture;
pub mod clipboard;
pub mod notify;
pub mod user;

pub use capture::PrimaryDisplay;
pub use clipboard::SystemClipboard;
pub use notify::DesktopNotifier;
pub use user::EnvUser;

/// Wire the real desktop into the dispatcher's ports.
pub fn desktop_ports(notifier: Arc<DesktopNotifier>) -> DesktopPorts {
    DesktopPorts {
        capture: Arc::new(PrimaryDisplay),
        clipboard: Arc::new(SystemClipboard),
        user: Arc::new(EnvUser),
        notifier,
    }
}
