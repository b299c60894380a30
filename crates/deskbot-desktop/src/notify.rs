use notify_rust::Notification;

use deskbot_core::{
    config::Settings,
    errors::Error,
    ports::{Notice, Notifier},
    Result,
};

pub const APP_NAME: &str = "DeskBot";

/// Desktop toast/bubble notifications. Every notice is also logged, so a
/// disabled or headless notifier still leaves a trail.
#[derive(Clone, Debug)]
pub struct DesktopNotifier {
    enabled: bool,
    icon: Option<String>,
}

impl DesktopNotifier {
    pub fn new(settings: &Settings) -> Self {
        Self {
            enabled: settings.notifications_enabled,
            icon: settings.notification_icon.clone(),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notice: &Notice) -> Result<()> {
        tracing::info!(title = %notice.title, "{}", notice.message);
        if !self.enabled {
            return Ok(());
        }

        let mut n = Notification::new();
        n.appname(APP_NAME)
            .summary(&notice.title)
            .body(&notice.message);
        if let Some(icon) = &self.icon {
            n.icon(icon);
        }

        n.show()
            .map(|_| ())
            .map_err(|e| Error::External(format!("notification failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_notifier_never_touches_the_desktop() {
        let settings = Settings {
            notifications_enabled: false,
            ..Settings::default()
        };
        let notifier = DesktopNotifier::new(&settings);
        assert!(notifier.notify(&Notice::ready()).is_ok());
    }
}
