//! Startup gates and the exit code each lifecycle outcome maps to.

use std::{future::Future, process::ExitCode, sync::Arc};

use deskbot_core::{
    config::{Config, ConfigLoad},
    dispatcher::Shutdown,
    ports::{notify_best_effort, Notice, Notifier},
    Result,
};

/// Process exit status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    Success,
    Failure,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Success => ExitCode::SUCCESS,
            Exit::Failure => ExitCode::FAILURE,
        }
    }
}

/// Result of the startup gates: either everything needed to serve, or the
/// exit status to stop with.
pub enum Boot<M> {
    Ready { config: Arc<Config>, messenger: M },
    Stop(Exit),
}

/// Runs the startup gates in order: connectivity, credential file, transport.
///
/// `load` runs only once the machine is online, and `connect` only once a
/// usable config exists. Every failing gate shows its notice and stops with
/// [`Exit::Failure`].
pub async fn boot<M, L, C, Fut>(
    online: bool,
    load: L,
    connect: C,
    notifier: &dyn Notifier,
) -> Result<Boot<M>>
where
    L: FnOnce() -> Result<ConfigLoad>,
    C: FnOnce(Arc<Config>) -> Fut,
    Fut: Future<Output = Result<M>>,
{
    if !online {
        tracing::error!("no internet connection");
        notify_best_effort(notifier, &Notice::no_connection());
        return Ok(Boot::Stop(Exit::Failure));
    }

    let config = match load()? {
        ConfigLoad::Ready(cfg) => Arc::new(cfg),
        ConfigLoad::PlaceholderWritten { path, reason } => {
            tracing::warn!(
                "could not load {} ({reason}); wrote a placeholder to fill in",
                path.display()
            );
            notify_best_effort(notifier, &Notice::config_generated());
            return Ok(Boot::Stop(Exit::Failure));
        }
    };
    tracing::info!(
        "Configuration loaded from {}",
        config.settings.config_path.display()
    );
    tracing::info!("Authorized operator: {:?}", config.authorized_user.map(|u| u.0));

    if config.has_placeholder_token() {
        notify_best_effort(notifier, &Notice::token_missing());
    }

    match connect(config.clone()).await {
        Ok(messenger) => {
            notify_best_effort(notifier, &Notice::ready());
            Ok(Boot::Ready { config, messenger })
        }
        Err(e) => {
            tracing::error!("{e}");
            notify_best_effort(notifier, &Notice::invalid_token());
            Ok(Boot::Stop(Exit::Failure))
        }
    }
}

/// Every way the dispatcher stops is a clean exit; only Ctrl-C gets the
/// termination notice here, since `/exit` already showed it.
pub fn finish(outcome: Shutdown, notifier: &dyn Notifier) -> Exit {
    if outcome == Shutdown::Cancelled {
        notify_best_effort(notifier, &Notice::terminated());
    }
    tracing::info!(?outcome, "deskbot stopped");
    Exit::Success
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        sync::{
            atomic::{AtomicBool, Ordering},
            Mutex,
        },
    };

    use deskbot_core::{
        config::{Credentials, Settings},
        Error,
    };

    use super::*;

    #[derive(Default)]
    struct FakeNotifier {
        shown: Mutex<Vec<Notice>>,
        fail: bool,
    }

    impl Notifier for FakeNotifier {
        fn notify(&self, notice: &Notice) -> Result<()> {
            self.shown.lock().unwrap().push(notice.clone());
            if self.fail {
                return Err(Error::External("no notification daemon".to_string()));
            }
            Ok(())
        }
    }

    impl FakeNotifier {
        fn shown(&self) -> Vec<Notice> {
            self.shown.lock().unwrap().clone()
        }
    }

    fn ready_load(token: &str) -> Result<ConfigLoad> {
        let creds = Credentials {
            token: token.to_string(),
            user_id: 42,
        };
        Ok(ConfigLoad::Ready(Config::new(creds, Settings::default())))
    }

    fn placeholder_load() -> Result<ConfigLoad> {
        Ok(ConfigLoad::PlaceholderWritten {
            path: PathBuf::from("config.json"),
            reason: "No such file or directory".to_string(),
        })
    }

    async fn connected(_: Arc<Config>) -> Result<&'static str> {
        Ok("messenger")
    }

    async fn rejected(_: Arc<Config>) -> Result<&'static str> {
        Err(Error::Transport("telegram error: Unauthorized".to_string()))
    }

    fn stop_code<M>(boot: Boot<M>) -> Exit {
        match boot {
            Boot::Stop(exit) => exit,
            Boot::Ready { .. } => panic!("expected startup to stop"),
        }
    }

    #[tokio::test]
    async fn offline_stops_before_touching_config() {
        let notifier = FakeNotifier::default();
        let loaded = AtomicBool::new(false);

        let boot = boot(
            false,
            || {
                loaded.store(true, Ordering::SeqCst);
                ready_load("123:abc")
            },
            connected,
            &notifier,
        )
        .await
        .unwrap();

        assert_eq!(stop_code(boot), Exit::Failure);
        assert!(!loaded.load(Ordering::SeqCst));
        assert_eq!(notifier.shown(), vec![Notice::no_connection()]);
    }

    #[tokio::test]
    async fn generated_placeholder_stops_with_failure() {
        let notifier = FakeNotifier::default();

        let boot = boot(true, placeholder_load, connected, &notifier)
            .await
            .unwrap();

        assert_eq!(stop_code(boot), Exit::Failure);
        assert_eq!(notifier.shown(), vec![Notice::config_generated()]);
    }

    #[tokio::test]
    async fn rejected_token_stops_with_failure() {
        let notifier = FakeNotifier::default();

        let boot = boot(true, || ready_load(""), rejected, &notifier)
            .await
            .unwrap();

        assert_eq!(stop_code(boot), Exit::Failure);
        assert_eq!(notifier.shown(), vec![Notice::invalid_token()]);
    }

    #[tokio::test]
    async fn placeholder_token_warns_then_fails_to_connect() {
        let notifier = FakeNotifier::default();

        let boot = boot(true, || ready_load("YOUR_TOKEN_HERE"), rejected, &notifier)
            .await
            .unwrap();

        assert_eq!(stop_code(boot), Exit::Failure);
        assert_eq!(
            notifier.shown(),
            vec![Notice::token_missing(), Notice::invalid_token()]
        );
    }

    #[tokio::test]
    async fn valid_setup_is_ready() {
        let notifier = FakeNotifier::default();

        let boot = boot(true, || ready_load("123:abc"), connected, &notifier)
            .await
            .unwrap();

        let Boot::Ready { config, messenger } = boot else {
            panic!("expected ready");
        };
        assert_eq!(messenger, "messenger");
        assert_eq!(config.telegram_bot_token, "123:abc");
        assert_eq!(notifier.shown(), vec![Notice::ready()]);
    }

    #[tokio::test]
    async fn notification_failures_do_not_change_the_outcome() {
        let notifier = FakeNotifier {
            fail: true,
            ..FakeNotifier::default()
        };

        let boot = boot(false, placeholder_load, connected, &notifier)
            .await
            .unwrap();

        assert_eq!(stop_code(boot), Exit::Failure);
    }

    #[tokio::test]
    async fn config_write_failure_propagates() {
        let notifier = FakeNotifier::default();

        let res = boot(
            true,
            || Err(Error::Config("read-only directory".to_string())),
            connected,
            &notifier,
        )
        .await;

        assert!(res.is_err());
        assert!(notifier.shown().is_empty());
    }

    #[test]
    fn exit_command_exits_cleanly_without_second_notice() {
        let notifier = FakeNotifier::default();
        assert_eq!(finish(Shutdown::ExitCommand, &notifier), Exit::Success);
        assert_eq!(finish(Shutdown::FeedClosed, &notifier), Exit::Success);
        assert!(notifier.shown().is_empty());
    }

    #[test]
    fn interrupt_exits_cleanly_with_notice() {
        let notifier = FakeNotifier::default();
        assert_eq!(finish(Shutdown::Cancelled, &notifier), Exit::Success);
        assert_eq!(notifier.shown(), vec![Notice::terminated()]);
    }
}
