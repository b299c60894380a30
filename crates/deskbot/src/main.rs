use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use deskbot_core::{
    config::{Config, Settings},
    connectivity,
    dispatcher::Dispatcher,
};
use deskbot_desktop::{desktop_ports, DesktopNotifier};
use deskbot_telegram::{feed::UpdateFeed, TelegramMessenger};

mod startup;

use startup::{boot, finish, Boot};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = deskbot_core::logging::init("deskbot") {
        eprintln!("{e}");
    }

    match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let settings = Settings::from_env(std::env::args_os().nth(1).map(PathBuf::from));
    let notifier = Arc::new(DesktopNotifier::new(&settings));

    let online =
        connectivity::is_online(&settings.connectivity_url, settings.connectivity_timeout).await;
    let config_path = settings.config_path.clone();

    let (cfg, messenger) = match boot(
        online,
        || Config::load(settings),
        |cfg: Arc<Config>| async move {
            TelegramMessenger::connect(&cfg.telegram_bot_token, cfg.settings.poll_timeout).await
        },
        notifier.as_ref(),
    )
    .await
    .with_context(|| format!("failed to initialize {}", config_path.display()))?
    {
        Boot::Ready { config, messenger } => (config, messenger),
        Boot::Stop(exit) => return Ok(exit.into()),
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received");
                cancel.cancel();
            }
        });
    }

    let (feed, updates) =
        UpdateFeed::spawn(messenger.bot(), cfg.settings.poll_timeout, cancel.clone());
    let dispatcher = Dispatcher::new(cfg.clone(), Arc::new(messenger), desktop_ports(notifier.clone()));

    let outcome = dispatcher.run(updates, cancel.clone()).await;
    cancel.cancel();
    feed.shutdown().await;

    Ok(finish(outcome, notifier.as_ref()).into())
}
