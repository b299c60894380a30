//! Long-polling update feed.
//!
//! One task calls `getUpdates` in a loop and pushes every update into a
//! bounded channel; the dispatcher is the sole consumer.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicI32, Ordering},
        Arc,
    },
    time::Duration,
};

use teloxide::{
    prelude::*,
    types::{Update, UpdateKind},
};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use deskbot_core::{
    commands::parse_command,
    domain::{ChatId, UserId},
    messaging::types::{IncomingMessage, IncomingUpdate},
};

/// Pause after a failed poll before asking Telegram again.
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(3);
const FEED_CAPACITY: usize = 100;
/// Upper bound on the offset confirmation made while shutting down.
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(3);

pub struct UpdateFeed {
    bot: Bot,
    next_offset: Arc<AtomicI32>,
    task: JoinHandle<()>,
}

impl UpdateFeed {
    /// Start polling. The task ends when `cancel` fires or the receiver is dropped.
    pub fn spawn(
        bot: Bot,
        poll_timeout: Duration,
        cancel: CancellationToken,
    ) -> (Self, mpsc::Receiver<IncomingUpdate>) {
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        let next_offset = Arc::new(AtomicI32::new(0));

        let task = tokio::spawn(poll_loop(
            bot.clone(),
            tx,
            next_offset.clone(),
            poll_timeout,
            cancel,
        ));

        (
            Self {
                bot,
                next_offset,
                task,
            },
            rx,
        )
    }

    /// Stop polling and confirm every fetched update with Telegram, so a
    /// consumed `/exit` is not redelivered on the next start.
    pub async fn shutdown(self) {
        self.task.abort();

        let offset = self.next_offset.load(Ordering::SeqCst);
        if offset == 0 {
            return;
        }
        let confirm = self.bot.get_updates().offset(offset).timeout(0).limit(1).send();
        match within(CONFIRM_TIMEOUT, confirm).await {
            Some(Ok(_)) => tracing::debug!("confirmed updates up to {offset}"),
            Some(Err(e)) => tracing::warn!("failed to confirm updates up to {offset}: {e}"),
            None => tracing::warn!(
                "confirming updates up to {offset} timed out after {}s",
                CONFIRM_TIMEOUT.as_secs()
            ),
        }
    }
}

/// `None` when `fut` did not finish within `limit`.
async fn within<F: Future>(limit: Duration, fut: F) -> Option<F::Output> {
    tokio::time::timeout(limit, fut).await.ok()
}

async fn poll_loop(
    bot: Bot,
    tx: mpsc::Sender<IncomingUpdate>,
    next_offset: Arc<AtomicI32>,
    poll_timeout: Duration,
    cancel: CancellationToken,
) {
    let timeout_secs = u32::try_from(poll_timeout.as_secs()).unwrap_or(u32::MAX);
    tracing::info!(timeout_secs, "polling Telegram for updates");

    loop {
        let offset = next_offset.load(Ordering::SeqCst);
        let req = bot.get_updates().offset(offset).timeout(timeout_secs);

        let res = tokio::select! {
            _ = cancel.cancelled() => break,
            res = req.send() => res,
        };

        match res {
            Ok(updates) => {
                for update in updates {
                    next_offset.store(update.id + 1, Ordering::SeqCst);
                    if tx.send(convert_update(&update)).await.is_err() {
                        tracing::debug!("update receiver dropped, stopping feed");
                        return;
                    }
                }
            }
            Err(e) => {
                tracing::warn!("getUpdates failed: {e}");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(POLL_ERROR_PAUSE) => {}
                }
            }
        }
    }

    tracing::debug!("update feed cancelled");
}

/// Reduce a Telegram update to what the dispatcher routes on.
pub fn convert_update(update: &Update) -> IncomingUpdate {
    let UpdateKind::Message(msg) = &update.kind else {
        return IncomingUpdate::Other;
    };

    IncomingUpdate::Message(IncomingMessage {
        chat_id: ChatId(msg.chat.id.0),
        sender: msg.from().map(|u| UserId(u.id.0 as i64)),
        command: msg.text().and_then(parse_command),
    })
}
