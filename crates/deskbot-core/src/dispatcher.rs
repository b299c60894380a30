//! Command dispatcher: the bot's only long-running control loop.
//!
//! Updates arrive over an mpsc channel fed by the transport and are handled
//! strictly one at a time, in arrival order.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    clipboard,
    commands::{self, Command},
    config::Config,
    domain::ChatId,
    errors::Error,
    formatting::escape_markdown_v2,
    messaging::{
        port::MessagingPort,
        types::{IncomingUpdate, OutgoingMessage, ParseMode, ReplyMarkup},
    },
    ports::{notify_best_effort, ClipboardSource, LocalUser, Notice, Notifier, ScreenCapture},
    screenshot::{self, ScreenshotOptions},
};

/// Shown in captions when the OS user cannot be determined.
pub const ANONYMOUS_USER: &str = "Anonymous";

/// Handles to the local machine.
#[derive(Clone)]
pub struct DesktopPorts {
    pub capture: Arc<dyn ScreenCapture>,
    pub clipboard: Arc<dyn ClipboardSource>,
    pub user: Arc<dyn LocalUser>,
    pub notifier: Arc<dyn Notifier>,
}

/// What the loop does after an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Why [`Dispatcher::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shutdown {
    /// An operator sent `/exit`.
    ExitCommand,
    /// The transport dropped its end of the feed.
    FeedClosed,
    /// The cancellation token fired (Ctrl-C).
    Cancelled,
}

pub struct Dispatcher {
    cfg: Arc<Config>,
    messenger: Arc<dyn MessagingPort>,
    desktop: DesktopPorts,
}

impl Dispatcher {
    pub fn new(cfg: Arc<Config>, messenger: Arc<dyn MessagingPort>, desktop: DesktopPorts) -> Self {
        Self {
            cfg,
            messenger,
            desktop,
        }
    }

    /// Filter an update down to a routable command.
    ///
    /// Non-message updates, plain text, and (when an operator is configured)
    /// messages from anybody else are dropped without a reply.
    pub fn route(&self, update: &IncomingUpdate) -> Option<(ChatId, Command)> {
        let msg = update.message()?;
        let call = msg.command.as_ref()?;

        if let Some(operator) = self.cfg.authorized_user {
            if msg.sender != Some(operator) {
                tracing::debug!(sender = ?msg.sender, "ignoring command from unauthorized sender");
                return None;
            }
        }

        Some((msg.chat_id, Command::from_keyword(&call.name)))
    }

    /// Handle one update.
    pub async fn handle(&self, update: IncomingUpdate) -> Flow {
        let Some((chat_id, command)) = self.route(&update) else {
            return Flow::Continue;
        };
        tracing::info!(chat_id = chat_id.0, ?command, "handling command");

        match command {
            Command::Send => {
                self.send_screenshot(chat_id).await;
                Flow::Continue
            }
            Command::Exit => {
                notify_best_effort(self.desktop.notifier.as_ref(), &Notice::terminated());
                Flow::Exit
            }
            other => {
                if let Some(reply) = self.reply_for(chat_id, &other).await {
                    self.deliver(reply).await;
                }
                Flow::Continue
            }
        }
    }

    /// The single reply for commands answered with a message.
    ///
    /// `None` for `/send` (answered with a photo) and `/exit` (no reply).
    pub async fn reply_for(&self, chat_id: ChatId, command: &Command) -> Option<OutgoingMessage> {
        let reply = match command {
            Command::Help => OutgoingMessage::text(chat_id, commands::help_text()),
            Command::Start => OutgoingMessage::text(chat_id, commands::start_text())
                .with_markup(commands::start_keyboard()),
            Command::Close => OutgoingMessage::text(chat_id, commands::CLOSE_TEXT)
                .with_markup(ReplyMarkup::RemoveKeyboard),
            Command::Clip => self.clipboard_reply(chat_id).await,
            Command::Unknown(_) => OutgoingMessage::text(chat_id, commands::UNKNOWN_COMMAND_TEXT),
            Command::Send | Command::Exit => return None,
        };
        Some(reply)
    }

    /// Consume the feed until `/exit`, feed closure, or cancellation.
    pub async fn run(
        &self,
        mut updates: mpsc::Receiver<IncomingUpdate>,
        cancel: CancellationToken,
    ) -> Shutdown {
        tracing::info!(
            restricted = self.cfg.authorized_user.is_some(),
            "dispatcher started"
        );

        loop {
            let update = tokio::select! {
                _ = cancel.cancelled() => return Shutdown::Cancelled,
                next = updates.recv() => match next {
                    Some(update) => update,
                    None => return Shutdown::FeedClosed,
                },
            };

            if self.handle(update).await == Flow::Exit {
                return Shutdown::ExitCommand;
            }
        }
    }

    fn local_user(&self) -> String {
        self.desktop
            .user
            .name()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS_USER.to_string())
    }

    async fn clipboard_reply(&self, chat_id: ChatId) -> OutgoingMessage {
        let source = self.desktop.clipboard.clone();
        let raw = tokio::task::spawn_blocking(move || clipboard::read_or_sentinel(source.as_ref()))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("clipboard task failed: {e}");
                clipboard::CLIPBOARD_ERROR_TEXT.to_string()
            });

        let reply = clipboard::build_reply(&raw, &self.cfg.settings.search_url);
        let text = format!(
            "{}\n\n{}",
            reply.text,
            escape_markdown_v2(&screenshot::caption(&self.local_user()))
        );

        OutgoingMessage::text(chat_id, text)
            .with_markup(reply.markup)
            .with_parse_mode(ParseMode::MarkdownV2)
    }

    async fn send_screenshot(&self, chat_id: ChatId) {
        let opts = ScreenshotOptions::from(&self.cfg.settings);
        match screenshot::capture(self.desktop.capture.clone(), opts).await {
            Ok(photo) => {
                let caption = screenshot::caption(&self.local_user());
                self.deliver(OutgoingMessage::photo(chat_id, photo, caption))
                    .await;
            }
            Err(e) => {
                tracing::error!("screenshot failed: {e}");
                self.deliver(OutgoingMessage::text(chat_id, failure_text(&e)))
                    .await;
            }
        }
    }

    /// Send failures are logged; the loop keeps serving.
    async fn deliver(&self, msg: OutgoingMessage) {
        let chat_id = msg.chat_id.0;
        if let Err(e) = self.messenger.send(msg).await {
            tracing::error!(chat_id, "failed to send reply: {e}");
        }
    }
}

fn failure_text(e: &Error) -> String {
    format!("Screenshot failed: {e}")
}
