//! Telegram adapter (teloxide).
//!
//! This crate implements the `deskbot-core` MessagingPort over the Telegram Bot
//! API and feeds incoming updates to the dispatcher through a channel.

use std::time::Duration;

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, InputFile, KeyboardButton, KeyboardMarkup,
        KeyboardRemove, ParseMode as TgParseMode, ReplyMarkup as TgReplyMarkup,
    },
};

pub mod feed;

use deskbot_core::{
    domain::ChatId,
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{OutgoingMessage, ParseMode, ReplyMarkup},
    },
    Result,
};

/// Extra HTTP headroom on top of the long-poll timeout.
const HTTP_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Build a bot whose HTTP client outlives a `poll_timeout` long poll, and
    /// verify the token with `getMe`.
    pub async fn connect(token: &str, poll_timeout: Duration) -> Result<Self> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(poll_timeout + HTTP_TIMEOUT_SLACK)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build http client: {e}")))?;
        let bot = Bot::with_client(token, client);

        let me = bot.get_me().await.map_err(Self::map_err)?;
        tracing::info!("connected to Telegram as @{}", me.username());

        Ok(Self::new(bot))
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Transport(format!("telegram error: {e}"))
    }
}

fn tg_parse_mode(mode: ParseMode) -> TgParseMode {
    match mode {
        ParseMode::MarkdownV2 => TgParseMode::MarkdownV2,
    }
}

fn tg_markup(markup: ReplyMarkup) -> Result<TgReplyMarkup> {
    Ok(match markup {
        ReplyMarkup::Keyboard(kb) => {
            let rows = kb
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>());
            TgReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard(kb.resize))
        }
        ReplyMarkup::Inline(kb) => {
            let mut rows = Vec::with_capacity(kb.rows.len());
            for row in kb.rows {
                let mut buttons = Vec::with_capacity(row.len());
                for b in row {
                    let url = reqwest::Url::parse(&b.url).map_err(|e| {
                        Error::External(format!("invalid button url {:?}: {e}", b.url))
                    })?;
                    buttons.push(InlineKeyboardButton::url(b.label, url));
                }
                rows.push(buttons);
            }
            TgReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(rows))
        }
        ReplyMarkup::RemoveKeyboard => TgReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
    })
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send(&self, msg: OutgoingMessage) -> Result<()> {
        let chat = Self::tg_chat(msg.chat_id);
        let markup = msg.reply_markup.map(tg_markup).transpose()?;

        if let Some(photo) = msg.photo {
            let file = InputFile::memory(photo.bytes).file_name(photo.file_name);
            let mut req = self.bot.send_photo(chat, file).caption(msg.text);
            if let Some(mode) = msg.parse_mode {
                req = req.parse_mode(tg_parse_mode(mode));
            }
            if let Some(markup) = markup {
                req = req.reply_markup(markup);
            }
            req.await.map_err(Self::map_err)?;
            return Ok(());
        }

        let mut req = self.bot.send_message(chat, msg.text);
        if let Some(mode) = msg.parse_mode {
            req = req.parse_mode(tg_parse_mode(mode));
        }
        if let Some(markup) = markup {
            req = req.reply_markup(markup);
        }
        req.await.map_err(Self::map_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskbot_core::{
        commands::start_keyboard,
        messaging::types::{InlineKeyboard, UrlButton},
    };

    #[test]
    fn start_keyboard_maps_to_one_resized_row() {
        let TgReplyMarkup::Keyboard(kb) = tg_markup(start_keyboard()).unwrap() else {
            panic!("expected reply keyboard");
        };
        let labels: Vec<&str> = kb.keyboard[0].iter().map(|b| b.text.as_str()).collect();
        assert_eq!(kb.keyboard.len(), 1);
        assert_eq!(labels, vec!["/send", "/clip"]);
    }

    #[test]
    fn inline_button_keeps_encoded_url() {
        let markup = ReplyMarkup::Inline(InlineKeyboard::single(UrlButton {
            label: "Search Google".to_string(),
            url: "https://www.google.com/search?q=a%20b".to_string(),
        }));
        let TgReplyMarkup::InlineKeyboard(kb) = tg_markup(markup).unwrap() else {
            panic!("expected inline keyboard");
        };
        assert_eq!(kb.inline_keyboard[0][0].text, "Search Google");
    }

    #[test]
    fn unparseable_button_url_is_an_error() {
        let markup = ReplyMarkup::Inline(InlineKeyboard::single(UrlButton {
            label: "x".to_string(),
            url: "not a url".to_string(),
        }));
        assert!(tg_markup(markup).is_err());
    }

    #[test]
    fn remove_keyboard_maps_directly() {
        assert!(matches!(
            tg_markup(ReplyMarkup::RemoveKeyboard).unwrap(),
            TgReplyMarkup::KeyboardRemove(_)
        ));
    }
}
