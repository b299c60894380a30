use crate::{
    commands::CommandCall,
    domain::{ChatId, UserId},
};

/// Messenger-agnostic incoming update.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Message(IncomingMessage),
    /// Edits, callback queries, channel posts, ... Never routed.
    Other,
}

#[derive(Clone, Debug)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub sender: Option<UserId>,
    /// `None` when the message is not a bot command.
    pub command: Option<CommandCall>,
}

impl IncomingUpdate {
    pub fn message(&self) -> Option<&IncomingMessage> {
        match self {
            IncomingUpdate::Message(m) => Some(m),
            IncomingUpdate::Other => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseMode {
    MarkdownV2,
}

/// Persistent reply keyboard; each button sends its label as a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
    pub resize: bool,
}

impl ReplyKeyboard {
    pub fn buttons(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlButton {
    pub label: String,
    pub url: String,
}

/// Inline keyboard attached to a single message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<UrlButton>>,
}

impl InlineKeyboard {
    pub fn single(button: UrlButton) -> Self {
        Self {
            rows: vec![vec![button]],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyMarkup {
    Keyboard(ReplyKeyboard),
    Inline(InlineKeyboard),
    RemoveKeyboard,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Photo {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// One reply. With `photo` set, `text` is the photo caption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub reply_markup: Option<ReplyMarkup>,
    pub parse_mode: Option<ParseMode>,
    pub photo: Option<Photo>,
}

impl OutgoingMessage {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_markup: None,
            parse_mode: None,
            photo: None,
        }
    }

    pub fn photo(chat_id: ChatId, photo: Photo, caption: impl Into<String>) -> Self {
        Self {
            photo: Some(photo),
            ..Self::text(chat_id, caption)
        }
    }

    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }

    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }
}
