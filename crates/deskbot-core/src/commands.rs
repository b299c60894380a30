//! Chat commands: parsing, keywords and the static texts they reply with.

use crate::messaging::types::{ReplyKeyboard, ReplyMarkup};

const COMMAND_LIST: &str = "/start - Start Bot and Enable Shortcut\n\
/send - Send captured Screenshot\n\
/clip - Send Clipboard data\n\
/close - Close the Shortcut buttons\n\
/exit - Stop Bot Application completely\n\
/help - Know more about each commands";

pub const UNKNOWN_COMMAND_TEXT: &str = "I don't know that command";
pub const CLOSE_TEXT: &str = "Shortcut Closed";

/// A slash command as typed in the chat, e.g. `/send@desk_bot now`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandCall {
    pub name: String,
    pub args: String,
}

/// Parse a bot command. Returns `None` for plain text.
///
/// Telegram may send `/cmd@botname arg1 ...`; the mention is stripped. The
/// keyword keeps its case, so `/HELP` is an unknown command.
pub fn parse_command(text: &str) -> Option<CommandCall> {
    let rest = text.strip_prefix('/')?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim().to_string();

    let name = first.split('@').next().unwrap_or("");
    if name.is_empty() {
        return None;
    }

    Some(CommandCall {
        name: name.to_string(),
        args,
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Send,
    Clip,
    Start,
    Close,
    Exit,
    Unknown(String),
}

impl Command {
    pub fn from_keyword(name: &str) -> Self {
        match name {
            "help" => Command::Help,
            "send" => Command::Send,
            "clip" => Command::Clip,
            "start" => Command::Start,
            "close" => Command::Close,
            "exit" => Command::Exit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

pub fn help_text() -> String {
    format!("I understand these commands:\n{COMMAND_LIST}")
}

pub fn start_text() -> String {
    format!("Bot Working...\nList of Commands:\n{COMMAND_LIST}")
}

/// The shortcut keyboard shown by `/start`: one row, `/send` and `/clip`.
pub fn start_keyboard() -> ReplyMarkup {
    ReplyMarkup::Keyboard(ReplyKeyboard {
        rows: vec![vec!["/send".to_string(), "/clip".to_string()]],
        resize: true,
    })
}
