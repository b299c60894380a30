//! Clipboard pipeline: read, sanitize, format as code, attach a search link.

use crate::{
    formatting::code_span,
    messaging::types::{InlineKeyboard, ReplyMarkup, UrlButton},
    ports::ClipboardSource,
};

/// Substituted for the clipboard contents when they cannot be read.
pub const CLIPBOARD_ERROR_TEXT: &str = "Something Went Wrong!!!";

pub const SEARCH_BUTTON_LABEL: &str = "Search Google";

/// Telegram caps messages at 4096 characters; leave room for the caption.
const MAX_SHOWN_CHARS: usize = 3500;
/// Search engines ignore very long queries and Telegram rejects huge button URLs.
const MAX_QUERY_CHARS: usize = 500;

/// Formatted clipboard text (MarkdownV2) and its search button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipboardReply {
    pub text: String,
    pub markup: ReplyMarkup,
}

/// Read the clipboard, falling back to [`CLIPBOARD_ERROR_TEXT`].
pub fn read_or_sentinel(source: &dyn ClipboardSource) -> String {
    match source.read_text() {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("clipboard read failed: {e}");
            CLIPBOARD_ERROR_TEXT.to_string()
        }
    }
}

/// Double quotes become single quotes so they cannot break the markup.
pub fn sanitize(text: &str) -> String {
    text.replace('"', "'")
}

/// `prefix` followed by the percent-encoded query.
pub fn search_url(prefix: &str, query: &str) -> String {
    format!("{prefix}{}", urlencoding::encode(query))
}

pub fn build_reply(raw: &str, search_prefix: &str) -> ClipboardReply {
    let text = sanitize(raw);

    let button = UrlButton {
        label: SEARCH_BUTTON_LABEL.to_string(),
        url: search_url(search_prefix, &truncate_chars(&text, MAX_QUERY_CHARS)),
    };

    ClipboardReply {
        text: code_span(&truncate_chars(&text, MAX_SHOWN_CHARS)),
        markup: ReplyMarkup::Inline(InlineKeyboard::single(button)),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::Error, Result};

    struct Failing;

    impl ClipboardSource for Failing {
        fn read_text(&self) -> Result<String> {
            Err(Error::Clipboard("no text on clipboard".to_string()))
        }
    }

    fn url_of(reply: &ClipboardReply) -> &str {
        match &reply.markup {
            ReplyMarkup::Inline(kb) => &kb.rows[0][0].url,
            other => panic!("unexpected markup: {other:?}"),
        }
    }

    #[test]
    fn failed_read_yields_sentinel() {
        assert_eq!(read_or_sentinel(&Failing), CLIPBOARD_ERROR_TEXT);
    }

    #[test]
    fn quotes_are_sanitized_and_wrapped() {
        let reply = build_reply(r#"say "hi""#, "https://example.com/?q=");
        assert_eq!(reply.text, "`say 'hi'`");
    }

    #[test]
    fn search_link_is_percent_encoded() {
        let reply = build_reply("rust & go?", "https://www.google.com/search?q=");
        assert_eq!(
            url_of(&reply),
            "https://www.google.com/search?q=rust%20%26%20go%3F"
        );
    }

    #[test]
    fn long_text_is_truncated() {
        let long = "é".repeat(MAX_SHOWN_CHARS + 10);
        let reply = build_reply(&long, "https://example.com/?q=");
        assert!(reply.text.ends_with("…`"));
        assert_eq!(reply.text.chars().count(), MAX_SHOWN_CHARS + 3);
        assert!(url_of(&reply).len() < 10 * MAX_QUERY_CHARS);
    }
}
