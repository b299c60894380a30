//! Telegram MarkdownV2 helpers.

/// Characters Telegram requires escaped in MarkdownV2 body text.
const MARKDOWN_V2_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Escape text for MarkdownV2 outside of any entity.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Wrap text in an inline code span. Inside code entities only `` ` `` and `\`
/// need escaping.
pub fn code_span(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('`');
    for c in text.chars() {
        if c == '`' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('`');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(escape_markdown_v2("From: a.b-c!"), "From: a\\.b\\-c\\!");
        assert_eq!(escape_markdown_v2("plain words"), "plain words");
    }

    #[test]
    fn code_span_only_escapes_backtick_and_backslash() {
        assert_eq!(code_span("a.b"), "`a.b`");
        assert_eq!(code_span("x`y\\z"), "`x\\`y\\\\z`");
    }
}
