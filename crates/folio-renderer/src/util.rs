//! Shared helpers.

use std::borrow::Cow;

/// Escape text for use in HTML element content and attribute values.
///
/// Returns the input unchanged (borrowed) when nothing needs escaping.
#[must_use]
pub fn escape_html(s: &str) -> Cow<'_, str> {
    let Some(first) = s.find(['&', '<', '>', '"', '\'']) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len() + 16);
    out.push_str(&s[..first]);
    for c in s[first..].chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_borrows_plain_text() {
        assert!(matches!(escape_html("graph TD; A-->B"), Cow::Owned(_)));
        assert!(matches!(escape_html("plain text"), Cow::Borrowed("plain text")));
    }

    #[test]
    fn test_escape_html_all_specials() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }
}
