use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// Anything outside the XML 1.0 `Char` production.
static ILLEGAL_XML_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\x09\x0A\x0D\x20-\x{D7FF}\x{E000}-\x{FFFD}\x{10000}-\x{10FFFF}]").unwrap()
});

/// Remove code points that may not appear in an XML document, such as NUL
/// or vertical tab. Borrows when there is nothing to remove.
pub fn strip_control_chars(text: &str) -> Cow<'_, str> {
    ILLEGAL_XML_CHARS.replace_all(text, "")
}

/// Make arbitrary text safe for element content.
pub fn escape_xml(text: &str) -> String {
    escape(text, false)
}

/// Like [`escape_xml`], but also writes tab, line feed and carriage return
/// as character references. Parsers normalize those to spaces in attribute
/// values.
pub fn escape_attr(text: &str) -> String {
    escape(text, true)
}

fn escape(text: &str, attribute: bool) -> String {
    let clean = strip_control_chars(text);
    let mut out = String::with_capacity(clean.len());
    for c in clean.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' if attribute => out.push_str("&#9;"),
            '\n' if attribute => out.push_str("&#10;"),
            '\r' if attribute => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}
