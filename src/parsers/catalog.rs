//! Capture patterns shipped with the tool.
//!
//! Every pattern defines the `block`, `key` and `value` groups expected by
//! [`BlockPattern`](super::pattern::BlockPattern).

/// gettext-style catalog: leading `#` comments, `msgid "<key>"`, `msgstr "<value>"`.
///
/// The block keeps its trailing newline, so rendered entries end up separated
/// by one blank line.
pub const CATALOG_PATTERN: &str = r#"(?m)(?P<block>(?:^#[^\n]*\n)*^msgid[ \t]+"(?P<key>(?:[^"\\\n]|\\.)*)"[ \t]*\r?\n^msgstr[ \t]+"(?P<value>(?:[^"\\\n]|\\.)*)"[ \t]*(?:\r?\n)?)"#;

/// `key=value` lines with optional `#`/`!` comment lines above them.
pub const KEY_VALUE_PATTERN: &str = r"(?m)(?P<block>(?:^[#!][^\n]*\n)*^(?P<key>[^#!=\s][^=\n]*?)[ \t]*=[ \t]*(?P<value>[^\r\n]*))";

pub fn builtin_pattern(suffix: &str) -> Option<&'static str> {
    match suffix.trim_start_matches('.') {
        "po" | "pot" => Some(CATALOG_PATTERN),
        "properties" | "resx" => Some(KEY_VALUE_PATTERN),
        _ => None,
    }
}
