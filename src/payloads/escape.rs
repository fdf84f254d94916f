use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except the RFC 3986 unreserved characters gets percent-encoded.
const URI_DATA: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const MECARD_RESERVED: [char; 4] = ['\\', ';', ',', ':'];

/// Backslash-escapes the separators of the MECARD family of grammars
/// (`WIFI:`, `MEBKM:`, `MATMSG:`, `MECARD:`).
pub fn escape_input(value: &str) -> String {
    escape_chars(value, &MECARD_RESERVED)
}

/// Escapes only `:`, the field separator of positional grammars such as `SMTP:`.
pub fn escape_colons(value: &str) -> String {
    escape_chars(value, &[':'])
}

fn escape_chars(value: &str, reserved: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if reserved.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Text-value escaping shared by vCard 3.0 and iCalendar (RFC 5545 §3.3.11).
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | ';' | ',' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn uri_escape(value: &str) -> String {
    utf8_percent_encode(value, URI_DATA).to_string()
}

/// True when `value` looks like a raw hex key (optionally `0x`-prefixed).
pub fn is_hex_style(value: &str) -> bool {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
}
