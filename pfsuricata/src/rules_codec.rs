//! Storage encoding for suppression list rule text.
//!
//! pfSense keeps the rule text base64-encoded with Windows line endings. The
//! transform is one-way with respect to line endings: decoding never turns
//! CRLF back into LF.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Replace every LF with CRLF, then base64-encode the UTF-8 bytes.
pub fn encode_rules(text: &str) -> String {
    STANDARD.encode(normalize_line_endings(text))
}

/// Decode a stored value back into text. Returns `None` for invalid base64
/// or non-UTF-8 content.
pub fn decode_rules(stored: &str) -> Option<String> {
    let bytes = STANDARD.decode(stored.trim()).ok()?;
    String::from_utf8(bytes).ok()
}

/// The LF -> CRLF rewrite applied before encoding.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace('\n', "\r\n")
}
