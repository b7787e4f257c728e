//! Byte decoding for properties files
//!
//! A byte order mark decides the encoding when present. Otherwise strict
//! UTF-8 is tried first, then ISO-8859-1 (read as windows-1252), the
//! traditional encoding of `.properties` files.

use encoding_rs::{Encoding, WINDOWS_1252};
use std::borrow::Cow;

/// Decode properties file bytes into text. Never fails: every byte sequence
/// is valid windows-1252.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            tracing::warn!(encoding = encoding.name(), "Replaced malformed bytes in properties file");
        }
        return text;
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    tracing::debug!("Properties file is not UTF-8, decoded as ISO-8859-1");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_is_borrowed() {
        let text = decode("server.name=Hôpital\n".as_bytes());
        assert!(matches!(text, Cow::Borrowed(_)));
        assert_eq!(text, "server.name=Hôpital\n");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let bytes = b"\xEF\xBB\xBFfhir_version=R5\n";
        assert_eq!(decode(bytes), "fhir_version=R5\n");
    }

    #[test]
    fn utf16_bom_selects_utf16() {
        let bytes = [0xFF, 0xFE, b'a', 0, b'=', 0, b'1', 0];
        assert_eq!(decode(&bytes), "a=1");
    }

    #[test]
    fn latin1_falls_back() {
        assert_eq!(decode(b"server.name=H\xF4pital\n"), "server.name=H\u{f4}pital\n");
    }
}
