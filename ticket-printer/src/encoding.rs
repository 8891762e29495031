//! Windows-1252 encoding utilities for Latin thermal printers
//!
//! Receipt printers sold in North America and Europe default to a single-byte
//! code page. This module provides utilities for:
//! - Calculating printed column widths
//! - Converting UTF-8 to Windows-1252 while preserving ESC/POS commands

use tracing::instrument;

/// ESC t 16 - Select character code table WPC1252
const SELECT_WPC1252: [u8; 3] = [0x1B, 0x74, 16];

/// Byte printed for characters the code page cannot represent
const UNMAPPABLE: u8 = b'?';

/// Get the printed column width of a string
///
/// Every character occupies one column in a single-byte code page,
/// including the `?` substituted for unmappable characters.
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Convert mixed UTF-8 content (with ESC/POS commands) to Windows-1252
///
/// ASCII bytes (0x00-0x7F) pass through untouched, which protects ESC/POS
/// commands from being corrupted. Only runs of bytes >= 0x80 are decoded as
/// UTF-8 and re-encoded.
///
/// The code page is selected at the start and again after every INIT
/// command (ESC @), because INIT resets the printer to its default table.
#[instrument(skip(bytes))]
pub fn convert_to_cp1252(bytes: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(bytes.len() + SELECT_WPC1252.len());
    result.extend_from_slice(&SELECT_WPC1252);

    let mut buffer = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b == 0x1B && i + 1 < bytes.len() && bytes[i + 1] == 0x40 {
            flush_buffer(&mut buffer, &mut result);
            result.extend_from_slice(&[0x1B, 0x40]);
            result.extend_from_slice(&SELECT_WPC1252);
            i += 2;
            continue;
        }

        if b < 128 {
            flush_buffer(&mut buffer, &mut result);
            result.push(b);
        } else {
            buffer.push(b);
        }
        i += 1;
    }

    flush_buffer(&mut buffer, &mut result);
    result
}

/// Flush the non-ASCII buffer, converting UTF-8 to Windows-1252
fn flush_buffer(buffer: &mut Vec<u8>, result: &mut Vec<u8>) {
    if buffer.is_empty() {
        return;
    }

    let s = String::from_utf8_lossy(buffer);
    let mut utf8 = [0u8; 4];
    for c in s.chars() {
        let (encoded, _, had_errors) = encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut utf8));
        if had_errors {
            result.push(UNMAPPABLE);
        } else {
            result.extend_from_slice(&encoded);
        }
    }
    buffer.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("hello"), 5);
        assert_eq!(text_width("crème brûlée"), 12);
    }

    #[test]
    fn test_convert_preserves_commands_and_encodes_accents() {
        let input = "\x1B\x45\x01Café\n".as_bytes();
        let out = convert_to_cp1252(input);

        assert_eq!(&out[..3], &SELECT_WPC1252);
        assert_eq!(&out[3..6], &[0x1B, 0x45, 0x01]);
        assert_eq!(&out[6..], &[b'C', b'a', b'f', 0xE9, b'\n']);
    }

    #[test]
    fn test_convert_reselects_code_page_after_init() {
        let out = convert_to_cp1252(&[0x1B, 0x40, b'A']);
        assert_eq!(out, vec![0x1B, 0x74, 16, 0x1B, 0x40, 0x1B, 0x74, 16, b'A']);
    }

    #[test]
    fn test_convert_replaces_unmappable() {
        let out = convert_to_cp1252("寿司€".as_bytes());
        assert_eq!(&out[3..], &[b'?', b'?', 0x80]);
    }
}
