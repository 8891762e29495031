//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data.

use crate::encoding::{convert_to_cp1252, text_width};

/// ESC/POS command builder
///
/// Builds ESC/POS byte sequences for thermal printers.
/// Text is kept as UTF-8 until [`build`](Self::build) converts it to Windows-1252.
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
}

impl EscPosBuilder {
    /// Create a new builder with the specified paper width in characters
    ///
    /// Common widths (font A):
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 42 or 48 characters depending on the printer
    pub fn new(width: usize) -> Self {
        let mut buf = Vec::with_capacity(4096);
        // Initialize printer (ESC @)
        buf.extend_from_slice(&[0x1B, 0x40]);
        Self { buf, width }
    }

    // === Text Output ===

    /// Write raw text
    pub fn text(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    /// Write text wrapped at the paper width, every line prefixed by `indent`
    pub fn wrapped(&mut self, indent: &str, s: &str) -> &mut Self {
        let room = self.width.saturating_sub(text_width(indent)).max(1);
        for chunk in wrap_words(s, room) {
            self.text(indent);
            self.line(&chunk);
        }
        self
    }

    /// Write empty line
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(b'\n');
        self
    }

    /// Write multiple empty lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        // ESC d n - Print and feed n lines
        self.buf.extend_from_slice(&[0x1B, 0x64, lines]);
        self
    }

    // === Alignment ===

    /// Align text to center
    pub fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x01]);
        self
    }

    /// Align text to left (default)
    pub fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x00]);
        self
    }

    // === Text Style ===

    /// Enable bold text
    pub fn bold(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x01]);
        self
    }

    /// Disable bold text
    pub fn bold_off(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x00]);
        self
    }

    /// Select font A (12x24, default)
    pub fn font_a(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x4D, 0x00]);
        self
    }

    /// Select font B (9x17, condensed)
    pub fn font_b(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x4D, 0x01]);
        self
    }

    /// Double width and height
    pub fn double_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x11]);
        self
    }

    /// Double height only
    pub fn double_height(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x01]);
        self
    }

    /// Reset to normal size
    pub fn reset_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x00]);
        self
    }

    // === Separators ===

    /// Print a line of '=' characters
    pub fn sep_double(&mut self) -> &mut Self {
        self.line(&"=".repeat(self.width))
    }

    // === Paper Control ===

    /// Cut paper (full cut)
    pub fn cut(&mut self) -> &mut Self {
        // GS V 0 - Full cut
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x00]);
        self
    }

    // === Build ===

    /// Build the final byte buffer with Windows-1252 encoding
    ///
    /// This converts all UTF-8 text while preserving ESC/POS commands.
    pub fn build(self) -> Vec<u8> {
        convert_to_cp1252(&self.buf)
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap_words(s: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in s.split_whitespace() {
        let mut word: String = word.to_string();
        while text_width(&word) > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(head);
        }
        if word.is_empty() {
            continue;
        }
        if current.is_empty() {
            current = word;
        } else if text_width(&current) + 1 + text_width(&word) <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Code page select, init, code page select
    const PREAMBLE: usize = 8;

    fn printed(b: EscPosBuilder) -> String {
        let data = b.build();
        String::from_utf8_lossy(&data[PREAMBLE..]).into_owned()
    }

    #[test]
    fn test_builder_basic() {
        let mut b = EscPosBuilder::new(32);
        b.center()
            .double_size()
            .line("TAKEOUT")
            .reset_size()
            .left()
            .line("1. Dragon Roll");

        let data = b.build();
        assert_eq!(&data[3..5], &[0x1B, 0x40]);
        let s = String::from_utf8_lossy(&data);
        assert!(s.contains("TAKEOUT"));
        assert!(s.contains("Dragon Roll"));
    }

    #[test]
    fn test_separator_spans_width() {
        let mut b = EscPosBuilder::new(10);
        b.sep_double();

        assert_eq!(printed(b), "==========\n");
    }

    #[test]
    fn test_wrapped_indents_every_line() {
        let mut b = EscPosBuilder::new(16);
        b.wrapped("    ", "extra ginger no wasabi please");

        assert_eq!(printed(b), "    extra ginger\n    no wasabi\n    please\n");
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap_words("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_words("", 3), vec![""]);
    }

    #[test]
    fn test_build_encodes_text() {
        let mut b = EscPosBuilder::new(20);
        b.line("Crème");
        let data = b.build();
        assert!(data.windows(2).any(|w| w == [b'r', 0xE8]));
    }
}
