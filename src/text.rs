//! Bounded text formatting for log packets.

use core::fmt::{self, Write};

use heapless::Vec;

use crate::config::TEXT_MAX_LEN;

/// Formatted text capped at [`TEXT_MAX_LEN`] bytes. Overflow is cut at the last
/// whole character that fits; it is never an error.
pub struct TextBuf {
    bytes: Vec<u8, TEXT_MAX_LEN>,
    truncated: bool,
}

impl TextBuf {
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            truncated: false,
        }
    }

    pub fn format(args: fmt::Arguments<'_>) -> Self {
        let mut buf = Self::new();
        // `write_str` below never fails, so neither does formatting.
        let _ = buf.write_fmt(args);
        buf
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // Only whole UTF-8 sequences are ever appended.
        core::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl Default for TextBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for TextBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        let room = TEXT_MAX_LEN - self.bytes.len();
        let mut cut = s.len().min(room);
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        if self.bytes.extend_from_slice(&s.as_bytes()[..cut]).is_err() || cut < s.len() {
            self.truncated = true;
        }
        Ok(())
    }
}

/// Format and emit a text log on the normal uplink, like [`crate::Rat::info`].
///
/// ```
/// use rat_link::{rat_info, Config, Rat};
///
/// let rat: Rat = Rat::new(Config::new());
/// rat.init();
/// assert!(rat_info!(rat, "boot {}", 3) > 0);
/// ```
#[macro_export]
macro_rules! rat_info {
    ($rat:expr, $($arg:tt)*) => {
        $rat.info(::core::format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::TextBuf;
    use crate::config::TEXT_MAX_LEN;

    #[test]
    fn short_text_is_kept_whole() {
        let t = TextBuf::format(format_args!("temp={} ok={}", 21, true));
        assert_eq!(t.as_str(), "temp=21 ok=true");
        assert!(!t.is_truncated());
    }

    #[test]
    fn long_text_is_cut_to_capacity() {
        let long = "abc".repeat(100);
        let t = TextBuf::format(format_args!("{long}"));
        assert_eq!(t.as_bytes().len(), TEXT_MAX_LEN);
        assert_eq!(t.as_bytes(), &long.as_bytes()[..TEXT_MAX_LEN]);
        assert!(t.is_truncated());
    }

    #[test]
    fn cut_never_splits_a_character() {
        // 126 ASCII bytes leave one byte of room for a two-byte character.
        let head = "a".repeat(TEXT_MAX_LEN - 1);
        let t = TextBuf::format(format_args!("{head}é tail"));
        assert_eq!(t.as_bytes().len(), TEXT_MAX_LEN - 1);
        assert_eq!(t.as_str(), head);
        assert!(t.is_truncated());
    }

    #[test]
    fn exact_fit_is_not_truncated() {
        let exact = "z".repeat(TEXT_MAX_LEN);
        let t = TextBuf::format(format_args!("{exact}"));
        assert_eq!(t.as_str(), exact);
        assert!(!t.is_truncated());
    }
}
