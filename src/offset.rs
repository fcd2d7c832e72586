//! Character/byte offset conversion for document text.
//!
//! Annotations are located by character offsets, but Rust strings are
//! indexed by bytes:
//!
//! ```text
//! Text:   "Zoë met Łukasz"
//! Chars:   Z o ë _ m e t _ Ł u k a s z
//!          0 1 2 3 4 5 6 7 8 9 ...
//! Bytes:   Z o [ë ] _ m e t _ [Ł ] u ...
//!          0 1 2-3  4 5 6 7 8 9-10 11
//! ```
//!
//! [`CharIndex`] precomputes the char → byte table once per document so that
//! slicing covered text is O(1) per span. For ASCII text the table is skipped
//! and offsets map to themselves.
//!
//! Engines that report byte offsets (most Rust tokenizers do) convert them
//! with [`CharIndex::byte_span_to_chars`]; see
//! [`TokenDescriptor::from_byte_span`](crate::TokenDescriptor::from_byte_span).

/// Precomputed char → byte table for one text.
#[derive(Debug, Clone, Default)]
pub struct CharIndex {
    char_to_byte: Vec<usize>,
    char_len: usize,
    is_ascii: bool,
}

impl CharIndex {
    /// Build the index for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                char_to_byte: Vec::new(),
                char_len: text.len(),
                is_ascii: true,
            };
        }

        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        let char_len = char_to_byte.len();
        char_to_byte.push(text.len());

        Self {
            char_to_byte,
            char_len,
            is_ascii: false,
        }
    }

    /// Length of the text in characters.
    #[must_use]
    pub const fn char_len(&self) -> usize {
        self.char_len
    }

    /// Byte offset of a character offset, clamped to the end of the text.
    #[must_use]
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        if self.is_ascii {
            return char_idx.min(self.char_len);
        }
        self.char_to_byte
            .get(char_idx)
            .or_else(|| self.char_to_byte.last())
            .copied()
            .unwrap_or(0)
    }

    /// Character offset of a byte offset, rounding down to the start of the
    /// character it falls in. Clamps to the char count.
    #[must_use]
    pub fn byte_to_char_floor(&self, byte_idx: usize) -> usize {
        if self.is_ascii {
            return byte_idx.min(self.char_len);
        }
        self.char_to_byte
            .partition_point(|&b| b <= byte_idx)
            .saturating_sub(1)
            .min(self.char_len)
    }

    /// Character offset of a byte offset, rounding up past the character it
    /// falls in. Clamps to the char count.
    #[must_use]
    pub fn byte_to_char_ceil(&self, byte_idx: usize) -> usize {
        if self.is_ascii {
            return byte_idx.min(self.char_len);
        }
        self.char_to_byte
            .partition_point(|&b| b < byte_idx)
            .min(self.char_len)
    }

    /// Convert a byte range to a character range. A range cutting through a
    /// multi-byte character widens to cover it.
    #[must_use]
    pub fn byte_span_to_chars(&self, byte_start: usize, byte_end: usize) -> (usize, usize) {
        (self.byte_to_char_floor(byte_start), self.byte_to_char_ceil(byte_end))
    }

    /// Slice `text` by a character range. `text` must be the string this
    /// index was built from.
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str, char_start: usize, char_end: usize) -> &'a str {
        let start = self.char_to_byte(char_start);
        let end = self.char_to_byte(char_end).max(start);
        text.get(start..end).unwrap_or("")
    }
}
