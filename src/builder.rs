//! Sentence/token hierarchy from tokenizer output.
//!
//! The tokenizer reports, per sentence, an ordered list of
//! `(begin, end, part_of_speech)` triples over the full document text. The
//! builder commits one [`WordToken`] per triple and then the owning
//! [`Sentence`], whose span runs from the first token's begin to the largest
//! token end seen.
//!
//! ```text
//! tokens:   [0,6) [7,12) [13,17) [18,20) [21,26) [26,27)
//! sentence: [0,27)  document_order 0
//! ```

use serde::{Deserialize, Serialize};

use crate::offset::CharIndex;
use crate::{AnnotationStore, Error, Result, Sentence, Span, WordToken};

/// One token as reported by a tokenizer/POS tagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    /// Start character offset (inclusive)
    pub begin: usize,
    /// End character offset (exclusive)
    pub end: usize,
    /// Part-of-speech tag
    pub pos: String,
}

impl TokenDescriptor {
    /// Create a token descriptor.
    #[must_use]
    pub fn new(begin: usize, end: usize, pos: impl Into<String>) -> Self {
        Self {
            begin,
            end,
            pos: pos.into(),
        }
    }

    /// Create a token descriptor from byte offsets into the text `index`
    /// was built from.
    ///
    /// ```rust
    /// use anno_cas::offset::CharIndex;
    /// use anno_cas::TokenDescriptor;
    ///
    /// let text = "Zoë met Łukasz";
    /// let index = CharIndex::new(text);
    /// let token = TokenDescriptor::from_byte_span(&index, 9, 16, "NNP");
    /// assert_eq!((token.begin, token.end), (8, 14));
    /// ```
    #[must_use]
    pub fn from_byte_span(index: &CharIndex, byte_begin: usize, byte_end: usize, pos: impl Into<String>) -> Self {
        let (begin, end) = index.byte_span_to_chars(byte_begin, byte_end);
        Self::new(begin, end, pos)
    }

    /// Span of the token.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.begin, self.end)
    }
}

impl From<(usize, usize, &str)> for TokenDescriptor {
    fn from((begin, end, pos): (usize, usize, &str)) -> Self {
        Self::new(begin, end, pos)
    }
}

impl From<(usize, usize, String)> for TokenDescriptor {
    fn from((begin, end, pos): (usize, usize, String)) -> Self {
        Self::new(begin, end, pos)
    }
}

/// Counts committed by one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildSummary {
    /// Sentences committed
    pub sentences: usize,
    /// Word tokens committed
    pub tokens: usize,
}

impl BuildSummary {
    /// Total annotations committed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.sentences + self.tokens
    }
}

/// Builds sentences and word tokens in a store.
#[derive(Debug, Clone, Copy)]
pub struct SentenceBuilder {
    strict_token_order: bool,
}

impl Default for SentenceBuilder {
    fn default() -> Self {
        Self {
            strict_token_order: true,
        }
    }
}

impl SentenceBuilder {
    /// Create a builder that rejects out-of-order tokens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether decreasing token begins within a sentence are rejected.
    #[must_use]
    pub fn with_strict_token_order(mut self, strict: bool) -> Self {
        self.strict_token_order = strict;
        self
    }

    /// Commit the tokenizer output for a whole document.
    ///
    /// The input is validated before anything is written: on error the
    /// store is unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the store already has sentences, or a
    ///   sentence's token begins decrease under strict ordering
    /// - [`Error::InvalidSpan`] if any token span is inverted or out of bounds
    pub fn build(
        &self,
        store: &mut AnnotationStore,
        sentences: &[Vec<TokenDescriptor>],
    ) -> Result<BuildSummary> {
        if store.sentences().next().is_some() {
            return Err(Error::invalid_input("store already holds sentences"));
        }
        for (order, tokens) in sentences.iter().enumerate() {
            self.validate(store, order, tokens)?;
        }

        let mut summary = BuildSummary::default();
        for (order, tokens) in sentences.iter().enumerate() {
            summary.tokens += self.commit_sentence(store, order, tokens)?;
            summary.sentences += 1;
        }
        log::debug!(
            "[builder] {} sentences, {} tokens",
            summary.sentences,
            summary.tokens
        );
        Ok(summary)
    }

    fn validate(&self, store: &AnnotationStore, order: usize, tokens: &[TokenDescriptor]) -> Result<()> {
        let mut prev_begin = 0;
        for (i, token) in tokens.iter().enumerate() {
            store.check_span(token.span())?;
            if self.strict_token_order && i > 0 && token.begin < prev_begin {
                return Err(Error::invalid_input(format!(
                    "sentence {}: token {} begins at {} before token {} at {}",
                    order,
                    i,
                    token.begin,
                    i - 1,
                    prev_begin
                )));
            }
            prev_begin = token.begin;
        }
        Ok(())
    }

    fn commit_sentence(
        &self,
        store: &mut AnnotationStore,
        order: usize,
        tokens: &[TokenDescriptor],
    ) -> Result<usize> {
        let mut ids = Vec::with_capacity(tokens.len());
        let mut span: Option<Span> = None;

        for (sentence_order, token) in tokens.iter().enumerate() {
            let token_span = token.span();
            span = Some(match span {
                None => token_span,
                Some(s) => Span::new(s.begin, s.end.max(token_span.end)),
            });
            ids.push(store.add(WordToken {
                span: token_span,
                part_of_speech: token.pos.clone(),
                sentence_order,
            })?);
        }

        let span = span.unwrap_or_else(|| {
            log::warn!("[builder] sentence {} has no tokens; using [0, 0)", order);
            Span::default()
        });
        let count = ids.len();
        store.add(Sentence {
            span,
            document_order: order,
            tokens: ids,
        })?;
        Ok(count)
    }
}
