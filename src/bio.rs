//! BIO run decoding: per-token NER tags → entity spans.
//!
//! # Schemes
//!
//! - [`TagScheme::Plain`]: raw labels ("PERSON", "O"). Consecutive tokens
//!   with the same label form one run; any label change closes it.
//! - [`TagScheme::Iob2`]: prefixed labels ("B-PERSON", "I-PERSON", "O").
//!   `B-` always opens a run, `I-` continues a run of the same type.
//!
//! In both schemes a run still open at the end of the sequence is emitted.
//!
//! # Example
//!
//! ```rust
//! use anno_cas::bio::{decode_runs, TagRun, TagScheme};
//!
//! let tags = ["PERSON", "PERSON", "O", "O", "LOCATION"];
//! let runs = decode_runs(&tags, TagScheme::Plain);
//! assert_eq!(runs, vec![
//!     TagRun { label: "PERSON".into(), first: 0, last: 1 },
//!     TagRun { label: "LOCATION".into(), first: 4, last: 4 },
//! ]);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AnnotationId, AnnotationStore, Entity, Error, Result, Span};

/// Tag marking a token outside any entity.
pub const OUTSIDE: &str = "O";

/// Tagging scheme of NER engine output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagScheme {
    /// Raw entity labels; a run is a maximal stretch of one label
    #[default]
    Plain,
    /// IOB2: B- always starts an entity
    Iob2,
}

impl fmt::Display for TagScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagScheme::Plain => write!(f, "plain"),
            TagScheme::Iob2 => write!(f, "IOB2"),
        }
    }
}

/// A parsed IOB2 tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Iob2Tag<'a> {
    Outside,
    Begin(&'a str),
    Inside(&'a str),
}

impl<'a> Iob2Tag<'a> {
    /// Parse a tag. Anything not `B-X`/`I-X` with a non-empty `X` is outside.
    fn parse(tag: &'a str) -> Self {
        if let Some(label) = tag.strip_prefix("B-").filter(|l| !l.is_empty()) {
            Self::Begin(label)
        } else if let Some(label) = tag.strip_prefix("I-").filter(|l| !l.is_empty()) {
            Self::Inside(label)
        } else {
            Self::Outside
        }
    }
}

/// A closed run of tokens sharing one entity label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRun {
    /// Entity label, without any scheme prefix
    pub label: String,
    /// Index of the first token (inclusive)
    pub first: usize,
    /// Index of the last token (inclusive)
    pub last: usize,
}

impl TagRun {
    /// Number of tokens in the run (always at least one).
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.last - self.first + 1
    }
}

/// Decode a tag sequence into runs, left to right.
#[must_use]
pub fn decode_runs<S: AsRef<str>>(tags: &[S], scheme: TagScheme) -> Vec<TagRun> {
    let mut runs = Vec::new();
    let mut open: Option<(usize, &str)> = None;

    let mut close = |open: &mut Option<(usize, &str)>, last: usize| {
        if let Some((first, label)) = open.take() {
            runs.push(TagRun {
                label: label.to_string(),
                first,
                last,
            });
        }
    };

    for (i, tag) in tags.iter().enumerate() {
        let tag = tag.as_ref();
        match scheme {
            TagScheme::Plain => {
                if tag == OUTSIDE {
                    close(&mut open, i.saturating_sub(1));
                } else if open.map(|(_, label)| label) != Some(tag) {
                    close(&mut open, i.saturating_sub(1));
                    open = Some((i, tag));
                }
            }
            TagScheme::Iob2 => match Iob2Tag::parse(tag) {
                Iob2Tag::Outside => close(&mut open, i.saturating_sub(1)),
                Iob2Tag::Begin(label) => {
                    close(&mut open, i.saturating_sub(1));
                    open = Some((i, label));
                }
                Iob2Tag::Inside(label) => {
                    if open.map(|(_, l)| l) != Some(label) {
                        close(&mut open, i.saturating_sub(1));
                        open = Some((i, label));
                    }
                }
            },
        }
    }

    // Trailing run
    close(&mut open, tags.len().saturating_sub(1));
    runs
}

/// Commits decoded runs as [`Entity`] annotations.
#[derive(Debug, Clone, Copy, Default)]
pub struct BioDecoder {
    scheme: TagScheme,
}

impl BioDecoder {
    /// Create a decoder for the given scheme.
    #[must_use]
    pub fn new(scheme: TagScheme) -> Self {
        Self { scheme }
    }

    /// Scheme this decoder reads.
    #[must_use]
    pub fn scheme(&self) -> TagScheme {
        self.scheme
    }

    /// Decode one sentence's tags and commit an entity per run.
    ///
    /// `tags` must be aligned 1:1 with the sentence's tokens. Entities are
    /// committed run by run: if a commit fails, the runs before it stay in
    /// the store.
    pub fn decode_sentence<S: AsRef<str>>(
        &self,
        store: &mut AnnotationStore,
        sentence: AnnotationId,
        tags: &[S],
    ) -> Result<Vec<AnnotationId>> {
        let spans = self.aligned_spans(store, sentence, tags.len())?;
        self.commit(store, &spans, tags)
    }

    /// Decode every sentence of the store, in document order.
    ///
    /// All sentences are checked for alignment before anything is committed.
    pub fn decode_document<S: AsRef<str>>(
        &self,
        store: &mut AnnotationStore,
        tags: &[Vec<S>],
    ) -> Result<Vec<AnnotationId>> {
        let sentences: Vec<AnnotationId> = store.sentences().map(|(id, _)| id).collect();
        if sentences.len() != tags.len() {
            return Err(Error::invalid_input(format!(
                "NER output has {} sentences, document has {}",
                tags.len(),
                sentences.len()
            )));
        }

        let mut aligned = Vec::with_capacity(sentences.len());
        for (&sentence, sentence_tags) in sentences.iter().zip(tags) {
            aligned.push(self.aligned_spans(store, sentence, sentence_tags.len())?);
        }

        let mut added = Vec::new();
        for (spans, sentence_tags) in aligned.iter().zip(tags) {
            added.extend(self.commit(store, spans, sentence_tags)?);
        }
        log::debug!(
            "[bio] {} entities over {} sentences ({})",
            added.len(),
            sentences.len(),
            self.scheme
        );
        Ok(added)
    }

    /// Token spans of a sentence, checked against the tag count.
    fn aligned_spans(
        &self,
        store: &AnnotationStore,
        sentence_id: AnnotationId,
        tag_count: usize,
    ) -> Result<Vec<Span>> {
        let sentence = store
            .sentence(sentence_id)
            .ok_or_else(|| Error::unknown_annotation(format!("{} is not a sentence", sentence_id)))?;
        if sentence.len() != tag_count {
            return Err(Error::TagAlignment {
                sentence: sentence.document_order,
                tokens: sentence.len(),
                tags: tag_count,
            });
        }
        Ok(store.tokens_of(sentence).map(|(_, t)| t.span).collect())
    }

    fn commit<S: AsRef<str>>(
        &self,
        store: &mut AnnotationStore,
        spans: &[Span],
        tags: &[S],
    ) -> Result<Vec<AnnotationId>> {
        let mut added = Vec::new();
        for run in decode_runs(tags, self.scheme) {
            let span = Span::new(spans[run.first].begin, spans[run.last].end);
            let entity = Entity::new(span, run.label);
            log::debug!(
                "[bio] {} {} {:?}",
                entity.kind,
                span,
                store.covered_text(span)
            );
            added.push(store.add(entity)?);
        }
        Ok(added)
    }
}
