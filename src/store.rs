//! The append-only annotation store.
//!
//! [`AnnotationStore`] owns a document's text and every annotation over it.
//! It knows nothing about NLP semantics beyond structural consistency:
//! spans must lie within the text, and sentences may only reference word
//! tokens already in the store.
//!
//! # Query shapes
//!
//! | Query | Order |
//! |-------|-------|
//! | [`by_type`](AnnotationStore::by_type) | insertion |
//! | [`covering`](AnnotationStore::covering) | begin ↑, length ↑, insertion ↑ |
//! | [`contained_in`](AnnotationStore::contained_in) | begin ↑, length ↑, insertion ↑ |
//!
//! The covering order is what makes "first covering entity wins" in the
//! [`TagResolver`](crate::TagResolver) reproducible.
//!
//! # Example
//!
//! ```rust
//! use anno_cas::{AnnotationStore, AnnotationType, Entity, Span};
//!
//! let mut store = AnnotationStore::new("Barack Obama went to Paris.");
//! store.add(Entity::new(Span::new(0, 12), "PERSON")).unwrap();
//! store.add(Entity::new(Span::new(21, 26), "LOCATION")).unwrap();
//!
//! let hits = store.covering(AnnotationType::Entity, Span::new(7, 12));
//! assert_eq!(hits.len(), 1);
//! assert_eq!(store.covered_text(hits[0].1.span()), "Barack Obama");
//!
//! // Out of bounds
//! assert!(store.add(Entity::new(Span::new(21, 40), "LOCATION")).is_err());
//! ```

use std::collections::{HashMap, HashSet};

use crate::annotation::{Annotation, AnnotationId, AnnotationType, Entity, Sentence, WordToken};
use crate::coref::CorefChain;
use crate::index::SpanIndex;
use crate::offset::CharIndex;
use crate::{Error, Result, Span};

/// Text plus all annotations over it, with type and span indexes.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    text: String,
    chars: CharIndex,
    annotations: Vec<Annotation>,
    /// Per-type insertion order, indexed by `AnnotationType::slot`
    by_type: [Vec<AnnotationId>; 3],
    /// Per-type span index, indexed by `AnnotationType::slot`
    spans: [SpanIndex; 3],
    /// Sentence document_order → handle
    sentence_by_order: HashMap<usize, AnnotationId>,
    /// Word token → owning sentence
    token_sentence: HashMap<AnnotationId, AnnotationId>,
    chains: Vec<CorefChain>,
}

impl AnnotationStore {
    /// Create an empty store over `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let chars = CharIndex::new(&text);
        Self {
            text,
            chars,
            annotations: Vec::new(),
            by_type: Default::default(),
            spans: Default::default(),
            sentence_by_order: HashMap::new(),
            token_sentence: HashMap::new(),
            chains: Vec::new(),
        }
    }

    /// Document text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Document length in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.chars.char_len()
    }

    /// Text covered by a span (empty if the span is out of bounds).
    #[must_use]
    pub fn covered_text(&self, span: Span) -> &str {
        self.chars.slice(&self.text, span.begin, span.end)
    }

    /// Validate a span against the document bounds.
    pub fn check_span(&self, span: Span) -> Result<()> {
        span.check(self.char_len())
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Append an annotation and return its handle.
    ///
    /// Fails with [`Error::InvalidSpan`] for inverted or out-of-bounds spans.
    /// Sentences are further checked: every token handle must name a word
    /// token not yet owned by another sentence, and `document_order` must
    /// exceed that of every sentence already stored.
    pub fn add(&mut self, annotation: impl Into<Annotation>) -> Result<AnnotationId> {
        let annotation = annotation.into();
        let span = annotation.span();
        self.check_span(span)?;

        if let Annotation::Sentence(sentence) = &annotation {
            self.check_sentence(sentence)?;
        }

        let id = AnnotationId(u32::try_from(self.annotations.len()).map_err(|_| {
            Error::invalid_input("annotation store is full")
        })?);
        let ty = annotation.annotation_type();

        if let Annotation::Sentence(sentence) = &annotation {
            self.sentence_by_order.insert(sentence.document_order, id);
            for &token in &sentence.tokens {
                self.token_sentence.insert(token, id);
            }
        }

        self.by_type[ty.slot()].push(id);
        self.spans[ty.slot()].insert(id, span);
        self.annotations.push(annotation);
        Ok(id)
    }

    fn check_sentence(&self, sentence: &Sentence) -> Result<()> {
        if let Some(last) = self.sentences().next_back() {
            if sentence.document_order <= last.1.document_order {
                return Err(Error::invalid_input(format!(
                    "sentence document order {} does not follow {}",
                    sentence.document_order, last.1.document_order
                )));
            }
        }

        let mut seen = HashSet::with_capacity(sentence.tokens.len());
        for &token in &sentence.tokens {
            if self.token(token).is_none() {
                return Err(Error::unknown_annotation(format!("{} is not a word token", token)));
            }
            if !seen.insert(token) || self.token_sentence.contains_key(&token) {
                return Err(Error::invalid_input(format!(
                    "{} already belongs to a sentence",
                    token
                )));
            }
        }
        Ok(())
    }

    /// Append a coreference chain.
    ///
    /// Every mention must reference a sentence in this store and lie within
    /// the document bounds.
    pub fn add_chain(&mut self, chain: CorefChain) -> Result<usize> {
        for mention in &chain.mentions {
            self.check_span(mention.span)?;
            if self.sentence(mention.sentence).is_none() {
                return Err(Error::DanglingMention {
                    cluster_id: chain.id,
                    sentence: mention.sentence_order,
                });
            }
        }
        self.chains.push(chain);
        Ok(self.chains.len() - 1)
    }

    // -------------------------------------------------------------------------
    // Generic queries
    // -------------------------------------------------------------------------

    /// Get an annotation by handle.
    #[must_use]
    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.get(id.index())
    }

    /// Total number of annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Check if the store holds no annotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Number of annotations of one type.
    #[must_use]
    pub fn count(&self, ty: AnnotationType) -> usize {
        self.by_type[ty.slot()].len()
    }

    /// All annotations of a type, in insertion order.
    pub fn by_type(
        &self,
        ty: AnnotationType,
    ) -> impl DoubleEndedIterator<Item = (AnnotationId, &Annotation)> + '_ {
        self.by_type[ty.slot()]
            .iter()
            .map(move |&id| (id, &self.annotations[id.index()]))
    }

    /// Annotations of `ty` whose span contains `target`.
    ///
    /// Ordered by ascending begin, then ascending length, then insertion.
    #[must_use]
    pub fn covering(&self, ty: AnnotationType, target: Span) -> Vec<(AnnotationId, &Annotation)> {
        let ids = self.spans[ty.slot()].query_containing(target);
        self.ordered(ids)
    }

    /// Annotations of `ty` whose span lies within `range`, in the same order
    /// as [`covering`](Self::covering).
    #[must_use]
    pub fn contained_in(&self, ty: AnnotationType, range: Span) -> Vec<(AnnotationId, &Annotation)> {
        let ids = self.spans[ty.slot()].query_contained_in(range);
        self.ordered(ids)
    }

    /// Annotations of `ty` sharing at least one character with `range`.
    #[must_use]
    pub fn overlapping(&self, ty: AnnotationType, range: Span) -> Vec<(AnnotationId, &Annotation)> {
        let ids = self.spans[ty.slot()].query_overlap(range);
        self.ordered(ids)
    }

    fn ordered(&self, mut ids: Vec<AnnotationId>) -> Vec<(AnnotationId, &Annotation)> {
        ids.sort_by_key(|&id| (self.annotations[id.index()].span().covering_key(), id));
        ids.into_iter()
            .map(|id| (id, &self.annotations[id.index()]))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Typed queries
    // -------------------------------------------------------------------------

    /// Sentences in document order.
    pub fn sentences(&self) -> impl DoubleEndedIterator<Item = (AnnotationId, &Sentence)> + '_ {
        self.by_type(AnnotationType::Sentence)
            .filter_map(|(id, a)| a.as_sentence().map(|s| (id, s)))
    }

    /// Word tokens in insertion order.
    pub fn tokens(&self) -> impl DoubleEndedIterator<Item = (AnnotationId, &WordToken)> + '_ {
        self.by_type(AnnotationType::WordToken)
            .filter_map(|(id, a)| a.as_token().map(|t| (id, t)))
    }

    /// Entities in insertion order.
    pub fn entities(&self) -> impl DoubleEndedIterator<Item = (AnnotationId, &Entity)> + '_ {
        self.by_type(AnnotationType::Entity)
            .filter_map(|(id, a)| a.as_entity().map(|e| (id, e)))
    }

    /// Coreference chains in commit order.
    #[must_use]
    pub fn chains(&self) -> &[CorefChain] {
        &self.chains
    }

    /// Get a sentence by handle.
    #[must_use]
    pub fn sentence(&self, id: AnnotationId) -> Option<&Sentence> {
        self.get(id).and_then(Annotation::as_sentence)
    }

    /// Get a word token by handle.
    #[must_use]
    pub fn token(&self, id: AnnotationId) -> Option<&WordToken> {
        self.get(id).and_then(Annotation::as_token)
    }

    /// Get an entity by handle.
    #[must_use]
    pub fn entity(&self, id: AnnotationId) -> Option<&Entity> {
        self.get(id).and_then(Annotation::as_entity)
    }

    /// Look up a sentence by its document order.
    #[must_use]
    pub fn sentence_by_order(&self, document_order: usize) -> Option<(AnnotationId, &Sentence)> {
        let id = *self.sentence_by_order.get(&document_order)?;
        self.sentence(id).map(|s| (id, s))
    }

    /// A sentence's tokens, in sentence order.
    pub fn tokens_of<'a>(
        &'a self,
        sentence: &'a Sentence,
    ) -> impl Iterator<Item = (AnnotationId, &'a WordToken)> + 'a {
        sentence
            .tokens
            .iter()
            .filter_map(move |&id| self.token(id).map(|t| (id, t)))
    }

    /// The sentence owning a word token.
    #[must_use]
    pub fn sentence_of(&self, token: AnnotationId) -> Option<(AnnotationId, &Sentence)> {
        let id = *self.token_sentence.get(&token)?;
        self.sentence(id).map(|s| (id, s))
    }

    /// Entities covering `span`, in covering order.
    #[must_use]
    pub fn covering_entities(&self, span: Span) -> Vec<(AnnotationId, &Entity)> {
        self.covering(AnnotationType::Entity, span)
            .into_iter()
            .filter_map(|(id, a)| a.as_entity().map(|e| (id, e)))
            .collect()
    }

    /// Word tokens containing `span`, in covering order.
    #[must_use]
    pub fn covering_tokens(&self, span: Span) -> Vec<(AnnotationId, &WordToken)> {
        self.covering(AnnotationType::WordToken, span)
            .into_iter()
            .filter_map(|(id, a)| a.as_token().map(|t| (id, t)))
            .collect()
    }

    /// Word tokens lying within `span`, in covering order.
    #[must_use]
    pub fn tokens_in(&self, span: Span) -> Vec<(AnnotationId, &WordToken)> {
        self.contained_in(AnnotationType::WordToken, span)
            .into_iter()
            .filter_map(|(id, a)| a.as_token().map(|t| (id, t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coref::Mention;

    const TEXT: &str = "Barack Obama went to Paris.";

    fn token(begin: usize, end: usize, pos: &str, order: usize) -> WordToken {
        WordToken {
            span: Span::new(begin, end),
            part_of_speech: pos.to_string(),
            sentence_order: order,
        }
    }

    #[test]
    fn test_add_rejects_bad_spans() {
        let mut store = AnnotationStore::new(TEXT);
        assert!(matches!(
            store.add(Entity::new(Span::new(5, 2), "PERSON")),
            Err(Error::InvalidSpan { begin: 5, end: 2, .. })
        ));
        assert!(matches!(
            store.add(Entity::new(Span::new(21, 28), "LOCATION")),
            Err(Error::InvalidSpan { text_len: 27, .. })
        ));
        assert!(store.is_empty());
        assert!(store.add(Entity::new(Span::new(27, 27), "X")).is_ok());
    }

    #[test]
    fn test_by_type_is_insertion_order() {
        let mut store = AnnotationStore::new(TEXT);
        let late = store.add(Entity::new(Span::new(21, 26), "LOCATION")).unwrap();
        let early = store.add(Entity::new(Span::new(0, 12), "PERSON")).unwrap();
        let ids: Vec<_> = store.entities().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![late, early]);
        assert_eq!(store.count(AnnotationType::Entity), 2);
        assert_eq!(store.count(AnnotationType::Sentence), 0);
    }

    #[test]
    fn test_covering_order_begin_then_length_then_insertion() {
        let mut store = AnnotationStore::new(TEXT);
        let wide = store.add(Entity::new(Span::new(0, 26), "A")).unwrap();
        let later_same = store.add(Entity::new(Span::new(7, 12), "B")).unwrap();
        let narrow = store.add(Entity::new(Span::new(0, 12), "C")).unwrap();
        let dup = store.add(Entity::new(Span::new(7, 12), "D")).unwrap();

        let order: Vec<_> = store
            .covering(AnnotationType::Entity, Span::new(7, 12))
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(order, vec![narrow, wide, later_same, dup]);
    }

    #[test]
    fn test_covering_respects_type() {
        let mut store = AnnotationStore::new(TEXT);
        let tok = store.add(token(7, 12, "NNP", 0)).unwrap();
        store.add(Entity::new(Span::new(0, 12), "PERSON")).unwrap();
        let hits = store.covering(AnnotationType::WordToken, Span::new(7, 12));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, tok);
        assert!(store.covering(AnnotationType::Sentence, Span::new(7, 12)).is_empty());
    }

    #[test]
    fn test_sentence_requires_known_tokens() {
        let mut store = AnnotationStore::new(TEXT);
        let entity = store.add(Entity::new(Span::new(0, 6), "PERSON")).unwrap();
        let err = store
            .add(Sentence {
                span: Span::new(0, 6),
                document_order: 0,
                tokens: vec![entity],
            })
            .unwrap_err();
        assert!(matches!(err, Error::UnknownAnnotation(_)));
    }

    #[test]
    fn test_sentence_order_and_token_ownership() {
        let mut store = AnnotationStore::new(TEXT);
        let t0 = store.add(token(0, 6, "NNP", 0)).unwrap();
        let t1 = store.add(token(7, 12, "NNP", 1)).unwrap();
        let s0 = store
            .add(Sentence {
                span: Span::new(0, 12),
                document_order: 0,
                tokens: vec![t0, t1],
            })
            .unwrap();

        assert_eq!(store.sentence_of(t1).map(|(id, _)| id), Some(s0));
        assert_eq!(store.sentence_by_order(0).map(|(id, _)| id), Some(s0));
        assert!(store.sentence_by_order(1).is_none());

        // Token already owned
        assert!(store
            .add(Sentence {
                span: Span::new(0, 6),
                document_order: 1,
                tokens: vec![t0],
            })
            .is_err());
        // Order must increase
        assert!(store
            .add(Sentence {
                span: Span::new(0, 0),
                document_order: 0,
                tokens: vec![],
            })
            .is_err());
    }

    #[test]
    fn test_covered_text_and_tokens_in() {
        let mut store = AnnotationStore::new(TEXT);
        store.add(token(0, 6, "NNP", 0)).unwrap();
        store.add(token(7, 12, "NNP", 1)).unwrap();
        store.add(token(13, 17, "VBD", 2)).unwrap();
        assert_eq!(store.covered_text(Span::new(13, 17)), "went");
        let inside: Vec<_> = store
            .tokens_in(Span::new(0, 12))
            .into_iter()
            .map(|(_, t)| store.covered_text(t.span))
            .collect();
        assert_eq!(inside, vec!["Barack", "Obama"]);
    }

    #[test]
    fn test_add_chain_rejects_dangling_sentence() {
        let mut store = AnnotationStore::new(TEXT);
        let tok = store.add(token(0, 6, "NNP", 0)).unwrap();
        let chain = CorefChain {
            id: 4,
            mentions: vec![Mention {
                span: Span::new(0, 6),
                sentence: tok,
                sentence_order: 0,
            }],
        };
        assert!(matches!(
            store.add_chain(chain),
            Err(Error::DanglingMention { cluster_id: 4, sentence: 0 })
        ));
        assert!(store.chains().is_empty());
    }
}
