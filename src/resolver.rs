//! Covering-tag resolution: project entity coverage back onto tokens.
//!
//! A token's tag is the `entity_type` of the first entity covering it, in
//! the store's covering order (begin ↑, length ↑, insertion ↑), or
//! [`OUTSIDE`] when no entity covers it. For nested entities this picks the
//! leftmost, then the innermost.

use crate::bio::OUTSIDE;
use crate::{AnnotationId, AnnotationStore, Error, Result, Span};

/// Read-only resolver over one store.
#[derive(Debug, Clone, Copy)]
pub struct TagResolver<'a> {
    store: &'a AnnotationStore,
}

impl<'a> TagResolver<'a> {
    /// Create a resolver.
    #[must_use]
    pub fn new(store: &'a AnnotationStore) -> Self {
        Self { store }
    }

    /// Tag of a word token.
    ///
    /// Fails with [`Error::UnknownAnnotation`] if `token` is not a word token
    /// of this store.
    pub fn resolve(&self, token: AnnotationId) -> Result<&'a str> {
        let token = self
            .store
            .token(token)
            .ok_or_else(|| Error::unknown_annotation(format!("{} is not a word token", token)))?;
        Ok(self.resolve_span(token.span))
    }

    /// Tag of an arbitrary span.
    #[must_use]
    pub fn resolve_span(&self, span: Span) -> &'a str {
        self.store
            .covering_entities(span)
            .into_iter()
            .next()
            .map_or(OUTSIDE, |(_, e)| e.entity_type.as_str())
    }

    /// Tags of a sentence's tokens, in sentence order.
    pub fn sentence_tags(&self, sentence: AnnotationId) -> Result<Vec<&'a str>> {
        let store = self.store;
        let sentence = store
            .sentence(sentence)
            .ok_or_else(|| Error::unknown_annotation(format!("{} is not a sentence", sentence)))?;
        Ok(store
            .tokens_of(sentence)
            .map(|(_, t)| self.resolve_span(t.span))
            .collect())
    }
}
