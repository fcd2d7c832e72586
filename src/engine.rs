//! Interfaces to the external NLP engines.
//!
//! The pipeline never runs a model itself. It hands each engine a view of
//! the store and reconciles the answer:
//!
//! | Engine | Input | Output |
//! |--------|-------|--------|
//! | [`Tokenizer`] | document text | per sentence, `(begin, end, pos)` triples |
//! | [`NerTagger`] | [`SentenceView`]s | per sentence, one tag per token |
//! | [`CorefEngine`] | [`CorefInput`] | [`ClusterMap`] |
//!
//! Any closure with the matching signature is an engine:
//!
//! ```rust
//! use anno_cas::{NerTagger, SentenceView};
//!
//! let tagger = |sentences: &[SentenceView<'_>]| -> anno_cas::Result<Vec<Vec<String>>> {
//!     Ok(sentences.iter().map(|s| vec!["O".to_string(); s.tokens.len()]).collect())
//! };
//! assert_eq!(NerTagger::name(&tagger), "closure");
//! ```

use serde::{Deserialize, Serialize};

use crate::{AnnotationStore, ClusterMap, Document, Result, Span, TagResolver, TokenDescriptor};

// =============================================================================
// Engine traits
// =============================================================================

/// Tokenizer and part-of-speech tagger.
pub trait Tokenizer: Send + Sync {
    /// Split `text` into sentences of POS-tagged tokens. Offsets are
    /// character offsets into the full text.
    fn tokenize(&self, text: &str) -> Result<Vec<Vec<TokenDescriptor>>>;

    /// Engine name, for logs.
    fn name(&self) -> &str {
        "closure"
    }
}

/// Named-entity tagger.
pub trait NerTagger: Send + Sync {
    /// One tag sequence per sentence, aligned 1:1 with its tokens.
    fn tag(&self, sentences: &[SentenceView<'_>]) -> Result<Vec<Vec<String>>>;

    /// Engine name, for logs.
    fn name(&self) -> &str {
        "closure"
    }
}

/// Coreference resolver.
pub trait CorefEngine: Send + Sync {
    /// Mention clusters keyed by cluster id.
    fn resolve(&self, input: &CorefInput) -> Result<ClusterMap>;

    /// Engine name, for logs.
    fn name(&self) -> &str {
        "closure"
    }
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Result<Vec<Vec<TokenDescriptor>>> + Send + Sync,
{
    fn tokenize(&self, text: &str) -> Result<Vec<Vec<TokenDescriptor>>> {
        self(text)
    }
}

impl<F> NerTagger for F
where
    F: Fn(&[SentenceView<'_>]) -> Result<Vec<Vec<String>>> + Send + Sync,
{
    fn tag(&self, sentences: &[SentenceView<'_>]) -> Result<Vec<Vec<String>>> {
        self(sentences)
    }
}

impl<F> CorefEngine for F
where
    F: Fn(&CorefInput) -> Result<ClusterMap> + Send + Sync,
{
    fn resolve(&self, input: &CorefInput) -> Result<ClusterMap> {
        self(input)
    }
}

// =============================================================================
// NER input
// =============================================================================

/// A token as seen by the NER tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenView<'a> {
    /// Surface text
    pub text: &'a str,
    /// Character span in the document
    pub span: Span,
    /// Part-of-speech tag
    pub part_of_speech: &'a str,
}

/// A sentence as seen by the NER tagger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceView<'a> {
    /// Position among sentences
    pub document_order: usize,
    /// Sentence surface text
    pub text: &'a str,
    /// Tokens in sentence order
    pub tokens: Vec<TokenView<'a>>,
}

impl<'a> SentenceView<'a> {
    /// Views of every sentence in the store, in document order.
    #[must_use]
    pub fn collect(store: &'a AnnotationStore) -> Vec<Self> {
        store
            .sentences()
            .map(|(_, sentence)| SentenceView {
                document_order: sentence.document_order,
                text: store.covered_text(sentence.span),
                tokens: store
                    .tokens_of(sentence)
                    .map(|(_, t)| TokenView {
                        text: store.covered_text(t.span),
                        span: t.span,
                        part_of_speech: &t.part_of_speech,
                    })
                    .collect(),
            })
            .collect()
    }

    /// Token surfaces, in order.
    #[must_use]
    pub fn words(&self) -> Vec<&'a str> {
        self.tokens.iter().map(|t| t.text).collect()
    }
}

// =============================================================================
// Coreference input
// =============================================================================

/// Per-token features handed to the coreference engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFeature {
    /// Surface text
    pub text: String,
    /// Part-of-speech tag
    pub part_of_speech: String,
    /// Index within the sentence
    pub sentence_order: usize,
    /// Document order of the sentence
    pub sentence: usize,
    /// Start character offset
    pub begin: usize,
    /// End character offset
    pub end: usize,
    /// Covering entity type, or "O"
    pub ner_tag: String,
}

/// One sentence of coreference input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefSentence {
    /// Position among sentences
    pub document_order: usize,
    /// Character span
    pub span: Span,
    /// Tokens in sentence order
    pub tokens: Vec<TokenFeature>,
}

/// The document as seen by the coreference engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorefInput {
    /// Full document text
    pub text: String,
    /// Sentences in document order
    pub sentences: Vec<CorefSentence>,
}

impl CorefInput {
    /// Build the input from a processed document.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        Self::from_store(document.store())
    }

    /// Build the input from a store, resolving each token's NER tag.
    #[must_use]
    pub fn from_store(store: &AnnotationStore) -> Self {
        let resolver = TagResolver::new(store);
        let sentences = store
            .sentences()
            .map(|(_, sentence)| CorefSentence {
                document_order: sentence.document_order,
                span: sentence.span,
                tokens: store
                    .tokens_of(sentence)
                    .map(|(_, t)| TokenFeature {
                        text: store.covered_text(t.span).to_string(),
                        part_of_speech: t.part_of_speech.clone(),
                        sentence_order: t.sentence_order,
                        sentence: sentence.document_order,
                        begin: t.span.begin,
                        end: t.span.end,
                        ner_tag: resolver.resolve_span(t.span).to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            text: store.text().to_string(),
            sentences,
        }
    }

    /// Total token count.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }
}
