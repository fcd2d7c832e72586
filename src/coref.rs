//! Coreference chains over the store's sentences.
//!
//! An external coreference engine reports clusters of mentions located by
//! `(sentence document order, begin, end)`. [`CorefAdapter`] turns each
//! cluster into a [`CorefChain`] whose mentions reference the store's
//! existing [`Sentence`](crate::Sentence) handles, ordered textually.
//!
//! # Terminology
//!
//! - **Mention**: a span referring to an entity ("Obama", "he")
//! - **Chain**: mentions believed to refer to the same entity
//! - **Singleton**: a chain with one mention
//!
//! # Example
//!
//! ```rust
//! use anno_cas::{AnnotationStore, ClusterMap, CorefAdapter, MentionDescriptor, SentenceBuilder, TokenDescriptor};
//!
//! let mut store = AnnotationStore::new("Obama spoke. He left.");
//! SentenceBuilder::new()
//!     .build(&mut store, &[
//!         vec![TokenDescriptor::new(0, 5, "NNP"), TokenDescriptor::new(6, 11, "VBD"), TokenDescriptor::new(11, 12, ".")],
//!         vec![TokenDescriptor::new(13, 15, "PRP"), TokenDescriptor::new(16, 20, "VBD"), TokenDescriptor::new(20, 21, ".")],
//!     ])
//!     .unwrap();
//!
//! let mut clusters = ClusterMap::new();
//! clusters.insert(1, vec![MentionDescriptor::new(1, 13, 15), MentionDescriptor::new(0, 0, 5)]);
//! CorefAdapter::new().build_chains(&mut store, &clusters).unwrap();
//!
//! let chain = &store.chains()[0];
//! let surfaces: Vec<_> = chain.mentions.iter().map(|m| store.covered_text(m.span)).collect();
//! assert_eq!(surfaces, vec!["Obama", "He"]);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{AnnotationId, AnnotationStore, Error, Result, Span, WordToken};

/// A mention as reported by a coreference engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MentionDescriptor {
    /// Document order of the sentence containing the mention
    pub sentence: usize,
    /// Start character offset (inclusive)
    pub begin: usize,
    /// End character offset (exclusive)
    pub end: usize,
}

impl MentionDescriptor {
    /// Create a mention descriptor.
    #[must_use]
    pub const fn new(sentence: usize, begin: usize, end: usize) -> Self {
        Self {
            sentence,
            begin,
            end,
        }
    }

    /// Span of the mention.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.begin, self.end)
    }
}

/// Engine output: cluster id → mentions, in any order.
pub type ClusterMap = BTreeMap<u32, Vec<MentionDescriptor>>;

/// A mention resolved against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mention {
    /// Character span
    pub span: Span,
    /// Handle of the containing sentence
    pub sentence: AnnotationId,
    /// Document order of the containing sentence
    pub sentence_order: usize,
}

impl Mention {
    /// Tokens of the mention's sentence lying within the mention span.
    #[must_use]
    pub fn tokens<'a>(&self, store: &'a AnnotationStore) -> Vec<(AnnotationId, &'a WordToken)> {
        let Some(sentence) = store.sentence(self.sentence) else {
            return Vec::new();
        };
        store
            .tokens_of(sentence)
            .filter(|(_, t)| self.span.covers(&t.span))
            .collect()
    }

    /// Surface text of the mention.
    #[must_use]
    pub fn text<'a>(&self, store: &'a AnnotationStore) -> &'a str {
        store.covered_text(self.span)
    }
}

/// A coreference chain: mentions in textual order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefChain {
    /// Cluster identifier from the engine
    pub id: u32,
    /// Mentions ordered by (sentence order, begin)
    pub mentions: Vec<Mention>,
}

impl CorefChain {
    /// Number of mentions in this chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    /// Check if chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Check if this is a singleton (single mention).
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.mentions.len() == 1
    }

    /// First mention in textual order.
    #[must_use]
    pub fn first(&self) -> Option<&Mention> {
        self.mentions.first()
    }

    /// Check if chain contains a mention with given span.
    #[must_use]
    pub fn contains_span(&self, span: Span) -> bool {
        self.mentions.iter().any(|m| m.span == span)
    }
}

impl fmt::Display for CorefChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spans: Vec<String> = self
            .mentions
            .iter()
            .map(|m| format!("s{}{}", m.sentence_order, m.span))
            .collect();
        write!(f, "Coref#{} = [{}]", self.id, spans.join(", "))
    }
}

/// Materializes engine clusters as chains in the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorefAdapter;

impl CorefAdapter {
    /// Create an adapter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolve every cluster and commit one chain per cluster key, in
    /// ascending key order.
    ///
    /// All clusters are resolved before anything is committed: a
    /// [`Error::DanglingMention`] or [`Error::InvalidSpan`] in any cluster
    /// leaves the store without new chains.
    pub fn build_chains(&self, store: &mut AnnotationStore, clusters: &ClusterMap) -> Result<Vec<usize>> {
        let mut chains = Vec::with_capacity(clusters.len());
        for (&id, mentions) in clusters {
            chains.push(self.resolve_cluster(store, id, mentions)?);
        }

        let mut committed = Vec::with_capacity(chains.len());
        for chain in chains {
            log::debug!("[coref] committing {}", chain);
            committed.push(store.add_chain(chain)?);
        }
        Ok(committed)
    }

    /// Resolve one cluster against the store without committing it.
    pub fn resolve_cluster(
        &self,
        store: &AnnotationStore,
        id: u32,
        mentions: &[MentionDescriptor],
    ) -> Result<CorefChain> {
        let mut ordered = mentions.to_vec();
        ordered.sort_by_key(|m| (m.sentence, m.begin));

        let mut resolved = Vec::with_capacity(ordered.len());
        for m in ordered {
            let (sentence_id, sentence) =
                store
                    .sentence_by_order(m.sentence)
                    .ok_or(Error::DanglingMention {
                        cluster_id: id,
                        sentence: m.sentence,
                    })?;
            let span = m.span();
            store.check_span(span)?;
            if !sentence.span.covers(&span) {
                log::warn!(
                    "[coref] cluster {}: mention {} lies outside sentence {} {}",
                    id,
                    span,
                    m.sentence,
                    sentence.span
                );
            }
            resolved.push(Mention {
                span,
                sentence: sentence_id,
                sentence_order: m.sentence,
            });
        }

        Ok(CorefChain {
            id,
            mentions: resolved,
        })
    }
}
