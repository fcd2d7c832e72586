//! Documents: an id plus the annotation store over its text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{AnnotationStore, AnnotationType, CorefChain, Entity, EntityKind, Result, Span};

/// A document and its annotations.
#[derive(Debug, Clone)]
pub struct Document {
    id: String,
    store: AnnotationStore,
}

impl Document {
    /// Create an unannotated document.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            store: AnnotationStore::new(text),
        }
    }

    /// Document identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Document text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.store.text()
    }

    /// The annotation store.
    #[must_use]
    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// The annotation store, for writing.
    pub fn store_mut(&mut self) -> &mut AnnotationStore {
        &mut self.store
    }

    /// Serializable snapshot of all annotations.
    #[must_use]
    pub fn export(&self) -> DocumentExport {
        let store = &self.store;
        let sentences = store
            .sentences()
            .map(|(_, s)| SentenceExport {
                document_order: s.document_order,
                span: s.span,
                tokens: store
                    .tokens_of(s)
                    .map(|(_, t)| TokenExport {
                        text: store.covered_text(t.span).to_string(),
                        span: t.span,
                        part_of_speech: t.part_of_speech.clone(),
                    })
                    .collect(),
            })
            .collect();
        let entities = store
            .entities()
            .map(|(_, e)| EntityExport {
                text: store.covered_text(e.span).to_string(),
                entity: e.clone(),
            })
            .collect();

        DocumentExport {
            id: self.id.clone(),
            text: store.text().to_string(),
            sentences,
            entities,
            chains: store.chains().to_vec(),
        }
    }

    /// Annotation counts.
    #[must_use]
    pub fn stats(&self) -> DocumentStats {
        let store = &self.store;
        let mut entities_by_kind = BTreeMap::new();
        for (_, e) in store.entities() {
            *entities_by_kind.entry(e.kind.as_str()).or_insert(0) += 1;
        }
        DocumentStats {
            chars: store.char_len(),
            sentences: store.count(AnnotationType::Sentence),
            tokens: store.count(AnnotationType::WordToken),
            entities: store.count(AnnotationType::Entity),
            entities_by_kind,
            chains: store.chains().len(),
            mentions: store.chains().iter().map(CorefChain::len).sum(),
            singletons: store.chains().iter().filter(|c| c.is_singleton()).count(),
        }
    }
}

/// Exported token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenExport {
    /// Surface text
    pub text: String,
    /// Character span
    pub span: Span,
    /// Part-of-speech tag
    pub part_of_speech: String,
}

/// Exported sentence with its tokens inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceExport {
    /// Position among sentences
    pub document_order: usize,
    /// Character span
    pub span: Span,
    /// Tokens in sentence order
    pub tokens: Vec<TokenExport>,
}

/// Exported entity with its surface text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityExport {
    /// Surface text
    pub text: String,
    /// The entity
    #[serde(flatten)]
    pub entity: Entity,
}

/// Serializable snapshot of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentExport {
    /// Document identifier
    pub id: String,
    /// Document text
    pub text: String,
    /// Sentences in document order
    pub sentences: Vec<SentenceExport>,
    /// Entities in insertion order
    pub entities: Vec<EntityExport>,
    /// Coreference chains in commit order
    pub chains: Vec<CorefChain>,
}

impl DocumentExport {
    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Annotation counts for a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DocumentStats {
    /// Text length in characters
    pub chars: usize,
    /// Sentence count
    pub sentences: usize,
    /// Word token count
    pub tokens: usize,
    /// Entity count
    pub entities: usize,
    /// Entity count per variant name
    pub entities_by_kind: BTreeMap<&'static str, usize>,
    /// Chain count
    pub chains: usize,
    /// Mention count over all chains
    pub mentions: usize,
    /// Chains with a single mention
    pub singletons: usize,
}

impl DocumentStats {
    /// Entities of one variant.
    #[must_use]
    pub fn entities_of(&self, kind: EntityKind) -> usize {
        self.entities_by_kind.get(kind.as_str()).copied().unwrap_or(0)
    }
}

impl fmt::Display for DocumentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "chars:     {}", self.chars)?;
        writeln!(f, "sentences: {}", self.sentences)?;
        writeln!(f, "tokens:    {}", self.tokens)?;
        write!(f, "entities:  {}", self.entities)?;
        if !self.entities_by_kind.is_empty() {
            let kinds: Vec<String> = self
                .entities_by_kind
                .iter()
                .map(|(k, n)| format!("{}={}", k, n))
                .collect();
            write!(f, " ({})", kinds.join(", "))?;
        }
        writeln!(f)?;
        write!(
            f,
            "chains:    {} ({} mentions, {} singletons)",
            self.chains, self.mentions, self.singletons
        )
    }
}
