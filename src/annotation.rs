//! Annotation kinds held by the store.
//!
//! ```text
//! Document ──owns──► Sentence { span, document_order, tokens: [A0, A1, ...] }
//!                         │ (non-owning, ordered handles)
//!                         ▼
//!                    WordToken { span, part_of_speech, sentence_order }
//!
//!          ──owns──► Entity { kind, span, entity_type }
//! ```
//!
//! Sentences hold handles ([`AnnotationId`]) to their tokens, never the
//! tokens themselves: the store is the single owner of every annotation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Span;

/// Handle of an annotation within one store (its insertion position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnotationId(pub(crate) u32);

impl AnnotationId {
    /// Insertion position of the annotation.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// The annotation types a store indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationType {
    /// A sentence span.
    Sentence,
    /// A word token with POS tag.
    WordToken,
    /// A named-entity span.
    Entity,
}

impl AnnotationType {
    /// All annotation types, in index order.
    pub const ALL: [AnnotationType; 3] = [Self::Sentence, Self::WordToken, Self::Entity];

    /// Position in [`AnnotationType::ALL`].
    #[must_use]
    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::Sentence => 0,
            Self::WordToken => 1,
            Self::Entity => 2,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sentence => "Sentence",
            Self::WordToken => "WordToken",
            Self::Entity => "Entity",
        }
    }
}

impl fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sentence: its span, position among sentences, and ordered tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Character span; `[0, 0)` for a sentence without tokens
    pub span: Span,
    /// 0-based position among sentences in document order
    pub document_order: usize,
    /// Handles of the sentence's word tokens, in `sentence_order`
    pub tokens: Vec<AnnotationId>,
}

impl Sentence {
    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the sentence has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A word token with its part-of-speech tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordToken {
    /// Character span
    pub span: Span,
    /// POS tag, opaque to the store (e.g. "NNP")
    pub part_of_speech: String,
    /// 0-based index within the owning sentence
    pub sentence_order: usize,
}

/// Closed set of entity variants.
///
/// Chosen from the entity tag by exact string match; every other tag maps to
/// [`EntityKind::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EntityKind {
    /// Any entity type without a dedicated variant
    #[default]
    Generic,
    /// "PERSON"
    Person,
    /// "LOCATION"
    Location,
    /// "ORGANIZATION"
    Organisation,
}

impl EntityKind {
    /// Map an entity tag to its variant. Total: unknown tags give `Generic`.
    ///
    /// ```rust
    /// use anno_cas::EntityKind;
    ///
    /// assert_eq!(EntityKind::from_tag("PERSON"), EntityKind::Person);
    /// assert_eq!(EntityKind::from_tag("ORGANIZATION"), EntityKind::Organisation);
    /// assert_eq!(EntityKind::from_tag("DATE"), EntityKind::Generic);
    /// // Exact match only
    /// assert_eq!(EntityKind::from_tag("person"), EntityKind::Generic);
    /// ```
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "PERSON" => Self::Person,
            "LOCATION" => Self::Location,
            "ORGANIZATION" => Self::Organisation,
            _ => Self::Generic,
        }
    }

    /// Variant name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "Generic",
            Self::Person => "Person",
            Self::Location => "Location",
            Self::Organisation => "Organisation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named-entity span produced by BIO decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Variant derived from `entity_type`
    pub kind: EntityKind,
    /// Character span
    pub span: Span,
    /// The tag the entity was decoded from (e.g. "PERSON", "DATE")
    pub entity_type: String,
}

impl Entity {
    /// Create an entity, choosing the variant from the tag.
    #[must_use]
    pub fn new(span: Span, entity_type: impl Into<String>) -> Self {
        let entity_type = entity_type.into();
        Self {
            kind: EntityKind::from_tag(&entity_type),
            span,
            entity_type,
        }
    }
}

/// Any annotation a store can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Annotation {
    /// Sentence
    Sentence(Sentence),
    /// Word token
    WordToken(WordToken),
    /// Named entity
    Entity(Entity),
}

impl Annotation {
    /// Span of the annotation.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Sentence(s) => s.span,
            Self::WordToken(t) => t.span,
            Self::Entity(e) => e.span,
        }
    }

    /// Type of the annotation.
    #[must_use]
    pub fn annotation_type(&self) -> AnnotationType {
        match self {
            Self::Sentence(_) => AnnotationType::Sentence,
            Self::WordToken(_) => AnnotationType::WordToken,
            Self::Entity(_) => AnnotationType::Entity,
        }
    }

    /// The sentence, if this is one.
    #[must_use]
    pub fn as_sentence(&self) -> Option<&Sentence> {
        match self {
            Self::Sentence(s) => Some(s),
            _ => None,
        }
    }

    /// The word token, if this is one.
    #[must_use]
    pub fn as_token(&self) -> Option<&WordToken> {
        match self {
            Self::WordToken(t) => Some(t),
            _ => None,
        }
    }

    /// The entity, if this is one.
    #[must_use]
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Sentence> for Annotation {
    fn from(s: Sentence) -> Self {
        Self::Sentence(s)
    }
}

impl From<WordToken> for Annotation {
    fn from(t: WordToken) -> Self {
        Self::WordToken(t)
    }
}

impl From<Entity> for Annotation {
    fn from(e: Entity) -> Self {
        Self::Entity(e)
    }
}
