//! # anno-cas
//!
//! A span-indexed annotation store for NLP pipelines.
//!
//! Several independently produced annotation streams (tokenizer/POS output,
//! BIO-tagged named entities, coreference clusters) are reconciled into one
//! consistent store over the document text:
//!
//! - **Store**: append-only, type-indexed and span-indexed ([`AnnotationStore`])
//! - **Builder**: tokenizer output → sentences and word tokens ([`SentenceBuilder`])
//! - **Decoder**: per-token tags → entity spans ([`BioDecoder`])
//! - **Resolver**: entity coverage → per-token tags ([`TagResolver`])
//! - **Coreference**: mention clusters → chains over sentences ([`CorefAdapter`])
//! - **Pipeline**: runs caller-supplied engines stage by stage ([`Pipeline`])
//!
//! The NLP models themselves are external: see [`engine`].
//!
//! ## Quick Start
//!
//! ```rust
//! use anno_cas::prelude::*;
//!
//! let mut store = AnnotationStore::new("Barack Obama went to Paris.");
//! SentenceBuilder::new()
//!     .build(&mut store, &[vec![
//!         TokenDescriptor::new(0, 6, "NNP"),
//!         TokenDescriptor::new(7, 12, "NNP"),
//!         TokenDescriptor::new(13, 17, "VBD"),
//!         TokenDescriptor::new(18, 20, "TO"),
//!         TokenDescriptor::new(21, 26, "NNP"),
//!         TokenDescriptor::new(26, 27, "."),
//!     ]])
//!     .unwrap();
//! BioDecoder::default()
//!     .decode_document(&mut store, &[vec!["PERSON", "PERSON", "O", "O", "LOCATION", "O"]])
//!     .unwrap();
//!
//! let (_, sentence) = store.sentence_by_order(0).unwrap();
//! assert_eq!(sentence.span, Span::new(0, 27));
//!
//! let resolver = TagResolver::new(&store);
//! assert_eq!(resolver.resolve(sentence.tokens[1]).unwrap(), "PERSON"); // Obama
//! assert_eq!(resolver.resolve(sentence.tokens[2]).unwrap(), "O"); // went
//! ```
//!
//! ## Offsets
//!
//! All spans are half-open character offsets (`str::chars`), not bytes.
//! See [`offset`] for conversion.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Effect |
//! |---------|---------|--------|
//! | `parallel` | yes | [`Pipeline::process_batch`] on the rayon pool |

#![warn(missing_docs)]

mod annotation;
pub mod bio;
mod builder;
mod config;
mod coref;
mod document;
pub mod engine;
mod error;
mod index;
pub mod offset;
mod pipeline;
mod resolver;
mod span;
mod store;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use anno_cas::prelude::*;
    //!
    //! let store = AnnotationStore::new("Hello");
    //! assert_eq!(TagResolver::new(&store).resolve_span(Span::new(0, 5)), "O");
    //! ```
    pub use crate::bio::{BioDecoder, TagScheme};
    pub use crate::engine::{CorefEngine, CorefInput, NerTagger, SentenceView, Tokenizer};
    pub use crate::error::{Error, Result};
    pub use crate::{
        AnnotationId, AnnotationStore, AnnotationType, ClusterMap, CorefAdapter, CorefChain,
        Document, Entity, EntityKind, MentionDescriptor, Pipeline, PipelineConfig, Processed,
        SentenceBuilder, Span, StageKind, StageStatus, TagResolver, TokenDescriptor,
    };
}

// Re-exports
pub use annotation::{Annotation, AnnotationId, AnnotationType, Entity, EntityKind, Sentence, WordToken};
pub use bio::{BioDecoder, TagRun, TagScheme};
pub use builder::{BuildSummary, SentenceBuilder, TokenDescriptor};
pub use config::PipelineConfig;
pub use coref::{ClusterMap, CorefAdapter, CorefChain, Mention, MentionDescriptor};
pub use document::{Document, DocumentExport, DocumentStats, EntityExport, SentenceExport, TokenExport};
pub use engine::{
    CorefEngine, CorefInput, CorefSentence, NerTagger, SentenceView, TokenFeature, TokenView, Tokenizer,
};
pub use error::{Error, Result};
pub use index::SpanIndex;
pub use pipeline::{Pipeline, Processed, StageKind, StageReport, StageStatus};
pub use resolver::TagResolver;
pub use span::Span;
pub use store::AnnotationStore;
