//! Error types for anno-cas.

use thiserror::Error;

use crate::pipeline::StageKind;

/// Result type for anno-cas operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for anno-cas operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Span is inverted or runs past the end of the document text.
    #[error("Invalid span [{begin}, {end}) for text of {text_len} chars")]
    InvalidSpan {
        /// Start offset (inclusive)
        begin: usize,
        /// End offset (exclusive)
        end: usize,
        /// Document length in chars
        text_len: usize,
    },

    /// A coreference mention points at a sentence the store does not have.
    #[error("Dangling mention in cluster {cluster_id}: no sentence with document order {sentence}")]
    DanglingMention {
        /// Cluster the mention belongs to
        cluster_id: u32,
        /// Requested sentence document order
        sentence: usize,
    },

    /// An external engine failed while running a stage.
    #[error("{stage} stage failed: {message}")]
    Stage {
        /// Stage that failed
        stage: StageKind,
        /// Failure description
        message: String,
    },

    /// NER output is not aligned 1:1 with a sentence's tokens.
    #[error("Tag alignment: sentence {sentence} has {tokens} tokens but {tags} tags")]
    TagAlignment {
        /// Sentence document order
        sentence: usize,
        /// Number of tokens in the sentence
        tokens: usize,
        /// Number of tags supplied
        tags: usize,
    },

    /// Handle does not name an annotation of the expected kind in this store.
    #[error("Unknown annotation: {0}")]
    UnknownAnnotation(String),

    /// Model inference failed (reported by external engines).
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be parsed or written.
    #[error("Config error: {0}")]
    Config(String),

    /// Export serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid span error.
    #[must_use]
    pub fn invalid_span(begin: usize, end: usize, text_len: usize) -> Self {
        Self::InvalidSpan {
            begin,
            end,
            text_len,
        }
    }

    /// Create a stage failure.
    #[must_use]
    pub fn stage(stage: StageKind, msg: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: msg.into(),
        }
    }

    /// Create an unknown annotation error.
    #[must_use]
    pub fn unknown_annotation(msg: impl Into<String>) -> Self {
        Self::UnknownAnnotation(msg.into())
    }

    /// Create an inference error.
    #[must_use]
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a config error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error reports an external stage failure.
    #[must_use]
    pub fn is_stage_failure(&self) -> bool {
        matches!(self, Self::Stage { .. })
    }
}
