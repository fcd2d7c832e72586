//! Staged annotation pipeline.
//!
//! ```text
//! text ─► Tokenize ─► Entities ─► Coreference ─► Processed { document, reports }
//!         (builder)   (decoder)   (chain adapter)
//! ```
//!
//! Each stage calls its engine, then reconciles the engine output into the
//! document's store. A stage either completes, fails, or is skipped, and
//! reports which. A failure never discards earlier stages' annotations.
//!
//! # Example
//!
//! ```rust
//! use anno_cas::{Pipeline, SentenceView, StageKind, TokenDescriptor};
//!
//! let tokenizer = |_: &str| -> anno_cas::Result<Vec<Vec<TokenDescriptor>>> {
//!     Ok(vec![vec![TokenDescriptor::new(0, 5, "NNP")]])
//! };
//! let tagger = |s: &[SentenceView<'_>]| -> anno_cas::Result<Vec<Vec<String>>> {
//!     Ok(s.iter().map(|s| vec!["LOCATION".to_string(); s.tokens.len()]).collect())
//! };
//!
//! let pipeline = Pipeline::new(tokenizer).with_ner(tagger);
//! let processed = pipeline.process("doc-1", "Paris");
//! assert!(!processed.is_complete()); // no coreference engine
//! assert_eq!(processed.report(StageKind::Entities).and_then(|r| r.added()), Some(1));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::{CorefEngine, CorefInput, NerTagger, SentenceView, Tokenizer};
use crate::{BioDecoder, CorefAdapter, Document, Error, PipelineConfig, Result, SentenceBuilder};

/// Pipeline stages, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    /// Sentences and word tokens
    Tokenize,
    /// Named entities
    Entities,
    /// Coreference chains
    Coreference,
}

impl StageKind {
    /// All stages, in run order.
    pub const ALL: [StageKind; 3] = [Self::Tokenize, Self::Entities, Self::Coreference];

    /// Stage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tokenize => "tokenize",
            Self::Entities => "entities",
            Self::Coreference => "coreference",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one stage.
#[derive(Debug)]
pub enum StageStatus {
    /// The stage committed `added` annotations (possibly zero).
    Completed {
        /// Annotations (or chains) committed
        added: usize,
    },
    /// The stage failed. For the entity stage, runs committed before the
    /// failure remain in the store.
    Failed(Error),
    /// No engine, or an earlier stage failed under `stop_on_failure`.
    Skipped,
}

/// One stage's report.
#[derive(Debug)]
pub struct StageReport {
    /// Which stage
    pub stage: StageKind,
    /// What happened
    pub status: StageStatus,
}

impl StageReport {
    /// Whether the stage completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.status, StageStatus::Completed { .. })
    }

    /// Whether the stage failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.status, StageStatus::Failed(_))
    }

    /// Annotations committed, if the stage completed.
    #[must_use]
    pub fn added(&self) -> Option<usize> {
        match self.status {
            StageStatus::Completed { added } => Some(added),
            _ => None,
        }
    }

    /// The failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match &self.status {
            StageStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            StageStatus::Completed { added } => write!(f, "{}: completed (+{})", self.stage, added),
            StageStatus::Failed(e) => write!(f, "{}: failed ({})", self.stage, e),
            StageStatus::Skipped => write!(f, "{}: skipped", self.stage),
        }
    }
}

/// A document plus the per-stage reports that produced it.
#[derive(Debug)]
pub struct Processed {
    /// The (possibly partially) annotated document
    pub document: Document,
    /// One report per stage, in run order
    pub reports: Vec<StageReport>,
}

impl Processed {
    /// Whether every stage completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.reports.iter().all(StageReport::is_completed)
    }

    /// Report for a stage.
    #[must_use]
    pub fn report(&self, stage: StageKind) -> Option<&StageReport> {
        self.reports.iter().find(|r| r.stage == stage)
    }

    /// The first failure, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<(StageKind, &Error)> {
        self.reports
            .iter()
            .find_map(|r| r.error().map(|e| (r.stage, e)))
    }
}

/// Runs the engines over documents.
///
/// Engines are supplied by the caller; the pipeline holds no global state
/// and can be shared across threads.
pub struct Pipeline {
    tokenizer: Box<dyn Tokenizer>,
    ner: Option<Box<dyn NerTagger>>,
    coref: Option<Box<dyn CorefEngine>>,
    config: PipelineConfig,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("tokenizer", &self.tokenizer.name())
            .field("ner", &self.ner.as_ref().map(|n| n.name()))
            .field("coref", &self.coref.as_ref().map(|c| c.name()))
            .field("config", &self.config)
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline with a tokenizer and no other engines.
    #[must_use]
    pub fn new(tokenizer: impl Tokenizer + 'static) -> Self {
        Self {
            tokenizer: Box::new(tokenizer),
            ner: None,
            coref: None,
            config: PipelineConfig::default(),
        }
    }

    /// Add a named-entity tagger.
    #[must_use]
    pub fn with_ner(mut self, ner: impl NerTagger + 'static) -> Self {
        self.ner = Some(Box::new(ner));
        self
    }

    /// Add a coreference engine.
    #[must_use]
    pub fn with_coref(mut self, coref: impl CorefEngine + 'static) -> Self {
        self.coref = Some(Box::new(coref));
        self
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Annotate one document.
    #[must_use]
    pub fn process(&self, id: impl Into<String>, text: impl Into<String>) -> Processed {
        let mut document = Document::new(id, text);
        let mut reports = Vec::with_capacity(StageKind::ALL.len());
        let mut halted = false;

        for stage in StageKind::ALL {
            let status = if halted {
                StageStatus::Skipped
            } else {
                match self.run_stage(stage, &mut document) {
                    None => StageStatus::Skipped,
                    Some(Ok(added)) => {
                        log::info!("[{}] {}: +{}", document.id(), stage, added);
                        StageStatus::Completed { added }
                    }
                    Some(Err(e)) => {
                        log::warn!("[{}] {} failed: {}", document.id(), stage, e);
                        halted = self.config.stop_on_failure;
                        StageStatus::Failed(e)
                    }
                }
            };
            reports.push(StageReport { stage, status });
        }

        Processed { document, reports }
    }

    /// Annotate independent documents, in parallel when enabled.
    ///
    /// Results are in input order.
    #[must_use]
    pub fn process_batch(&self, documents: &[(String, String)]) -> Vec<Processed> {
        #[cfg(feature = "parallel")]
        if self.config.parallel {
            use rayon::prelude::*;
            return documents
                .par_iter()
                .map(|(id, text)| self.process(id.as_str(), text.as_str()))
                .collect();
        }

        documents
            .iter()
            .map(|(id, text)| self.process(id.as_str(), text.as_str()))
            .collect()
    }

    /// Run one stage; `None` if it has no engine.
    fn run_stage(&self, stage: StageKind, document: &mut Document) -> Option<Result<usize>> {
        match stage {
            StageKind::Tokenize => Some(self.tokenize(document)),
            StageKind::Entities => self.ner.as_deref().map(|ner| self.entities(ner, document)),
            StageKind::Coreference => self
                .coref
                .as_deref()
                .map(|coref| self.coreference(coref, document)),
        }
    }

    fn tokenize(&self, document: &mut Document) -> Result<usize> {
        let sentences = self
            .tokenizer
            .tokenize(document.text())
            .map_err(|e| engine_error(StageKind::Tokenize, e))?;
        let summary = SentenceBuilder::new()
            .with_strict_token_order(self.config.strict_token_order)
            .build(document.store_mut(), &sentences)?;
        Ok(summary.total())
    }

    fn entities(&self, ner: &dyn NerTagger, document: &mut Document) -> Result<usize> {
        let tags = {
            let views = SentenceView::collect(document.store());
            ner.tag(&views)
                .map_err(|e| engine_error(StageKind::Entities, e))?
        };
        let added = BioDecoder::new(self.config.tag_scheme).decode_document(document.store_mut(), &tags)?;
        Ok(added.len())
    }

    fn coreference(&self, coref: &dyn CorefEngine, document: &mut Document) -> Result<usize> {
        let input = CorefInput::from_document(document);
        let clusters = coref
            .resolve(&input)
            .map_err(|e| engine_error(StageKind::Coreference, e))?;
        let committed = CorefAdapter::new().build_chains(document.store_mut(), &clusters)?;
        Ok(committed.len())
    }
}

/// Wrap an engine's own error as a failure of the running stage.
fn engine_error(stage: StageKind, e: Error) -> Error {
    match e {
        Error::Stage { stage: reported, .. } if reported == stage => e,
        other => Error::stage(stage, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenDescriptor;

    fn one_token(_: &str) -> Result<Vec<Vec<TokenDescriptor>>> {
        Ok(vec![vec![TokenDescriptor::new(0, 5, "NNP")]])
    }

    #[test]
    fn test_tokenize_only() {
        let processed = Pipeline::new(one_token).process("d", "Paris");
        assert_eq!(processed.reports.len(), 3);
        assert_eq!(processed.report(StageKind::Tokenize).and_then(StageReport::added), Some(2));
        assert!(matches!(
            processed.report(StageKind::Entities).map(|r| &r.status),
            Some(StageStatus::Skipped)
        ));
        assert!(!processed.is_complete());
    }

    #[test]
    fn test_engine_error_wrapped_as_stage() {
        let failing = |_: &str| -> Result<Vec<Vec<TokenDescriptor>>> { Err(Error::inference("model not loaded")) };
        let processed = Pipeline::new(failing).process("d", "Paris");
        let (stage, err) = processed.first_error().unwrap();
        assert_eq!(stage, StageKind::Tokenize);
        assert!(err.is_stage_failure());
        assert!(err.to_string().contains("model not loaded"));
        assert!(processed.document.store().is_empty());
    }

    #[test]
    fn test_foreign_stage_error_relabelled() {
        let ner = |_: &[SentenceView<'_>]| -> Result<Vec<Vec<String>>> {
            Err(Error::stage(StageKind::Tokenize, "upstream"))
        };
        let processed = Pipeline::new(one_token).with_ner(ner).process("d", "Paris");
        match processed.first_error() {
            Some((StageKind::Entities, Error::Stage { stage, message })) => {
                assert_eq!(*stage, StageKind::Entities);
                assert!(message.contains("upstream"));
            }
            other => panic!("unexpected: {:?}", other),
        }

        let same = |_: &[SentenceView<'_>]| -> Result<Vec<Vec<String>>> {
            Err(Error::stage(StageKind::Entities, "own"))
        };
        let processed = Pipeline::new(one_token).with_ner(same).process("d", "Paris");
        let err = processed.first_error().map(|(_, e)| e.to_string());
        assert_eq!(err.as_deref(), Some("entities stage failed: own"));
    }

    #[test]
    fn test_reconciliation_error_passes_through() {
        let bad = |_: &str| -> Result<Vec<Vec<TokenDescriptor>>> { Ok(vec![vec![TokenDescriptor::new(0, 50, "NN")]]) };
        let processed = Pipeline::new(bad).process("d", "Paris");
        assert!(matches!(
            processed.first_error(),
            Some((StageKind::Tokenize, Error::InvalidSpan { .. }))
        ));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(StageKind::Coreference.to_string(), "coreference");
        let report = StageReport {
            stage: StageKind::Entities,
            status: StageStatus::Completed { added: 3 },
        };
        assert_eq!(report.to_string(), "entities: completed (+3)");
    }
}
