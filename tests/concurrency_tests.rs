//! Thread-safety tests.
//!
//! Documents are independent: one pipeline can be shared across threads,
//! and stores can be queried concurrently once built.

use anno_cas::{
    AnnotationStore, AnnotationType, Document, Pipeline, PipelineConfig, Result, SentenceView,
    Span, TagResolver, TokenDescriptor,
};
use std::sync::Arc;
use std::thread;

fn tokenizer(text: &str) -> Result<Vec<Vec<TokenDescriptor>>> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in text.chars().chain(std::iter::once(' ')).enumerate() {
        match (c.is_whitespace(), start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                tokens.push(TokenDescriptor::new(s, i, "NN"));
                start = None;
            }
            _ => {}
        }
    }
    Ok(vec![tokens])
}

fn capitalised_ner(sentences: &[SentenceView<'_>]) -> Result<Vec<Vec<String>>> {
    Ok(sentences
        .iter()
        .map(|s| {
            s.words()
                .into_iter()
                .map(|w| {
                    if w.chars().next().is_some_and(char::is_uppercase) {
                        "PERSON".to_string()
                    } else {
                        "O".to_string()
                    }
                })
                .collect()
        })
        .collect())
}

fn batch(n: usize) -> Vec<(String, String)> {
    (0..n)
        .map(|i| (format!("doc-{}", i), format!("Ada Lovelace met person {} in London", i)))
        .collect()
}

// =============================================================================
// Send + Sync
// =============================================================================

#[test]
fn core_types_are_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AnnotationStore>();
    assert_send_sync::<Document>();
    assert_send_sync::<Pipeline>();
    assert_send_sync::<PipelineConfig>();
}

// =============================================================================
// Concurrent use
// =============================================================================

#[test]
fn shared_pipeline_across_threads() {
    let pipeline = Arc::new(Pipeline::new(tokenizer).with_ner(capitalised_ner));

    let handles: Vec<_> = batch(8)
        .into_iter()
        .map(|(id, text)| {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || pipeline.process(id, text))
        })
        .collect();

    for handle in handles {
        let processed = handle.join().unwrap();
        assert_eq!(processed.document.store().count(AnnotationType::WordToken), 7);
        // "Ada Lovelace" is one run, "London" another
        assert_eq!(processed.document.store().entities().count(), 2);
    }
}

#[test]
fn batch_preserves_input_order() {
    let docs = batch(32);
    for parallel in [true, false] {
        let pipeline = Pipeline::new(tokenizer)
            .with_ner(capitalised_ner)
            .with_config(PipelineConfig::default().with_parallel(parallel));
        let results = pipeline.process_batch(&docs);
        assert_eq!(results.len(), docs.len());
        for (processed, (id, text)) in results.iter().zip(&docs) {
            assert_eq!(processed.document.id(), id);
            assert_eq!(processed.document.text(), text);
        }
    }
}

#[test]
fn concurrent_queries_on_built_store() {
    let processed = Pipeline::new(tokenizer)
        .with_ner(capitalised_ner)
        .process("shared", "Ada Lovelace met Charles Babbage in London");
    let store = Arc::new(processed.document.store().clone());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let resolver = TagResolver::new(&store);
                (
                    resolver.resolve_span(Span::new(4, 12)).to_string(),
                    resolver.resolve_span(Span::new(13, 16)).to_string(),
                )
            })
        })
        .collect();

    for handle in handles {
        let (lovelace, met) = handle.join().unwrap();
        assert_eq!(lovelace, "PERSON");
        assert_eq!(met, "O");
    }
}
