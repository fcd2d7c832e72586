//! End-to-end tests: toy engines driven through the full pipeline.

use anno_cas::offset::CharIndex;
use anno_cas::{
    ClusterMap, CorefInput, EntityKind, MentionDescriptor, Pipeline, PipelineConfig, Result,
    SentenceView, Span, StageKind, TagResolver, TagScheme, TokenDescriptor,
};

// =============================================================================
// Toy engines
// =============================================================================

/// Splits on whitespace, peels off trailing periods, ends sentences at ".".
fn toy_tokenizer(text: &str) -> Result<Vec<Vec<TokenDescriptor>>> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '.' {
            i += 1;
        }
        if i > start {
            let word: String = chars[start..i].iter().collect();
            current.push(TokenDescriptor::new(start, i, pos_of(&word)));
        }
        if i < chars.len() && chars[i] == '.' {
            current.push(TokenDescriptor::new(i, i + 1, "."));
            sentences.push(std::mem::take(&mut current));
            i += 1;
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    Ok(sentences)
}

fn pos_of(word: &str) -> &'static str {
    match word {
        "went" | "smiled" => "VBD",
        "to" => "TO",
        "He" | "he" => "PRP",
        w if w.chars().next().is_some_and(char::is_uppercase) => "NNP",
        _ => "NN",
    }
}

fn gazetteer(word: &str) -> &'static str {
    match word {
        "Barack" | "Obama" => "PERSON",
        "Paris" => "LOCATION",
        "Google" => "ORGANIZATION",
        "Monday" => "DATE",
        _ => "O",
    }
}

fn toy_ner(sentences: &[SentenceView<'_>]) -> Result<Vec<Vec<String>>> {
    Ok(sentences
        .iter()
        .map(|s| s.words().into_iter().map(|w| gazetteer(w).to_string()).collect())
        .collect())
}

fn toy_ner_iob2(sentences: &[SentenceView<'_>]) -> Result<Vec<Vec<String>>> {
    Ok(sentences
        .iter()
        .map(|s| {
            let mut prev = "O";
            s.words()
                .into_iter()
                .map(|w| {
                    let tag = gazetteer(w);
                    let out = match (tag, tag == prev) {
                        ("O", _) => "O".to_string(),
                        (t, true) => format!("I-{}", t),
                        (t, false) => format!("B-{}", t),
                    };
                    prev = tag;
                    out
                })
                .collect()
        })
        .collect())
}

/// One cluster: every PERSON run plus every pronoun, reported last-first.
fn toy_coref(input: &CorefInput) -> Result<ClusterMap> {
    let mut mentions = Vec::new();
    for sentence in &input.sentences {
        let mut open: Option<(usize, usize)> = None;
        for token in &sentence.tokens {
            if token.ner_tag == "PERSON" {
                open = Some(open.map_or((token.begin, token.end), |(b, _)| (b, token.end)));
                continue;
            }
            if let Some((b, e)) = open.take() {
                mentions.push(MentionDescriptor::new(sentence.document_order, b, e));
            }
            if token.part_of_speech == "PRP" {
                mentions.push(MentionDescriptor::new(sentence.document_order, token.begin, token.end));
            }
        }
        if let Some((b, e)) = open {
            mentions.push(MentionDescriptor::new(sentence.document_order, b, e));
        }
    }
    mentions.reverse();

    let mut clusters = ClusterMap::new();
    if !mentions.is_empty() {
        clusters.insert(0, mentions);
    }
    Ok(clusters)
}

fn full_pipeline() -> Pipeline {
    Pipeline::new(toy_tokenizer).with_ner(toy_ner).with_coref(toy_coref)
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn barack_obama_went_to_paris() {
    let _ = env_logger::builder().is_test(true).try_init();
    let processed = full_pipeline().process("obama", "Barack Obama went to Paris.");
    assert!(processed.is_complete());

    let store = processed.document.store();
    let sentences: Vec<_> = store.sentences().collect();
    assert_eq!(sentences.len(), 1);
    let (_, sentence) = sentences[0];
    assert_eq!(sentence.span, Span::new(0, 27));
    assert_eq!(sentence.len(), 6);

    let entities: Vec<_> = store.entities().map(|(_, e)| (e.kind, e.span)).collect();
    assert_eq!(
        entities,
        vec![
            (EntityKind::Person, Span::new(0, 12)),
            (EntityKind::Location, Span::new(21, 26)),
        ]
    );

    let resolver = TagResolver::new(store);
    assert_eq!(resolver.resolve(sentence.tokens[1]).unwrap(), "PERSON");
    assert_eq!(resolver.resolve(sentence.tokens[2]).unwrap(), "O");
}

#[test]
fn coref_chain_spans_sentences_in_textual_order() {
    let processed = full_pipeline().process("obama-2", "Barack Obama went to Paris. He smiled.");
    assert!(processed.is_complete());
    assert_eq!(processed.report(StageKind::Coreference).and_then(|r| r.added()), Some(1));

    let store = processed.document.store();
    let chain = &store.chains()[0];
    let surfaces: Vec<_> = chain.mentions.iter().map(|m| m.text(store)).collect();
    assert_eq!(surfaces, vec!["Barack Obama", "He"]);

    let orders: Vec<_> = chain.mentions.iter().map(|m| m.sentence_order).collect();
    assert_eq!(orders, vec![0, 1]);
    let second = store.sentence_by_order(1).map(|(id, _)| id);
    assert_eq!(Some(chain.mentions[1].sentence), second);
    assert_eq!(chain.mentions[0].tokens(store).len(), 2);
}

#[test]
fn iob2_engine_matches_plain_engine() {
    let text = "Barack Obama met Google in Paris on Monday.";
    let plain = full_pipeline().process("plain", text);
    let iob2 = Pipeline::new(toy_tokenizer)
        .with_ner(toy_ner_iob2)
        .with_config(PipelineConfig::default().with_tag_scheme(TagScheme::Iob2))
        .process("iob2", text);

    let spans = |p: &anno_cas::Processed| -> Vec<(String, Span)> {
        p.document
            .store()
            .entities()
            .map(|(_, e)| (e.entity_type.clone(), e.span))
            .collect()
    };
    assert_eq!(spans(&plain), spans(&iob2));
    assert_eq!(spans(&plain).len(), 4);

    let stats = iob2.document.stats();
    assert_eq!(stats.entities_of(EntityKind::Organisation), 1);
    assert_eq!(stats.entities_of(EntityKind::Generic), 1);
}

#[test]
fn export_roundtrips_through_json() {
    let processed = full_pipeline().process("export", "Barack Obama went to Paris. He smiled.");
    let export = processed.document.export();
    assert_eq!(export.sentences.len(), 2);
    assert_eq!(export.chains.len(), 1);

    let json = export.to_json().unwrap();
    let back = anno_cas::DocumentExport::from_json(&json).unwrap();
    assert_eq!(back, export);
}

#[test]
fn multibyte_text_uses_char_offsets() {
    let processed = full_pipeline().process("utf8", "Zoë met Obama in Paris.");
    let store = processed.document.store();
    let paris: Vec<_> = store
        .entities()
        .filter(|(_, e)| e.kind == EntityKind::Location)
        .map(|(_, e)| e.span)
        .collect();
    assert_eq!(paris, vec![Span::new(17, 22)]);
    assert_eq!(store.covered_text(paris[0]), "Paris");
}

#[test]
fn byte_offset_tokenizer_feeds_char_spans() {
    // Reports byte offsets, as `str::char_indices` based tokenizers do
    let byte_tokenizer = |text: &str| -> Result<Vec<Vec<TokenDescriptor>>> {
        let index = CharIndex::new(text);
        let mut tokens = Vec::new();
        let mut start = None;
        for (b, c) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
            match (c.is_whitespace(), start) {
                (true, Some(s)) => {
                    tokens.push(TokenDescriptor::from_byte_span(&index, s, b, "NNP"));
                    start = None;
                }
                (false, None) => start = Some(b),
                _ => {}
            }
        }
        Ok(vec![tokens])
    };
    let tagger = |s: &[SentenceView<'_>]| -> Result<Vec<Vec<String>>> {
        Ok(s.iter()
            .map(|s| {
                s.tokens
                    .iter()
                    .map(|t| if t.text == "met" { "O" } else { "PERSON" }.to_string())
                    .collect()
            })
            .collect())
    };

    let processed = Pipeline::new(byte_tokenizer)
        .with_ner(tagger)
        .process("bytes", "Zoë met Łukasz");
    assert!(processed.first_error().is_none());
    let store = processed.document.store();
    let people: Vec<_> = store
        .entities()
        .map(|(_, e)| (store.covered_text(e.span), e.span))
        .collect();
    assert_eq!(
        people,
        vec![("Zoë", Span::new(0, 3)), ("Łukasz", Span::new(8, 14))]
    );
}

#[test]
fn empty_text_completes_with_nothing() {
    let processed = full_pipeline().process("empty", "");
    assert!(processed.is_complete());
    assert!(processed.document.store().is_empty());
    assert!(processed.document.store().chains().is_empty());
}
