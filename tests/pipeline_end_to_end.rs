//! Whole-pipeline runs, with and without collaborators

mod common;

use common::{algorithms_deck, ml_lecture, notes_document, pipeline, RecordingJudge, ScriptedModel};
use conceptmap::collaborator::{
    ModelRelationshipJudge, ModelTopicSuggester, StaticJudge, StaticSuggester,
    MAX_SUGGESTER_INPUT_CHARS,
};
use conceptmap::corpus::RawTextUnit;
use conceptmap::{
    AnalysisInput, AnalysisPipeline, ConceptMapConfig, ConceptMapError, Corpus, DocumentInput,
    DocumentSet, HashingEmbedder, SlideRecord, Tier, TopicKey, TopicSuggestion,
};
use std::io::Write;
use std::sync::Arc;

#[test]
fn documents_load_from_json() {
    let json = r#"{
        "documents": [
            {"id": "week-1", "slides": [
                {"title": "Learning Objectives", "body": "Explain binary search trees."},
                {"title": "Binary Search Trees", "body": "Binary search trees keep keys ordered."},
                {"title": "Summary", "body": "Binary search trees support fast lookup."}
            ]},
            {"id": "week-1-notes", "text": "Balanced binary search trees stay shallow.\n\nRotations restore balance."}
        ]
    }"#;
    let documents: DocumentSet = serde_json::from_str(json).unwrap();
    let bundle = pipeline().analyze(&AnalysisInput::new(documents)).unwrap();

    let bst = bundle.topic("Binary Search Trees").unwrap();
    assert_eq!(bst.tier, Tier::ExamCritical);
    assert_eq!(bundle.corpus().documents().len(), 2);
}

#[test]
fn malformed_units_fail_with_location() {
    let raw = vec![RawTextUnit {
        document: Some("deck".to_string()),
        position: Some(3),
        role: None,
        text: Some("Recursion".to_string()),
        position_fraction: Some(0.5),
    }];
    match Corpus::from_raw_units(raw) {
        Err(ConceptMapError::Validation {
            document,
            position,
            reason,
        }) => {
            assert_eq!(document, "deck");
            assert_eq!(position, 3);
            assert!(reason.contains("role"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn duplicate_document_ids_are_rejected() {
    let documents = DocumentSet::new(vec![algorithms_deck(), algorithms_deck()]);
    let result = pipeline().analyze(&AnalysisInput::new(documents));
    assert!(matches!(result, Err(ConceptMapError::Validation { .. })));
}

#[test]
fn config_file_changes_weights() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "scoring:\n  title: 20.0\ngraph:\n  min_edge_weight: 100.0\nretrieval:\n  default_k: 2"
    )
    .unwrap();
    let config = ConceptMapConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.scoring.title, 20.0);
    assert_eq!(config.scoring.objectives_title, 15.0);

    let p = AnalysisPipeline::new(config, Arc::new(HashingEmbedder::default())).unwrap();
    let bundle = p
        .analyze(&AnalysisInput::new(DocumentSet::new(vec![ml_lecture()])))
        .unwrap();
    assert_eq!(bundle.graph.edge_count(), 0);
    assert!(bundle.report.below_threshold > 0);
    assert_eq!(p.retriever(&bundle).default_k(), 2);
}

#[test]
fn invalid_config_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "graph:\n  similarity_floor: 1.5").unwrap();
    assert!(matches!(
        ConceptMapConfig::load(Some(file.path())),
        Err(ConceptMapError::InvalidConfig(_))
    ));
}

#[test]
fn separate_runs_share_nothing() {
    let p = pipeline();
    let input = AnalysisInput::new(DocumentSet::new(vec![ml_lecture(), notes_document()]));
    let first = p.analyze(&input).unwrap();
    let second = p.analyze(&input).unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.topics, second.topics);
    assert_eq!(first.graph, second.graph);
}

#[tokio::test]
async fn model_suggestions_enter_the_candidate_set() {
    let model = ScriptedModel::new().then_reply(
        r#"Here are the topics:
        [{"name": "Chain Rule", "importance": "exam_critical"},
         {"name": "Learning Rate", "importance": "core"}]"#,
    );
    let suggester = ModelTopicSuggester::new(model);
    let input = AnalysisInput::new(DocumentSet::new(vec![ml_lecture()]));

    let bundle = pipeline()
        .analyze_with_collaborators(&input, &suggester, &StaticJudge::available())
        .await
        .unwrap();

    let chain_rule = bundle.topic("chain rule").unwrap();
    assert_eq!(chain_rule.suggested_tier, Some(Tier::ExamCritical));
    assert!(bundle.topic("learning rate").is_some());
}

#[tokio::test]
async fn suggester_sees_truncated_corpus_text() {
    let long_body = "gradient descent ".repeat(1000);
    let documents = DocumentSet::new(vec![DocumentInput::slides(
        "long",
        vec![SlideRecord::new("Gradient Descent", long_body)],
    )]);
    let model = Arc::new(ScriptedModel::new().then_reply("[]"));
    let suggester = ModelTopicSuggester::new(model.clone());

    pipeline()
        .analyze_with_collaborators(
            &AnalysisInput::new(documents),
            &suggester,
            &StaticJudge::available(),
        )
        .await
        .unwrap();

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].chars().count() < MAX_SUGGESTER_INPUT_CHARS + 500);
}

#[tokio::test]
async fn judge_is_asked_about_co_occurring_topics() {
    let judge = RecordingJudge::new("Recursion", "Base Case");
    let input = AnalysisInput::new(DocumentSet::new(vec![algorithms_deck()]));

    let bundle = pipeline()
        .analyze_with_collaborators(&input, &StaticSuggester::available(Vec::new()), &judge)
        .await
        .unwrap();

    let calls = judge.calls();
    assert!(!calls.is_empty());
    let asked = calls.iter().find(|c| {
        let pair = [c.a.to_lowercase(), c.b.to_lowercase()];
        pair.contains(&"recursion".to_string()) && pair.contains(&"base case".to_string())
    });
    let asked = asked.expect("recursion/base case pair not judged");
    assert!(asked.context.to_lowercase().contains("base case"));

    let recursion = TopicKey::new("recursion");
    let base_case = TopicKey::new("base case");
    assert!(bundle.graph.reaches(&recursion, &base_case));
    assert!(bundle.graph.edge(&base_case, &recursion).is_none());
}

#[tokio::test]
async fn failing_collaborators_are_skipped() {
    let suggester = ModelTopicSuggester::new(ScriptedModel::new().then_fail("rate limited"));
    let judge = ModelRelationshipJudge::new(ScriptedModel::new());
    let input = AnalysisInput::new(DocumentSet::new(vec![algorithms_deck()]));

    let p = pipeline();
    let with = p
        .analyze_with_collaborators(&input, &suggester, &judge)
        .await
        .unwrap();
    let without = p.analyze(&input).unwrap();
    assert_eq!(with.topics, without.topics);
    assert_eq!(with.graph, without.graph);
}

#[tokio::test]
async fn caller_suggestions_and_collaborators_combine() {
    let input = AnalysisInput::new(DocumentSet::new(vec![algorithms_deck()]))
        .with_suggestions(vec![TopicSuggestion::new("Merge Sort", Tier::Core)]);
    let suggester =
        StaticSuggester::available(vec![TopicSuggestion::new("Merge Sort", Tier::ExamCritical)]);

    let bundle = pipeline()
        .analyze_with_collaborators(&input, &suggester, &StaticJudge::unavailable())
        .await
        .unwrap();
    assert_eq!(
        bundle.topic("merge sort").unwrap().suggested_tier,
        Some(Tier::ExamCritical)
    );
}

#[tokio::test]
async fn empty_input_skips_collaborators() {
    let model = Arc::new(ScriptedModel::new());
    let suggester = ModelTopicSuggester::new(model.clone());
    let bundle = pipeline()
        .analyze_with_collaborators(&AnalysisInput::default(), &suggester, &StaticJudge::available())
        .await
        .unwrap();
    assert!(bundle.topics.is_empty());
    assert!(model.prompts().is_empty());
}
