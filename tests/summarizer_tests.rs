#[allow(dead_code)]
mod mocks;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use mocks::backend::MockLoader;
use summary_runner::error::{SummarizeError, SUMMARIZATION_HINT};
use summary_runner::inference::registry::ModelRegistry;
use summary_runner::summarizer::{
    SummarizationRequest, Summarizer, SummarizerSettings, ValidationWarning,
};

fn words(count: usize) -> String {
    (0..count)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn request(input: impl Into<String>, max_length: usize, min_length: usize) -> SummarizationRequest {
    SummarizationRequest {
        input: input.into(),
        max_length,
        min_length,
    }
}

// ─── Model handle ────────────────────────────────────────────────────────────

#[test]
fn test_load_model_twice_returns_cached_handle() {
    let registry = ModelRegistry::new();
    let loader = MockLoader::new();
    let loads = loader.loads.clone();
    let summarizer = Summarizer::new(loader, &registry, SummarizerSettings::default());

    let first = summarizer.load_model().unwrap();
    let second = summarizer.load_model().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(registry.load_count(), 1);
    assert!(summarizer.is_loaded());
}

#[test]
fn test_load_failure_is_reported_and_retryable() {
    let registry = ModelRegistry::new();
    let loader = MockLoader::unreachable_for(1);
    let loads = loader.loads.clone();
    let summarizer = Summarizer::new(loader, &registry, SummarizerSettings::default());

    let err = summarizer.load_model().unwrap_err();
    assert_eq!(err, SummarizeError::ModelLoad("hub unreachable".into()));
    assert!(!summarizer.is_loaded());

    assert!(summarizer.load_model().is_ok());
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert_eq!(registry.load_count(), 1);
}

#[test]
fn test_run_surfaces_load_failure() {
    let registry = ModelRegistry::new();
    let summarizer = Summarizer::new(
        MockLoader::unreachable_for(5),
        &registry,
        SummarizerSettings::default(),
    );

    let result = summarizer.run(&request(words(60), 150, 50));
    assert!(matches!(result, Err(SummarizeError::ModelLoad(_))));
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[test]
fn test_invalid_requests_never_load_the_model() {
    let registry = ModelRegistry::new();
    let loader = MockLoader::new();
    let loads = loader.loads.clone();
    let summarizer = Summarizer::new(loader, &registry, SummarizerSettings::default());

    for bad in [
        request("   ", 150, 50),
        request(words(60), 50, 50),
        request(words(60), 40, 80),
    ] {
        let result = summarizer.run(&bad);
        assert!(
            matches!(result, Err(SummarizeError::Validation(_))),
            "expected validation error for {bad:?}"
        );
    }
    assert_eq!(loads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_lengths_outside_the_ranges_are_rejected_before_loading() {
    let registry = ModelRegistry::new();
    let loader = MockLoader::new();
    let loads = loader.loads.clone();
    let calls = loader.model.calls.clone();
    let summarizer = Summarizer::new(loader, &registry, SummarizerSettings::default());

    for (max_length, min_length) in [(49, 30), (301, 150), (150, 29), (300, 151)] {
        let result = summarizer.run(&request(words(60), max_length, min_length));
        assert!(
            matches!(result, Err(SummarizeError::Validation(_))),
            "expected ({max_length}, {min_length}) to be rejected"
        );
    }
    assert_eq!(loads.load(Ordering::SeqCst), 0);

    for (max_length, min_length) in [(50, 30), (300, 150)] {
        assert!(summarizer.run(&request(words(60), max_length, min_length)).is_ok());
    }
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!((calls[1].max_length, calls[1].min_length), (300, 150));
}

#[test]
fn test_short_input_warns_but_proceeds() {
    let registry = ModelRegistry::new();
    let summarizer = Summarizer::new(MockLoader::new(), &registry, SummarizerSettings::default());

    let report = summarizer.run(&request(words(10), 150, 50)).unwrap();
    assert_eq!(
        report.warnings,
        vec![ValidationWarning::ShortInput {
            word_count: 10,
            threshold: 50
        }]
    );
    assert_eq!(report.result.statistics.original_word_count, 10);
}

#[test]
fn test_threshold_comes_from_settings() {
    let registry = ModelRegistry::new();
    let settings = SummarizerSettings {
        short_input_threshold: 5,
        ..SummarizerSettings::default()
    };
    let summarizer = Summarizer::new(MockLoader::new(), &registry, settings);

    assert!(summarizer.validate(&request(words(10), 150, 50)).unwrap().is_empty());
}

// ─── Summarization ───────────────────────────────────────────────────────────

#[test]
fn test_end_to_end_sixty_words() {
    let registry = ModelRegistry::new();
    let loader = MockLoader::new();
    let calls = loader.model.calls.clone();
    let summarizer = Summarizer::new(loader, &registry, SummarizerSettings::default());
    let req = request(words(60), 150, 50);

    assert!(summarizer.validate(&req).unwrap().is_empty());

    let handle = summarizer.load_model().unwrap();
    let result = summarizer.summarize(&handle, &req).unwrap();

    assert_eq!(result.statistics.original_word_count, 60);
    assert_eq!(result.statistics.summary_word_count, 30);
    assert!(result.statistics.summary_word_count <= result.statistics.original_word_count);
    assert_eq!(result.statistics.reduction_percentage, 50);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].max_length, 150);
    assert_eq!(calls[0].min_length, 50);
    assert_eq!(calls[0].input, req.input);
}

#[test]
fn test_backend_failure_keeps_cached_handle_usable() {
    let registry = ModelRegistry::new();
    let loader = MockLoader::failing_on("POISON");
    let loads = loader.loads.clone();
    let summarizer = Summarizer::new(loader, &registry, SummarizerSettings::default());

    let handle = summarizer.load_model().unwrap();
    let err = summarizer
        .summarize(&handle, &request(format!("{} POISON", words(60)), 150, 50))
        .unwrap_err();
    assert_eq!(
        err,
        SummarizeError::Summarization {
            message: "backend ran out of memory".into(),
            hint: SUMMARIZATION_HINT.into(),
        }
    );

    let report = summarizer.run(&request(words(60), 150, 50)).unwrap();
    assert_eq!(report.result.statistics.summary_word_count, 30);
    assert!(Arc::ptr_eq(&handle, &summarizer.load_model().unwrap()));
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_summary_is_bounded_by_max_length() {
    let registry = ModelRegistry::new();
    let summarizer = Summarizer::new(MockLoader::new(), &registry, SummarizerSettings::default());

    let report = summarizer.run(&request(words(400), 50, 30)).unwrap();
    assert_eq!(report.result.statistics.summary_word_count, 50);
    assert_eq!(report.result.statistics.reduction_percentage, 88);
}
