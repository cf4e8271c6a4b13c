//! Turns pasted text plus length bounds into one bounded backend call and reports
//! the summary with before/after word statistics.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::SummarizeError;
use crate::inference::models::model::ModelLoader;
use crate::inference::registry::ModelRegistry;
use crate::inference::task::summarize::{SummarizeHandler, SummarizeParams};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SummarizationRequest {
    pub input: String,
    /// Upper bound on the summary length in tokens
    pub max_length: usize,
    /// Lower bound on the summary length in tokens, below `max_length`
    pub min_length: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryStatistics {
    pub original_word_count: usize,
    pub summary_word_count: usize,
    /// Negative when the summary is longer than the original
    pub reduction_percentage: i64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SummarizationResult {
    pub summary: String,
    pub statistics: SummaryStatistics,
    pub inference_time: f64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ValidationWarning {
    ShortInput { word_count: usize, threshold: usize },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::ShortInput { threshold, .. } => write!(
                f,
                "For better results, please provide at least {threshold} words."
            ),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub result: SummarizationResult,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizerSettings {
    pub short_input_threshold: usize,
    pub default_max_length: usize,
    pub default_min_length: usize,
    /// Accepted values of `max_length`
    pub max_length_range: RangeInclusive<usize>,
    /// Accepted values of `min_length`
    pub min_length_range: RangeInclusive<usize>,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            short_input_threshold: 50,
            default_max_length: 150,
            default_min_length: 50,
            max_length_range: 50..=300,
            min_length_range: 30..=150,
        }
    }
}

pub struct Summarizer<'r, L: ModelLoader> {
    loader: L,
    registry: &'r ModelRegistry<L::Model>,
    settings: SummarizerSettings,
}

impl<'r, L: ModelLoader> Summarizer<'r, L> {
    pub fn new(
        loader: L,
        registry: &'r ModelRegistry<L::Model>,
        settings: SummarizerSettings,
    ) -> Self {
        Self {
            loader,
            registry,
            settings,
        }
    }

    pub fn settings(&self) -> &SummarizerSettings {
        &self.settings
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn is_loaded(&self) -> bool {
        self.registry.is_loaded()
    }

    /// Returns the cached model, loading it on first use.
    #[tracing::instrument(level = "info", skip(self), fields(model = %self.loader.base().name))]
    pub fn load_model(&self) -> Result<Arc<L::Model>, SummarizeError> {
        self.registry.get_or_load(|| {
            info!("Loading the summarization model");
            self.loader.load().map_err(|err| {
                error!(error = %err, "Failed to load the summarization model");
                SummarizeError::ModelLoad(err.to_string())
            })
        })
    }

    pub fn validate(
        &self,
        request: &SummarizationRequest,
    ) -> Result<Vec<ValidationWarning>, SummarizeError> {
        validate(request, &self.settings)
    }

    /// Runs one bounded backend call on a private copy of `handle`.
    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(max_length = request.max_length, min_length = request.min_length)
    )]
    pub fn summarize(
        &self,
        handle: &L::Model,
        request: &SummarizationRequest,
    ) -> Result<SummarizationResult, SummarizeError> {
        let mut model = handle.clone();
        let output = model
            .run_summarize(&SummarizeParams {
                input: request.input.clone(),
                max_length: request.max_length,
                min_length: request.min_length,
            })
            .map_err(|err| {
                error!(error = %err, "Summarization failed");
                SummarizeError::summarization(err)
            })?;

        let statistics = compute_statistics(&request.input, &output.output);
        Ok(SummarizationResult {
            summary: output.output,
            statistics,
            inference_time: output.inference_time,
        })
    }

    /// Validates, loads the model when needed and summarizes.
    pub fn run(&self, request: &SummarizationRequest) -> Result<SummaryReport, SummarizeError> {
        let warnings = self.validate(request)?;
        for warning in &warnings {
            warn!(%warning, "Proceeding with a weak request");
        }
        let handle = self.load_model()?;
        let result = self.summarize(&handle, request)?;
        info!(
            reduction = result.statistics.reduction_percentage,
            inference_time = result.inference_time,
            "Generated summary"
        );
        Ok(SummaryReport { result, warnings })
    }
}

/// Rejects empty input and zero, out of range or inverted length bounds.
///
/// Input shorter than `short_input_threshold` words is still accepted but yields a
/// [`ValidationWarning::ShortInput`].
pub fn validate(
    request: &SummarizationRequest,
    settings: &SummarizerSettings,
) -> Result<Vec<ValidationWarning>, SummarizeError> {
    if request.input.trim().is_empty() {
        return Err(SummarizeError::Validation(
            "Please enter some text to summarize.".into(),
        ));
    }
    if request.max_length == 0 || request.min_length == 0 {
        return Err(SummarizeError::Validation(
            "max_length and min_length must be positive".into(),
        ));
    }
    check_range("max_length", request.max_length, &settings.max_length_range)?;
    check_range("min_length", request.min_length, &settings.min_length_range)?;
    if request.min_length >= request.max_length {
        return Err(SummarizeError::Validation(format!(
            "min_length ({}) must be smaller than max_length ({})",
            request.min_length, request.max_length
        )));
    }

    let word_count = word_count(&request.input);
    if word_count < settings.short_input_threshold {
        return Ok(vec![ValidationWarning::ShortInput {
            word_count,
            threshold: settings.short_input_threshold,
        }]);
    }
    Ok(Vec::new())
}

fn check_range(
    name: &str,
    value: usize,
    range: &RangeInclusive<usize>,
) -> Result<(), SummarizeError> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(SummarizeError::Validation(format!(
        "{name} ({value}) must be between {} and {}",
        range.start(),
        range.end()
    )))
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Word counts of both texts and the rounded reduction between them.
///
/// Halves round to even. An empty original gives a reduction of zero.
pub fn compute_statistics(original_text: &str, summary_text: &str) -> SummaryStatistics {
    let original_word_count = word_count(original_text);
    let summary_word_count = word_count(summary_text);
    let reduction_percentage = if original_word_count == 0 {
        0
    } else {
        let ratio = summary_word_count as f64 / original_word_count as f64;
        ((1.0 - ratio) * 100.0).round_ties_even() as i64
    };

    SummaryStatistics {
        original_word_count,
        summary_word_count,
        reduction_percentage,
    }
}
