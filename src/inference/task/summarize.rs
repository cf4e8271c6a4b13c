use anyhow::Error;
use serde::{Deserialize, Serialize};

/// Bounded call into a summarization backend.
///
/// Lengths are backend tokens and include the decoder start token, so a model
/// produces at most `max_length - 1` new tokens.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SummarizeParams {
    pub input: String,
    pub max_length: usize,
    pub min_length: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SummarizeOutput {
    pub output: String,
    pub inference_time: f64,
}

/// Implemented by every backend model able to summarize text.
///
/// Decoding must be deterministic and oversized input must be truncated by the
/// backend rather than rejected.
pub trait SummarizeHandler {
    fn run_summarize(&mut self, params: &SummarizeParams) -> Result<SummarizeOutput, Error>;
}
