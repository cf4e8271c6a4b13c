/// Decoding knobs shared by the seq2seq pipelines.
///
/// Sampling is never enabled: the seed only exists because `LogitsProcessor`
/// requires one, and with no temperature it always picks the argmax token.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub seed: u64,
    pub repeat_penalty: f32,
    pub repeat_context_size: usize,
    /// Inputs longer than this many tokens are truncated before encoding
    pub max_input_tokens: usize,
    /// Prepended to every input, T5 style models select their task with it
    pub task_prefix: String,
}

impl Default for GenerationConfig {
    #[tracing::instrument(level = "trace", skip())]
    fn default() -> Self {
        Self {
            seed: 299_792_458,
            repeat_penalty: 1.0,
            repeat_context_size: 64,
            max_input_tokens: 512,
            task_prefix: "summarize: ".into(),
        }
    }
}
