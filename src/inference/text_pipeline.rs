use std::path::Path;

use anyhow::{bail, Error as E, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::t5::{Config, T5ForConditionalGeneration};
use hf_hub::api::sync::ApiRepo;
use tokenizers::{Tokenizer, TruncationParams};

use crate::inference::model_config::GenerationConfig;

// Adapted from
// https://github.com/huggingface/candle/blob/main/candle-examples/examples/t5/main.rs
pub struct Seq2SeqPipeline {
    pub model: T5ForConditionalGeneration,
    pub config: Config,
    pub device: Device,
    pub tokenizer: Tokenizer,
    pub generation: GenerationConfig,
}

impl Clone for Seq2SeqPipeline {
    fn clone(&self) -> Self {
        // Tensor storage is reference counted, the clone only owns a fresh kv cache
        let mut model = self.model.clone();
        model.clear_kv_cache();
        Self {
            model,
            config: self.config.clone(),
            device: self.device.clone(),
            tokenizer: self.tokenizer.clone(),
            generation: self.generation.clone(),
        }
    }
}

impl Seq2SeqPipeline {
    pub fn with_safetensors(
        repo: &ApiRepo,
        config_filename: &str,
        tokenizer_filename: &str,
        weights_filename: &str,
        device: Device,
        generation: GenerationConfig,
    ) -> Result<Self> {
        let config_file = repo.get(config_filename)?;
        let tokenizer_file = repo.get(tokenizer_filename)?;
        let weights_file = repo.get(weights_filename)?;

        let mut config: Config = serde_json::from_str(&std::fs::read_to_string(config_file)?)?;
        config.use_cache = true;

        let tokenizer = truncating(
            Tokenizer::from_file(tokenizer_file).map_err(E::msg)?,
            generation.max_input_tokens,
        )?;

        let vb = load_weights(&weights_file, &device)?;
        let model = T5ForConditionalGeneration::load(vb, &config)?;

        Ok(Self {
            model,
            config,
            device,
            tokenizer,
            generation,
        })
    }

    /// Greedily decodes a summary of `input`, returning the text and the time spent in seconds.
    ///
    /// Both lengths count the decoder start token, so at most `max_length - 1` tokens are
    /// generated and the end of sequence token is held back until `min_length - 1` exist.
    pub fn generate(
        &mut self,
        input: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<(String, f64)> {
        self.model.clear_kv_cache();
        let prompt = format!("{}{}", self.generation.task_prefix, input);
        let input_tokens = self
            .tokenizer
            .encode(prompt, true)
            .map_err(E::msg)?
            .get_ids()
            .to_vec();
        if input_tokens.is_empty() {
            bail!("Input is empty");
        }

        let start_gen = std::time::Instant::now();

        let input_tokens = Tensor::new(input_tokens.as_slice(), &self.device)?.unsqueeze(0)?;
        let encoder_output = self.model.encode(&input_tokens)?;

        let start_token = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let eos_token = self.config.eos_token_id as u32;

        let model = &mut self.model;
        let device = &self.device;
        let tokens = greedy_decode(
            start_token,
            eos_token,
            min_length,
            max_length,
            &self.generation,
            |tokens| {
                // The kv cache holds everything but the newest token
                let decoder_tokens = Tensor::new(&tokens[tokens.len() - 1..], device)?.unsqueeze(0)?;
                Ok(model
                    .decode(&decoder_tokens, &encoder_output)?
                    .squeeze(0)?
                    .to_dtype(DType::F32)?)
            },
        );
        self.model.clear_kv_cache();
        let tokens = tokens?;

        let output = match self.tokenizer.decode(&tokens[1..], true) {
            Ok(text) => text.trim().to_string(),
            Err(err) => bail!("Cannot decode tokens: {err}"),
        };

        Ok((output, start_gen.elapsed().as_secs_f64()))
    }
}

/// Reads the whole safetensors file into memory, the weights are small enough.
fn load_weights(weights_file: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let buffer = std::fs::read(weights_file)?;
    Ok(VarBuilder::from_buffered_safetensors(buffer, DType::F32, device)?)
}

fn truncating(mut tokenizer: Tokenizer, max_tokens: usize) -> Result<Tokenizer> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_tokens,
            ..Default::default()
        }))
        .map_err(E::msg)?;
    Ok(tokenizer)
}

/// Runs the decoder loop, `step` maps the tokens so far to the logits of the next one.
///
/// The returned tokens start with `start_token` and never include `eos_token`.
fn greedy_decode<F>(
    start_token: u32,
    eos_token: u32,
    min_length: usize,
    max_length: usize,
    generation: &GenerationConfig,
    mut step: F,
) -> Result<Vec<u32>>
where
    F: FnMut(&[u32]) -> Result<Tensor>,
{
    let mut logits_processor = LogitsProcessor::new(generation.seed, None, None);
    let mut tokens = vec![start_token];

    while tokens.len() < max_length {
        let logits = step(&tokens)?;
        let logits = if (generation.repeat_penalty - 1.).abs() < f32::EPSILON {
            logits
        } else {
            let start_at = tokens.len().saturating_sub(generation.repeat_context_size);
            candle_transformers::utils::apply_repeat_penalty(
                &logits,
                generation.repeat_penalty,
                &tokens[start_at..],
            )?
        };
        let logits = if tokens.len() < min_length {
            suppress_token(&logits, eos_token)?
        } else {
            logits
        };

        let next_token = logits_processor.sample(&logits)?;
        if next_token == eos_token {
            break;
        }
        tokens.push(next_token);
    }
    Ok(tokens)
}

fn suppress_token(logits: &Tensor, token: u32) -> Result<Tensor> {
    let mut values: Vec<f32> = logits.to_vec1()?;
    match values.get_mut(token as usize) {
        Some(value) => *value = f32::NEG_INFINITY,
        None => bail!("Token {token} is outside of the vocabulary"),
    }
    Ok(Tensor::new(values.as_slice(), logits.device())?)
}
