use anyhow::Result;
use candle_core::Device;
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tracing::info;

use crate::inference::model_config::GenerationConfig;
use crate::inference::models::model::{ModelBase, ModelLoader};
use crate::inference::task::summarize::{SummarizeHandler, SummarizeOutput, SummarizeParams};
use crate::inference::text_pipeline::Seq2SeqPipeline;

/// A T5 family model fine tuned for summarization, e.g. `Falconsai/text_summarization`.
#[derive(Clone)]
pub struct T5SummaryModel {
    pub base: ModelBase,
    generator_pipeline: Seq2SeqPipeline,
}

impl T5SummaryModel {
    #[tracing::instrument(level = "info", skip(api, generation))]
    pub fn new(
        api: &Api,
        base: &ModelBase,
        files: &T5Files,
        device: Device,
        generation: GenerationConfig,
    ) -> Result<Self> {
        let repo = api.repo(Repo::with_revision(
            base.repo_id.clone(),
            RepoType::Model,
            base.repo_revision.clone(),
        ));
        let generator_pipeline = Seq2SeqPipeline::with_safetensors(
            &repo,
            &files.config,
            &files.tokenizer,
            &files.weights,
            device,
            generation,
        )?;

        Ok(Self {
            base: base.clone(),
            generator_pipeline,
        })
    }
}

impl SummarizeHandler for T5SummaryModel {
    #[tracing::instrument(level = "info", skip(self, params), fields(model = %self.base.name))]
    fn run_summarize(&mut self, params: &SummarizeParams) -> Result<SummarizeOutput> {
        let (output, inference_time) = self.generator_pipeline.generate(
            &params.input,
            params.min_length,
            params.max_length,
        )?;

        Ok(SummarizeOutput {
            output,
            inference_time,
        })
    }
}

/// File names inside the model repository.
#[derive(Debug, Clone)]
pub struct T5Files {
    pub config: String,
    pub tokenizer: String,
    pub weights: String,
}

impl Default for T5Files {
    fn default() -> Self {
        Self {
            config: "config.json".into(),
            tokenizer: "tokenizer.json".into(),
            weights: "model.safetensors".into(),
        }
    }
}

pub struct T5Loader {
    pub base: ModelBase,
    pub files: T5Files,
    pub generation: GenerationConfig,
    pub use_gpu: bool,
}

impl ModelLoader for T5Loader {
    type Model = T5SummaryModel;

    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn load(&self) -> Result<T5SummaryModel> {
        let device = if self.use_gpu {
            Device::cuda_if_available(0)?
        } else {
            Device::Cpu
        };
        info!(
            repo = %self.base.repo_id,
            revision = %self.base.repo_revision,
            cuda = device.is_cuda(),
            "Loading summarization model"
        );
        T5SummaryModel::new(
            &Api::new()?,
            &self.base,
            &self.files,
            device,
            self.generation.clone(),
        )
    }
}
