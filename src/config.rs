use anyhow::Result;
use clap_serde_derive::ClapSerde;

use crate::inference::model_config::GenerationConfig;
use crate::inference::models::model::{ModelBase, ModelDomain, TextTask};
use crate::inference::models::t5::{T5Files, T5Loader};
use crate::summarizer::SummarizerSettings;

#[derive(ClapSerde, Debug)]
pub struct Config {
    /// The address the listener binds to
    #[default("0.0.0.0".to_string())]
    #[arg(short, long, env)]
    pub address: String,

    /// The port the listener binds to
    #[default(25566)]
    #[arg(short, long, env)]
    pub port: u16,

    /// OTLP endpoint that traces and metrics are exported to, empty disables the export
    #[default(String::new())]
    #[arg(long, env)]
    pub otlp_endpoint: String,

    /// Log to the console even when an OTLP endpoint is set
    #[default(false)]
    #[arg(long, env)]
    pub console: bool,

    /// Hub repository of the summarization model
    #[default("Falconsai/text_summarization".to_string())]
    #[arg(long, env)]
    pub model_repo: String,

    /// License of the configured model, reported as metadata only
    #[default("Apache-2.0".to_string())]
    #[arg(long, env)]
    pub model_license: String,

    /// Revision of the model repository
    #[default("main".to_string())]
    #[arg(long, env)]
    pub model_revision: String,

    /// Model configuration file inside the repository
    #[default("config.json".to_string())]
    #[arg(long, env)]
    pub model_config_file: String,

    /// Tokenizer file inside the repository
    #[default("tokenizer.json".to_string())]
    #[arg(long, env)]
    pub tokenizer_file: String,

    /// Safetensors weights file inside the repository
    #[default("model.safetensors".to_string())]
    #[arg(long, env)]
    pub weights_file: String,

    /// Prefix that selects the summarization task
    #[default("summarize: ".to_string())]
    #[arg(long, env)]
    pub task_prefix: String,

    /// Run the model on the first CUDA device when one is available
    #[default(false)]
    #[arg(long, env)]
    pub use_gpu: bool,

    /// Load the model at startup instead of on the first request
    #[default(false)]
    #[arg(long, env)]
    pub preload: bool,

    /// Inputs are truncated to this many tokens
    #[default(512)]
    #[arg(long, env)]
    pub max_input_tokens: usize,

    /// Inputs with fewer words than this produce a warning
    #[default(50)]
    #[arg(long, env)]
    pub short_input_threshold: usize,

    /// Summary length upper bound used when a request omits it
    #[default(150)]
    #[arg(long, env)]
    pub default_max_length: usize,

    /// Summary length lower bound used when a request omits it
    #[default(50)]
    #[arg(long, env)]
    pub default_min_length: usize,

    /// Smallest accepted summary length upper bound
    #[default(50)]
    #[arg(long, env)]
    pub max_length_lower: usize,

    /// Largest accepted summary length upper bound
    #[default(300)]
    #[arg(long, env)]
    pub max_length_upper: usize,

    /// Smallest accepted summary length lower bound
    #[default(30)]
    #[arg(long, env)]
    pub min_length_lower: usize,

    /// Largest accepted summary length lower bound
    #[default(150)]
    #[arg(long, env)]
    pub min_length_upper: usize,
}

impl Config {
    pub fn from_toml(path: &str) -> Result<<Self as ClapSerde>::Opt> {
        let str = std::fs::read_to_string(path)?;
        let config = toml::from_str(&str)?;
        Ok(config)
    }

    pub fn otlp_endpoint(&self) -> Option<&str> {
        Some(self.otlp_endpoint.as_str()).filter(|endpoint| !endpoint.is_empty())
    }

    pub fn model_base(&self) -> ModelBase {
        ModelBase {
            name: self.model_repo.clone(),
            license: self.model_license.clone(),
            domain: ModelDomain::Text(vec![TextTask::Summarize]),
            repo_id: self.model_repo.clone(),
            repo_revision: self.model_revision.clone(),
        }
    }

    pub fn t5_loader(&self) -> T5Loader {
        T5Loader {
            base: self.model_base(),
            files: T5Files {
                config: self.model_config_file.clone(),
                tokenizer: self.tokenizer_file.clone(),
                weights: self.weights_file.clone(),
            },
            generation: GenerationConfig {
                max_input_tokens: self.max_input_tokens,
                task_prefix: self.task_prefix.clone(),
                ..GenerationConfig::default()
            },
            use_gpu: self.use_gpu,
        }
    }

    pub fn summarizer_settings(&self) -> SummarizerSettings {
        SummarizerSettings {
            short_input_threshold: self.short_input_threshold,
            default_max_length: self.default_max_length,
            default_min_length: self.default_min_length,
            max_length_range: self.max_length_lower..=self.max_length_upper,
            min_length_range: self.min_length_lower..=self.min_length_upper,
        }
    }
}
