use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::bail;
use summary_runner::inference::models::model::{ModelBase, ModelDomain, ModelLoader, TextTask};
use summary_runner::inference::task::summarize::{
    SummarizeHandler, SummarizeOutput, SummarizeParams,
};

/// Keeps the first half of the input words, at most `max_length` of them.
#[derive(Clone, Debug)]
pub struct MockModel {
    pub calls: Arc<Mutex<Vec<SummarizeParams>>>,
    pub fail_on: Option<String>,
}

impl SummarizeHandler for MockModel {
    fn run_summarize(&mut self, params: &SummarizeParams) -> anyhow::Result<SummarizeOutput> {
        self.calls.lock().unwrap().push(params.clone());
        if let Some(marker) = &self.fail_on {
            if params.input.contains(marker.as_str()) {
                bail!("backend ran out of memory");
            }
        }

        let words: Vec<&str> = params.input.split_whitespace().collect();
        let keep = (words.len() / 2).min(params.max_length);
        Ok(SummarizeOutput {
            output: words[..keep].join(" "),
            inference_time: 0.01,
        })
    }
}

pub struct MockLoader {
    pub base: ModelBase,
    pub loads: Arc<AtomicUsize>,
    pub failures_left: Arc<AtomicUsize>,
    pub model: MockModel,
}

impl MockLoader {
    pub fn new() -> Self {
        Self {
            base: ModelBase {
                name: "mock-t5".into(),
                license: "MIT".into(),
                domain: ModelDomain::Text(vec![TextTask::Summarize]),
                repo_id: "mock/t5".into(),
                repo_revision: "main".into(),
            },
            loads: Arc::new(AtomicUsize::new(0)),
            failures_left: Arc::new(AtomicUsize::new(0)),
            model: MockModel {
                calls: Arc::new(Mutex::new(Vec::new())),
                fail_on: None,
            },
        }
    }

    /// The backend fails on every input containing `marker`.
    pub fn failing_on(marker: &str) -> Self {
        let mut loader = Self::new();
        loader.model.fail_on = Some(marker.to_string());
        loader
    }

    /// The first `failures` loads fail as if the hub was unreachable.
    pub fn unreachable_for(failures: usize) -> Self {
        let loader = Self::new();
        loader.failures_left.store(failures, Ordering::SeqCst);
        loader
    }
}

impl ModelLoader for MockLoader {
    type Model = MockModel;

    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn load(&self) -> anyhow::Result<MockModel> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            bail!("hub unreachable");
        }
        Ok(self.model.clone())
    }
}
