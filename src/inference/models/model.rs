use serde::{Deserialize, Serialize};

use crate::inference::task::summarize::SummarizeHandler;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelBase {
    /// The name of the model
    pub name: String,

    /// The license of the model
    pub license: String,

    /// The domain that the model is designed for including the tasks it can perform
    pub domain: ModelDomain,

    /// The id of the model repository on the hub
    pub repo_id: String,

    /// The revision of the model repository
    pub repo_revision: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ModelDomain {
    Text(Vec<TextTask>),
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TextTask {
    Summarize,
}

/// Builds a backend model, usually by downloading and mapping its weights.
///
/// Loading is slow and may hit the network, the result is meant to be cached in a
/// [`ModelRegistry`](crate::inference::registry::ModelRegistry).
pub trait ModelLoader {
    type Model: SummarizeHandler + Clone + Send + Sync;

    fn base(&self) -> &ModelBase;

    fn load(&self) -> anyhow::Result<Self::Model>;
}
