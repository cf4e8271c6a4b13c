pub mod model_config;
pub mod models;
pub mod registry;
pub mod task;
pub mod text_pipeline;
