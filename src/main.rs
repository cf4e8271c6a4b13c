use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use clap_serde_derive::ClapSerde;
use lazy_static::lazy_static;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use summary_runner::config::Config;
use summary_runner::inference::models::t5::{T5Loader, T5SummaryModel};
use summary_runner::inference::registry::ModelRegistry;
use summary_runner::server::{router, AppState};
use summary_runner::summarizer::Summarizer;
use summary_runner::telemetry::init_telemetry;

#[cfg(unix)]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const DEFAULT_CONFIG_FILE: &str = "SummaryRunner.toml";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env, default_value = DEFAULT_CONFIG_FILE)]
    config_file: String,

    /// Configuration options
    #[command(flatten)]
    pub opt_config: <Config as ClapSerde>::Opt,
}

lazy_static! {
    static ref SUMMARY_MODEL: ModelRegistry<T5SummaryModel> = ModelRegistry::new();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = match Config::from_toml(&args.config_file) {
        Ok(conf) => Config::from(conf).merge(args.opt_config),
        Err(err) => {
            if args.config_file == DEFAULT_CONFIG_FILE {
                Config::default().merge(args.opt_config)
            } else {
                eprintln!(
                    "Failed to read configuration file {} with error: {}",
                    args.config_file, err
                );
                std::process::exit(1);
            }
        }
    };
    init_telemetry(config.otlp_endpoint(), config.console)?;

    let summarizer: Arc<Summarizer<'static, T5Loader>> = Arc::new(Summarizer::new(
        config.t5_loader(),
        &SUMMARY_MODEL,
        config.summarizer_settings(),
    ));
    if config.preload {
        let summarizer = summarizer.clone();
        // A failed preload is retried by the first request
        tokio::task::spawn_blocking(move || {
            if let Err(err) = summarizer.load_model() {
                warn!(error = %err, "Preloading the model failed");
            }
        });
    }

    let router = router(AppState { summarizer });

    let listener = TcpListener::bind(format!("{}:{}", config.address, config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    info!(
        "Supported features: avx: {}, neon: {}, simd128: {}, f16c: {}",
        candle_core::utils::with_avx(),
        candle_core::utils::with_neon(),
        candle_core::utils::with_simd128(),
        candle_core::utils::with_f16c()
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down..."),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
