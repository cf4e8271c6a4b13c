use std::env;
use std::error;
use std::process::ExitCode;

use reqwest::Url;
use serde_json::Value;

/// Checks the health endpoint of a running summary runner, e.g.
/// `summary_runner_health http://localhost:25566/health`.
fn main() -> Result<ExitCode, Box<dyn error::Error>> {
    let args: Vec<String> = env::args().collect();
    let Some(url) = args.get(1) else {
        eprintln!("Missing URL argument");
        return Ok(ExitCode::FAILURE);
    };
    let require_loaded = args.iter().any(|arg| arg == "--require-loaded");

    let response = reqwest::blocking::get(Url::parse(url)?)?;
    if !response.status().is_success() {
        eprintln!("Request failed with status {}", response.status());
        return Ok(ExitCode::FAILURE);
    }

    let body: Value = response.json()?;
    if require_loaded && body["loaded"] != Value::Bool(true) {
        eprintln!("Model {} is not loaded yet", body["model"]);
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
