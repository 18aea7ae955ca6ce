use anyhow::{Result, anyhow};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub mod endpoints;
mod extract;
pub mod logging;
mod models;
mod payload;
mod probe;
pub mod report;
pub mod settings;
mod validate;

#[cfg(test)]
mod test_util;

pub use endpoints::{Endpoint, read_endpoints};
pub use extract::extract_translation;
pub use models::{EndpointResult, SampleResult};
pub use probe::{ProbeOptions, Prober, user_agent};
pub use validate::is_translation_valid;

pub const EXIT_OK: u8 = 0;
pub const EXIT_UNAVAILABLE: u8 = 1;
pub const EXIT_INPUT_ERROR: u8 = 2;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub csv_path: Option<String>,
    pub texts: Vec<String>,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    pub timeout: Option<f64>,
    pub json_output: Option<String>,
    pub summary_path: Option<String>,
    pub allow_partial: bool,
    pub settings_path: Option<String>,
}

/// Effective options after layering the CLI over the settings files.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub csv_path: String,
    pub probe: ProbeOptions,
    pub allow_partial: bool,
}

/// Check every listed endpoint and report the results.
///
/// Errors are input errors (settings or endpoint list); endpoint failures are
/// reported through the returned exit code instead.
pub async fn run(config: Config) -> Result<u8> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;
    let plan = resolve_plan(&config, settings)?;

    let endpoints = read_endpoints(Path::new(&plan.csv_path))?;
    info!(
        "checking {} endpoints from {} with {} samples",
        endpoints.len(),
        plan.csv_path,
        plan.probe.texts.len()
    );

    let prober = Prober::new()?;
    let results = check_endpoints(&prober, &endpoints, &plan.probe).await;

    println!("{}", report::format_results(&results));

    if let Some(path) = config.summary_path.as_deref() {
        if let Err(err) = report::write_summary(&results, Path::new(path)) {
            warn!("step summary not written: {:#}", err);
            eprintln!("[warning] Failed to write step summary: {:#}", err);
        }
    }
    if let Some(path) = config.json_output.as_deref() {
        if let Err(err) = report::write_json(&results, Path::new(path)) {
            warn!("JSON report not written: {:#}", err);
            eprintln!("[warning] Failed to write JSON output: {:#}", err);
        }
    }

    Ok(exit_code(&results, plan.allow_partial))
}

pub fn resolve_plan(config: &Config, settings: settings::Settings) -> Result<RunPlan> {
    let timeout = match config.timeout {
        Some(secs) => Duration::try_from_secs_f64(secs)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .ok_or_else(|| anyhow!("timeout must be a positive number of seconds, got {}", secs))?,
        None => settings.timeout,
    };
    let texts = if config.texts.is_empty() {
        settings.texts
    } else {
        config.texts.clone()
    };

    Ok(RunPlan {
        csv_path: non_blank(config.csv_path.as_deref()).unwrap_or(settings.csv_path),
        probe: ProbeOptions {
            texts,
            source_lang: non_blank(config.source_lang.as_deref()).unwrap_or(settings.source_lang),
            target_lang: non_blank(config.target_lang.as_deref()).unwrap_or(settings.target_lang),
            timeout,
        },
        allow_partial: config.allow_partial || settings.allow_partial,
    })
}

/// Probe endpoints one after another, in list order.
pub async fn check_endpoints(
    prober: &Prober,
    endpoints: &[Endpoint],
    options: &ProbeOptions,
) -> Vec<EndpointResult> {
    let mut results = Vec::with_capacity(endpoints.len());
    for endpoint in endpoints {
        results.push(
            prober
                .check_endpoint(&endpoint.name, &endpoint.base_url, options)
                .await,
        );
    }
    results
}

pub fn exit_code(results: &[EndpointResult], allow_partial: bool) -> u8 {
    if allow_partial || results.iter().all(|result| result.success) {
        EXIT_OK
    } else {
        EXIT_UNAVAILABLE
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
