use std::process::ExitCode;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "deeplx-availability-check",
    version,
    about = "Check availability of DeeplX translation endpoints listed in a CSV file"
)]
struct Cli {
    /// Path to CSV file containing DeeplX base URLs (default: deeplx_endpoints.csv)
    #[arg(long = "csv")]
    csv: Option<String>,

    /// HTTP request timeout in seconds (default: 5)
    #[arg(long = "timeout")]
    timeout: Option<f64>,

    /// Sample text to translate; repeat to test several phrases
    #[arg(long = "text")]
    texts: Vec<String>,

    /// Source language code (default: EN)
    #[arg(long = "source-lang")]
    source_lang: Option<String>,

    /// Target language code (default: ZH)
    #[arg(long = "target-lang")]
    target_lang: Option<String>,

    /// Write detailed JSON results to this path
    #[arg(long = "json-output")]
    json_output: Option<String>,

    /// Do not fail when some endpoints are unavailable
    #[arg(long = "allow-partial")]
    allow_partial: bool,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = deeplx_availability_check::logging::init(cli.verbose) {
        eprintln!("[warning] {:#}", err);
    }

    let config = deeplx_availability_check::Config {
        csv_path: cli.csv,
        texts: cli.texts,
        source_lang: cli.source_lang,
        target_lang: cli.target_lang,
        timeout: cli.timeout,
        json_output: cli.json_output,
        summary_path: get_env("GITHUB_STEP_SUMMARY"),
        allow_partial: cli.allow_partial,
        settings_path: cli.read_settings,
    };

    match deeplx_availability_check::run(config).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("[error] {:#}", err);
            ExitCode::from(deeplx_availability_check::EXIT_INPUT_ERROR)
        }
    }
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
