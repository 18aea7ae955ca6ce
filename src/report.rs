use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tera::{Context as TeraContext, Tera};
use time::{OffsetDateTime, format_description};

use crate::models::EndpointResult;

const SUMMARY_TEMPLATE: &str = include_str!("templates/summary.md.tera");

/// Render the plain-text status table printed to stdout.
pub fn format_results(results: &[EndpointResult]) -> String {
    let name_width = results
        .iter()
        .map(|result| result.name.chars().count())
        .chain(std::iter::once("Name".len()))
        .max()
        .unwrap_or_default();
    let status_width = "Status".len();
    let time_width = "Latency (s)".len();

    let header = format!(
        "{:<name_width$}  {:<status_width$}  {:>time_width$}  Detail",
        "Name", "Status", "Latency (s)"
    );
    let rule = "-".repeat(header.chars().count());
    let mut lines = vec![header, rule];

    for result in results {
        let status = if result.success { "OK" } else { "FAIL" };
        let latency = format!("{:.3}", result.elapsed.as_secs_f64());
        lines.push(format!(
            "{:<name_width$}  {:<status_width$}  {:>time_width$}  {}",
            result.name, status, latency, result.detail
        ));
    }

    lines.join("\n")
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    name: String,
    status: &'static str,
    latency: String,
    samples: String,
    detail: String,
}

pub fn render_summary(results: &[EndpointResult], checked_at: &str) -> Result<String> {
    let available = results.iter().filter(|result| result.success).count();
    let rows = results
        .iter()
        .map(|result| SummaryRow {
            name: result.name.clone(),
            status: if result.success { "✅" } else { "❌" },
            latency: format!("{:.3}", result.elapsed.as_secs_f64()),
            samples: format!("{}/{}", result.samples_ok(), result.samples.len()),
            detail: result.detail.replace('\n', " "),
        })
        .collect::<Vec<_>>();

    let mut context = TeraContext::new();
    context.insert("checked_at", checked_at);
    context.insert("total", &results.len());
    context.insert("available", &available);
    context.insert("unavailable", &(results.len() - available));
    context.insert("rows", &rows);
    Tera::one_off(SUMMARY_TEMPLATE, &context, false)
        .with_context(|| "failed to render summary template")
}

/// Append the markdown summary to `path` (a CI step summary file).
pub fn write_summary(results: &[EndpointResult], path: &Path) -> Result<()> {
    let checked_at = OffsetDateTime::now_utc()
        .format(&format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());
    let summary = render_summary(results, &checked_at)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open summary file: {}", path.display()))?;
    file.write_all(summary.as_bytes())
        .with_context(|| format!("failed to write summary file: {}", path.display()))?;
    Ok(())
}

pub fn write_json(results: &[EndpointResult], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(results)
        .with_context(|| "failed to serialize results")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write JSON output: {}", path.display()))
}
