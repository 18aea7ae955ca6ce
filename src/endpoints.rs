use anyhow::{Context, Result, anyhow};
use csv::StringRecord;
use std::fs;
use std::path::Path;

/// One translation service to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub base_url: String,
}

/// Read the endpoint list from a CSV file.
///
/// With a header row the `base_url` column is required and `name` is
/// optional; without one the first column is the base URL and the second the
/// display name. Rows whose base URL is blank or starts with `#` are skipped.
pub fn read_endpoints(path: &Path) -> Result<Vec<Endpoint>> {
    if !path.exists() {
        return Err(anyhow!("CSV file not found: {}", path.display()));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read CSV file: {}", path.display()))?;
    let endpoints = parse_endpoints(&content)?;
    if endpoints.is_empty() {
        return Err(anyhow!("No endpoints found in CSV file: {}", path.display()));
    }
    Ok(endpoints)
}

pub fn parse_endpoints(content: &str) -> Result<Vec<Endpoint>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader
        .read_record(&mut record)
        .with_context(|| "failed to read CSV record")?
    {
        if record.iter().any(|cell| !cell.trim().is_empty()) {
            rows.push(record.clone());
        }
    }

    let mut rows = rows.into_iter();
    let Some(first) = rows.next() else {
        return Ok(Vec::new());
    };

    let mut endpoints = Vec::new();
    if is_header(&first) {
        let columns = Columns::from_header(&first)?;
        endpoints.extend(rows.filter_map(|row| columns.endpoint(&row)));
    } else {
        endpoints.extend(
            std::iter::once(first)
                .chain(rows)
                .filter_map(|row| Columns::POSITIONAL.endpoint(&row)),
        );
    }
    Ok(endpoints)
}

fn is_header(row: &StringRecord) -> bool {
    let commented = row
        .get(0)
        .is_some_and(|cell| cell.trim_start().starts_with('#'));
    !commented && !row.iter().any(|cell| cell.contains("://"))
}

struct Columns {
    base_url: usize,
    name: Option<usize>,
}

impl Columns {
    const POSITIONAL: Columns = Columns {
        base_url: 0,
        name: Some(1),
    };

    fn from_header(header: &StringRecord) -> Result<Self> {
        let find = |wanted: &str| {
            header
                .iter()
                .position(|cell| cell.trim().eq_ignore_ascii_case(wanted))
        };
        let base_url = find("base_url").ok_or_else(|| {
            anyhow!("CSV must contain a 'base_url' column when a header row is present.")
        })?;
        Ok(Self {
            base_url,
            name: find("name"),
        })
    }

    fn endpoint(&self, row: &StringRecord) -> Option<Endpoint> {
        let base_url = row.get(self.base_url)?.trim();
        if base_url.is_empty() || base_url.starts_with('#') {
            return None;
        }
        let name = self
            .name
            .and_then(|index| row.get(index))
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .unwrap_or(base_url);
        Some(Endpoint {
            name: name.to_string(),
            base_url: base_url.to_string(),
        })
    }
}
