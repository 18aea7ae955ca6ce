use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../deeplx-check.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub csv_path: String,
    pub texts: Vec<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub timeout: Duration,
    pub allow_partial: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            csv_path: "deeplx_endpoints.csv".to_string(),
            texts: vec![
                "Hello".to_string(),
                "Good morning".to_string(),
                "Testing".to_string(),
            ],
            source_lang: "EN".to_string(),
            target_lang: "ZH".to_string(),
            timeout: Duration::from_secs(5),
            allow_partial: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    check: Option<CheckSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct CheckSettings {
    csv: Option<String>,
    texts: Option<Vec<String>>,
    source_lang: Option<String>,
    target_lang: Option<String>,
    timeout_secs: Option<f64>,
    allow_partial: Option<bool>,
}

/// Load settings from the built-in defaults and every settings file found.
///
/// Later files override earlier ones: `./deeplx-check.toml`,
/// `./deeplx-check.local.toml`, the same pair under
/// `$HOME/.deeplx-availability-check/` (as `settings*.toml`), then `extra_path`.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    let defaults: SettingsFile = toml::from_str(DEFAULT_SETTINGS_TOML)
        .with_context(|| "failed to parse built-in settings")?;
    settings.merge(defaults);

    let mut ordered_paths = vec![
        PathBuf::from("deeplx-check.toml"),
        PathBuf::from("deeplx-check.local.toml"),
    ];

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        let Some(check) = incoming.check else {
            return;
        };
        if let Some(csv) = check.csv {
            if !csv.trim().is_empty() {
                self.csv_path = csv;
            }
        }
        if let Some(texts) = check.texts {
            let texts: Vec<String> = texts
                .into_iter()
                .filter(|text| !text.trim().is_empty())
                .collect();
            if !texts.is_empty() {
                self.texts = texts;
            }
        }
        if let Some(lang) = check.source_lang {
            if !lang.trim().is_empty() {
                self.source_lang = lang;
            }
        }
        if let Some(lang) = check.target_lang {
            if !lang.trim().is_empty() {
                self.target_lang = lang;
            }
        }
        if let Some(secs) = check.timeout_secs {
            if let Ok(timeout) = Duration::try_from_secs_f64(secs)
                && !timeout.is_zero()
            {
                self.timeout = timeout;
            }
        }
        if let Some(allow_partial) = check.allow_partial {
            self.allow_partial = allow_partial;
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".deeplx-availability-check"))
        }
    })
}
