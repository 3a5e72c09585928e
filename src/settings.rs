use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dates::DateFormat;
use crate::error::{DatecheckError, Result};
use crate::matcher::{self, Strategy};
use crate::reconciler::RunContext;
use crate::schema::{Field, SchemaNormalizer};
use crate::writer::OutputOptions;

/// Overrides the settings file location.
pub const CONFIG_ENV: &str = "DATECHECK_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_reference_date_format")]
    pub reference_date_format: String,
    #[serde(default = "default_control_date_format")]
    pub control_date_format: String,
    #[serde(default = "default_unmatched_label")]
    pub unmatched_label: String,
    /// Matcher used when no flag is given; unset means each command's own default.
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default = "default_output_headers")]
    pub output_headers: [String; 3],
    /// Extra header spellings: source header → canonical field.
    #[serde(default)]
    pub header_aliases: BTreeMap<String, String>,
}

fn default_reference_date_format() -> String {
    "iso".to_string()
}

fn default_control_date_format() -> String {
    "dmy".to_string()
}

fn default_unmatched_label() -> String {
    "no matching date".to_string()
}

fn default_output_headers() -> [String; 3] {
    OutputOptions::default().headers
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reference_date_format: default_reference_date_format(),
            control_date_format: default_control_date_format(),
            unmatched_label: default_unmatched_label(),
            strategy: None,
            output_headers: default_output_headers(),
            header_aliases: BTreeMap::new(),
        }
    }
}

/// Per-invocation overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub strategy: Option<String>,
    pub reference_format: Option<String>,
    pub control_format: Option<String>,
}

impl Settings {
    pub fn strategy(&self) -> Result<Option<Strategy>> {
        self.strategy.as_deref().map(parse_strategy).transpose()
    }

    /// Build the explicit context for one run. The strategy comes from the
    /// flag, then settings, then `command_default`.
    pub fn run_context(&self, overrides: &RunOverrides, command_default: Strategy) -> Result<RunContext> {
        let strategy = match &overrides.strategy {
            Some(key) => parse_strategy(key)?,
            None => self.strategy()?.unwrap_or(command_default),
        };
        let reference = overrides
            .reference_format
            .as_deref()
            .unwrap_or(&self.reference_date_format);
        let control = overrides
            .control_format
            .as_deref()
            .unwrap_or(&self.control_date_format);
        let reference_format = DateFormat::from_setting(reference);
        let control_format = DateFormat::from_setting(control);
        reference_format.validate()?;
        control_format.validate()?;
        Ok(RunContext {
            strategy,
            reference_format,
            control_format,
            normalizer: SchemaNormalizer::with_aliases(&self.header_aliases)?,
        })
    }

    pub fn output_options(&self, date_format: &DateFormat) -> OutputOptions {
        OutputOptions {
            headers: self.output_headers.clone(),
            unmatched_label: self.unmatched_label.clone(),
            date_format: date_format.clone(),
        }
    }

    /// Update one scalar setting by key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "reference_date_format" => self.reference_date_format = value.to_string(),
            "control_date_format" => self.control_date_format = value.to_string(),
            "unmatched_label" => self.unmatched_label = value.to_string(),
            "strategy" => {
                self.strategy = Some(parse_strategy(value)?.key().to_string());
            }
            other => return Err(DatecheckError::Settings(format!("Unknown setting: {other}"))),
        }
        Ok(())
    }

    /// Register an extra header spelling for a canonical field.
    pub fn add_alias(&mut self, header: &str, field: &str) -> Result<()> {
        let field = Field::from_key(field)
            .ok_or_else(|| DatecheckError::Settings(format!("Unknown field: {field}")))?;
        self.header_aliases
            .insert(header.trim().to_string(), field.key().to_string());
        Ok(())
    }
}

fn parse_strategy(key: &str) -> Result<Strategy> {
    matcher::get_by_key(key)
        .ok_or_else(|| DatecheckError::Settings(format!("Unknown strategy: {key}")))
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("datecheck")
}

pub fn settings_path() -> PathBuf {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => config_dir().join("settings.json"),
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Missing or unreadable files fall back to defaults; a file that exists but
/// cannot be used is reported with a warning.
pub fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let parsed: std::result::Result<Settings, String> = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()));
    match parsed {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable settings file, using defaults");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| DatecheckError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
