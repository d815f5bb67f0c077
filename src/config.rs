//! Configuration file handling.
//!
//! This module provides loading and saving of nodeaudit configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/nodeaudit/config.toml`
//! - macOS: `~/Library/Application Support/nodeaudit/config.toml`
//! - Windows: `%APPDATA%\nodeaudit\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! default_format = "table"
//! fail_on = "high"
//!
//! [ignore]
//! advisories = [118]
//! cves = ["CVE-2021-12345"]
//! modules = ["@types/*"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::model::{Advisory, Severity};

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use nodeaudit::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Format: {}", config.default_format);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Exit with a non-zero code when an advisory at or above this
    /// severity is reported.
    ///
    /// Valid values: "critical", "high", "moderate", "low"
    /// Default: unset (never fail)
    pub fail_on: Option<Severity>,

    /// Ignore list configuration for suppressing accepted advisories.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Advisories to drop from reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// npm advisory ids.
    pub advisories: Vec<i64>,

    /// CVE identifiers. An advisory is ignored if any of its CVEs is listed.
    pub cves: Vec<String>,

    /// Module names. Supports glob patterns (e.g., "lodash*", "@types/*").
    pub modules: Vec<String>,
}

impl IgnoreConfig {
    pub fn is_empty(&self) -> bool {
        self.advisories.is_empty() && self.cves.is_empty() && self.modules.is_empty()
    }

    /// Check if an advisory should be ignored.
    pub fn should_ignore(&self, advisory: &Advisory) -> bool {
        if self.advisories.contains(&advisory.id) {
            return true;
        }

        if advisory
            .cves
            .iter()
            .any(|cve| self.cves.iter().any(|ignored| ignored == cve))
        {
            return true;
        }

        match advisory.module_name.as_deref() {
            Some(module) => self.modules.iter().any(|pattern| {
                if pattern.contains('*') {
                    glob_match(pattern, module)
                } else {
                    pattern == module
                }
            }),
            None => false,
        }
    }

    /// Removes ignored advisories, keeping the order of the rest.
    pub fn apply(&self, advisories: Vec<Advisory>) -> Vec<Advisory> {
        if self.is_empty() {
            return advisories;
        }

        advisories
            .into_iter()
            .filter(|advisory| {
                let ignored = self.should_ignore(advisory);
                if ignored {
                    debug!(id = advisory.id, "ignoring advisory");
                }
                !ignored
            })
            .collect()
    }
}

/// Simple glob matching (supports * as wildcard).
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    if !parts[0].is_empty() {
        if !remaining.starts_with(parts[0]) {
            return false;
        }
        remaining = &remaining[parts[0].len()..];
    }

    let last_part = parts[parts.len() - 1];
    if !last_part.is_empty() {
        if !remaining.ends_with(last_part) {
            return false;
        }
        remaining = &remaining[..remaining.len() - last_part.len()];
    }

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        if let Some(pos) = remaining.find(part) {
            remaining = &remaining[pos + part.len()..];
        } else {
            return false;
        }
    }

    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: "table".to_string(),
            fail_on: None,
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, falling back to defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        // Same thresholds as the --fail-on flag
        if let Some(level) = config.fail_on {
            if level < Severity::Low {
                anyhow::bail!(
                    "Invalid fail_on `{}` in {}: use critical, high, moderate or low",
                    level,
                    path.display()
                );
            }
        }

        Ok(config)
    }

    /// Saves the configuration to the default config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nodeaudit")
            .join("config.toml")
    }

    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
