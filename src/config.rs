//! Configuration management
//!
//! Manages the database location, export path and report settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Database settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// CSV export settings
    #[serde(default)]
    pub export: ExportConfig,
    /// Report and picker settings
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file, relative paths resolve against the working directory
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("system.db")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Target of the CSV export, overwritten on every export
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("facts.csv")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rows of the rating trend chart
    #[serde(default = "default_chart_height")]
    pub chart_height: usize,
    /// Window of the "recent facts" report, in calendar months
    #[serde(default = "default_recent_window_months")]
    pub recent_window_months: u32,
    /// Facts offered when deleting a single fact
    #[serde(default = "default_delete_candidates")]
    pub delete_candidates: usize,
    /// Employees shown by the top-N reports
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
}

fn default_chart_height() -> usize {
    10
}

fn default_recent_window_months() -> u32 {
    1
}

fn default_delete_candidates() -> usize {
    10
}

fn default_top_limit() -> usize {
    3
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            chart_height: default_chart_height(),
            recent_window_months: default_recent_window_months(),
            delete_candidates: default_delete_candidates(),
            top_limit: default_top_limit(),
        }
    }
}

impl Config {
    /// Load configuration from the default file, writing defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load configuration from a specific file, writing defaults if absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, database: Option<PathBuf>, csv: Option<PathBuf>) -> Self {
        if let Some(path) = database {
            self.storage.database_path = path;
        }
        if let Some(path) = csv {
            self.export.csv_path = path;
        }
        self
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "fact-ledger", "fact-ledger")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Show the resolved configuration
pub fn show_config(config: &Config) -> Result<()> {
    let path = config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "(unavailable)".to_string());

    println!("Config file:        {}", path);
    println!("Database:           {}", config.storage.database_path.display());
    println!("CSV export:         {}", config.export.csv_path.display());
    println!("Chart height:       {}", config.report.chart_height);
    println!("Recent window:      {} month(s)", config.report.recent_window_months);
    println!("Delete candidates:  {}", config.report.delete_candidates);
    println!("Top-N size:         {}", config.report.top_limit);

    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[report]\nchart_height = 6\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.report.chart_height, 6);
        assert_eq!(config.report.top_limit, 3);
        assert_eq!(config.storage.database_path, PathBuf::from("system.db"));
    }

    #[test]
    fn test_broken_file_names_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[report\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_overrides(Some(PathBuf::from("/tmp/x.db")), None);
        assert_eq!(config.storage.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.export.csv_path, PathBuf::from("facts.csv"));
    }
}
