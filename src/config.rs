// Configuration
// Loaded from wage-atlas.toml (missing file = defaults)

use crate::error::WageError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "wage-atlas.toml";
pub const DEFAULT_DATA_DIR: &str = "OFLC_Wages_2025-26_Updated";

/// Paths of the five input tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSources {
    pub geography: PathBuf,
    pub occupations: PathBuf,
    pub wages_primary: PathBuf,
    pub wages_secondary: PathBuf,
    /// County reference override (statefp, countyfp, name); the bundled
    /// Census table is used when unset
    pub counties: Option<PathBuf>,
}

impl DataSources {
    /// Standard OFLC file names inside one directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            geography: dir.join("Geography.csv"),
            occupations: dir.join("oes_soc_occs.csv"),
            wages_primary: dir.join("ALC_Export.csv"),
            wages_secondary: dir.join("EDC_Export.csv"),
            counties: None,
        }
    }

    /// (label, path) pairs in a fixed order; the county override only when set
    pub fn entries(&self) -> Vec<(&'static str, &Path)> {
        let mut entries = vec![
            ("geography", self.geography.as_path()),
            ("occupations", self.occupations.as_path()),
            ("wages_primary", self.wages_primary.as_path()),
            ("wages_secondary", self.wages_secondary.as_path()),
        ];
        if let Some(counties) = &self.counties {
            entries.push(("counties", counties.as_path()));
        }
        entries
    }
}

impl Default for DataSources {
    fn default() -> Self {
        Self::in_dir(Path::new(DEFAULT_DATA_DIR))
    }
}

/// Limits the presentation layer honours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// County detail across all job roles is refused above this many rows
    pub county_row_limit: usize,
    /// Rows shown in raw-data previews
    pub preview_rows: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            county_row_limit: 100_000,
            preview_rows: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: DataSources,
    pub view: ViewSettings,
}

impl Config {
    /// Load from a TOML file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WageError> {
        if self.view.county_row_limit == 0 {
            return Err(WageError::InvalidConfig {
                field: "view.county_row_limit".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(
            config.sources.wages_primary,
            PathBuf::from("OFLC_Wages_2025-26_Updated/ALC_Export.csv")
        );
        assert_eq!(config.sources.counties, None);
        assert_eq!(config.sources.entries().len(), 4);
        assert_eq!(config.view.county_row_limit, 100_000);
        assert_eq!(config.view.preview_rows, 100);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [sources]
            counties = "reference/counties_2020.csv"

            [view]
            preview_rows = 25
            "#,
        )
        .unwrap();

        assert_eq!(
            config.sources.counties,
            Some(PathBuf::from("reference/counties_2020.csv"))
        );
        assert_eq!(config.sources.entries().last().map(|(label, _)| *label), Some("counties"));
        assert_eq!(
            config.sources.geography,
            PathBuf::from("OFLC_Wages_2025-26_Updated/Geography.csv")
        );
        assert_eq!(config.view.preview_rows, 25);
        assert_eq!(config.view.county_row_limit, 100_000);
    }

    #[test]
    fn test_zero_county_limit_rejected() {
        let result = Config::from_toml_str("[view]\ncounty_row_limit = 0\n");
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("view.county_row_limit"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Path::new("definitely-not-here.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
