use crate::engine::{EngineOptions, DEFAULT_STYLE};
use crate::style::layers::DataPaths;
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "public/data";
pub const DEFAULT_LINES_FILE: &str = "transmission_lines.geojson";
pub const DEFAULT_SUBSTATIONS_FILE: &str = "substations.geojson";
pub const DEFAULT_LOG_FILE: &str = "grid_explorer.log";

/// Runtime settings resolved from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub lines_file: String,
    pub substations_file: String,
    pub basemap_style: String,
    pub log_file: PathBuf,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            lines_file: DEFAULT_LINES_FILE.to_string(),
            substations_file: DEFAULT_SUBSTATIONS_FILE.to_string(),
            basemap_style: DEFAULT_STYLE.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            debug: false,
        }
    }
}

impl AppConfig {
    /// Reads every setting through `lookup`, falling back to the defaults
    /// for anything unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            data_dir: var("GRID_DATA_DIR").map_or(defaults.data_dir, PathBuf::from),
            lines_file: var("GRID_LINES_FILE").unwrap_or(defaults.lines_file),
            substations_file: var("GRID_SUBSTATIONS_FILE").unwrap_or(defaults.substations_file),
            basemap_style: var("GRID_BASEMAP_STYLE").unwrap_or(defaults.basemap_style),
            log_file: var("GRID_LOG_FILE").map_or(defaults.log_file, PathBuf::from),
            debug: var("DEBUG").is_some_and(|value| value != "0"),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn data_paths(&self) -> DataPaths {
        DataPaths {
            lines: self.data_dir.join(&self.lines_file),
            substations: self.data_dir.join(&self.substations_file),
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            style: self.basemap_style.clone(),
            ..EngineOptions::default()
        }
    }
}

/// Initializes the application configuration
pub fn init_app_config() -> AppConfig {
    // Load environment variables from .env file
    dotenv().ok();
    AppConfig::from_env()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_point_at_the_bundled_data() {
        let config = config_from(&[]);
        assert_eq!(config, AppConfig::default());
        let paths = config.data_paths();
        assert_eq!(
            paths.lines,
            PathBuf::from("public/data/transmission_lines.geojson")
        );
        assert_eq!(paths.substations, PathBuf::from("public/data/substations.geojson"));
        assert_eq!(config.engine_options(), EngineOptions::default());
    }

    #[test]
    fn environment_overrides_each_setting() {
        let config = config_from(&[
            ("GRID_DATA_DIR", "/srv/grid"),
            ("GRID_LINES_FILE", "lines.json"),
            ("GRID_SUBSTATIONS_FILE", "subs.json"),
            ("GRID_BASEMAP_STYLE", "none"),
            ("GRID_LOG_FILE", "/tmp/grid.log"),
            ("DEBUG", "1"),
        ]);
        assert_eq!(config.data_paths().lines, PathBuf::from("/srv/grid/lines.json"));
        assert_eq!(config.data_paths().substations, PathBuf::from("/srv/grid/subs.json"));
        assert_eq!(config.engine_options().style, "none");
        assert_eq!(config.log_file, PathBuf::from("/tmp/grid.log"));
        assert!(config.debug);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("GRID_DATA_DIR", "  "), ("DEBUG", "0")]);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert!(!config.debug);
    }
}
