use clap::{CommandFactory, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "grid_explorer",
    version,
    about = "European high-voltage grid explorer"
)]
pub struct CliArgs {
    /// Print a grid summary and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Directory holding the GeoJSON datasets
    #[arg(long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<String>,

    /// Basemap style: builtin:world-high, builtin:world-low or none
    #[arg(long, value_name = "STYLE")]
    pub basemap: Option<String>,

    /// Override the log file path
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(dir) = &self.data_dir {
            std::env::set_var("GRID_DATA_DIR", dir);
        }
        if let Some(style) = &self.basemap {
            std::env::set_var("GRID_BASEMAP_STYLE", style);
        }
        if let Some(path) = &self.log_file {
            std::env::set_var("GRID_LOG_FILE", path);
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = CliArgs::parse_from([
            "grid_explorer",
            "--headless",
            "--json",
            "--data-dir",
            "fixtures",
            "--basemap",
            "none",
        ]);
        assert!(args.headless && args.json);
        assert_eq!(args.data_dir.as_deref(), Some("fixtures"));
        assert_eq!(args.basemap.as_deref(), Some("none"));
        assert!(args.log_file.is_none());
    }

    #[test]
    fn help_lists_the_data_dir_flag() {
        assert!(CliArgs::help_text().contains("--data-dir"));
    }
}
