use color_eyre::Result;
use crossterm::event::{self, Event};
use grid_explorer::config::AppConfig;
use grid_explorer::summary::load_summary;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::app::{handle_key, handle_mouse, App};
use crate::ui;

/// Event poll timeout between frames.
const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Run the application in headless mode (no UI)
pub fn run_headless(config: &AppConfig, json: bool) -> Result<()> {
    let paths = config.data_paths();
    info!(
        lines = %paths.lines.display(),
        substations = %paths.substations.display(),
        "building headless summary"
    );
    let summary = load_summary(&paths)?;

    if json {
        let json = serde_json::to_string_pretty(&summary)?;
        println!("{json}");
    } else {
        println!("{summary}");
    }

    Ok(())
}

/// Run the main application event loop
pub fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.update();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if !matches!(event::poll(EVENT_POLL_TIMEOUT), Ok(true)) {
            continue;
        }

        match event::read() {
            Ok(Event::Key(key)) => handle_key(app, key),
            Ok(Event::Mouse(mouse)) => handle_mouse(app, mouse),
            Ok(Event::Resize(width, height)) => {
                debug!(width, height, "terminal resized");
                if terminal.draw(|f| ui::ui(app, f)).is_err() {
                    // Non-fatal redraw error
                }
            }
            Ok(Event::FocusGained | Event::FocusLost | Event::Paste(_)) => {}
            Err(e) => warn!("failed to read terminal event: {e}"),
        }
    }

    info!("event loop finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn headless_fails_on_missing_data() {
        let config = AppConfig {
            data_dir: "does-not-exist".into(),
            ..AppConfig::default()
        };
        assert!(run_headless(&config, false).is_err());
    }

    #[test]
    fn headless_prints_a_summary_for_valid_data() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let empty = r#"{"type":"FeatureCollection","features":[]}"#;
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        let paths = config.data_paths();
        fs::write(&paths.lines, empty)?;
        fs::write(&paths.substations, empty)?;

        run_headless(&config, true)?;
        Ok(())
    }
}
