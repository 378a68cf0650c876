mod app;
mod cli;
mod event;
mod terminal;
mod ui;

use app::App;
use clap::Parser;
use cli::CliArgs;
use color_eyre::Result;
use grid_explorer::config::{init_app_config, logging::init_logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();

    let config = init_app_config();
    if let Err(e) = init_logging(&config) {
        eprintln!(
            "Warning: could not open log file {}: {e}",
            config.log_file.display()
        );
    }
    info!(data_dir = %config.data_dir.display(), style = %config.basemap_style, "starting");

    // Check if we're running in a terminal
    if args.headless || !is_terminal() {
        return event::run_headless(&config, args.json);
    }

    let mut app = App::new(&config);

    // Setup terminal
    let mut terminal = terminal::setup()?;

    // Run the application
    let result = event::run(&mut terminal, &mut app);
    app.quit();

    // Restore terminal
    terminal::cleanup(true, true);

    result
}

fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
