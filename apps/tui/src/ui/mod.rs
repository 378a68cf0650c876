// UI module for grid_explorer
// Renders the toolbar, sidebar, map and overlays from the app state

pub mod layout;
pub mod screens;
pub mod widgets;

use crate::app::App;
use ratatui::Frame;

pub fn ui(app: &mut App, f: &mut Frame<'_>) {
    let layout = app.set_layout(f.area());
    screens::main::render_main(app, f, &layout);
}
