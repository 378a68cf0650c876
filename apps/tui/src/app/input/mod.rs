mod global;
mod help;
mod helpers;
mod map;
mod mouse;
mod sidebar;

use crate::app::state::{App, Focus};
use crossterm::event::{KeyEvent, KeyEventKind};
use grid_explorer::draw::PointerEvent;
use grid_explorer::engine::ScreenPoint;
use std::time::Instant;

pub use mouse::handle_mouse;

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    if help::handle_help_toggle(app, key.code) {
        return;
    }

    if global::handle_global_input(app, key.code) {
        return;
    }

    match app.focus {
        Focus::Sidebar => sidebar::handle_sidebar_input(app, key.code),
        Focus::Map => map::handle_map_input(app, key.code),
    }
}

/// Sends a click on `cell` to the map, upgraded to a double click when it
/// repeats the previous one.
fn click_map(app: &mut App, point: ScreenPoint, cell: (u16, u16)) {
    let event = if app.clicks.register(cell.0, cell.1, Instant::now()) {
        PointerEvent::DoubleClick(point)
    } else {
        PointerEvent::Click(point)
    };
    app.map.pointer(&mut app.store, event);
    app.hovering = app.map.is_hovering();
}
