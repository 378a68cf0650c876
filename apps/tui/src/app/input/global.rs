use crate::app::state::App;
use crossterm::event::KeyCode;
use grid_explorer::domain::SidebarTab;

/// Keys that mean the same thing whichever region has focus.
pub fn handle_global_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') => {
            app.quit();
            true
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.toggle_focus();
            true
        }
        KeyCode::Char(digit @ '1'..='3') => {
            let index = digit as usize - '1' as usize;
            if let Some(tab) = SidebarTab::from_index(index) {
                app.select_tab(tab);
            }
            true
        }
        _ => false,
    }
}
