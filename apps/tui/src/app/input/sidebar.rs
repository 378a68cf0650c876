use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::app::state::{panel_len, App, Focus, StyleRow};
use crossterm::event::KeyCode;
use grid_explorer::domain::{DrawMode, LayerKey, SidebarTab};
use grid_explorer::store::LINE_WIDTH_STEP;

pub fn handle_sidebar_input(app: &mut App, key: KeyCode) {
    let len = panel_len(app.store.active_tab());
    match key {
        KeyCode::Up => app.set_panel_selection(wrap_decrement(app.panel_selection(), len)),
        KeyCode::Down => app.set_panel_selection(wrap_increment(app.panel_selection(), len)),
        KeyCode::Esc => app.focus = Focus::Map,
        _ => match app.store.active_tab() {
            SidebarTab::Layers => handle_layers_input(app, key),
            SidebarTab::Style => handle_style_input(app, key),
            SidebarTab::Draw => handle_draw_input(app, key),
        },
    }
}

fn handle_layers_input(app: &mut App, key: KeyCode) {
    if !matches!(key, KeyCode::Enter | KeyCode::Char(' ')) {
        return;
    }
    if let Some(layer) = LayerKey::from_index(app.layer_selection_index) {
        app.store.toggle_layer(layer);
        let state = if app.store.layer_visibility().get(layer) {
            "shown"
        } else {
            "hidden"
        };
        app.status_message = format!("{} {state}", layer.label());
    }
}

fn handle_style_input(app: &mut App, key: KeyCode) {
    let Some(row) = StyleRow::from_index(app.style_selection_index) else {
        return;
    };
    let activate = matches!(
        key,
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right
    );

    match row {
        StyleRow::ColorBy if activate => {
            let color_by = app.store.style().color_by.toggled();
            app.store.set_color_by(color_by);
            app.status_message = format!("Color by {}", color_by.label());
        }
        StyleRow::LineWidth => {
            let width = app.store.style().line_width;
            match key {
                KeyCode::Left => app.store.set_line_width(width - LINE_WIDTH_STEP),
                KeyCode::Right => app.store.set_line_width(width + LINE_WIDTH_STEP),
                _ => {}
            }
        }
        StyleRow::ShowLabels if activate => {
            let show = !app.store.style().show_labels;
            app.store.set_show_labels(show);
        }
        _ => {}
    }
}

fn handle_draw_input(app: &mut App, key: KeyCode) {
    if !matches!(key, KeyCode::Enter | KeyCode::Char(' ')) {
        return;
    }
    if let Some(mode) = DrawMode::from_index(app.draw_selection_index) {
        app.store.set_draw_mode(mode);
        app.status_message = format!("Tool: {}", mode.label());
    }
}

#[cfg(test)]
mod tests {
    use crate::app::input::test_support::{press, ready_app};
    use crossterm::event::KeyCode;
    use grid_explorer::domain::{ColorBy, DrawMode, LayerKey};

    #[test]
    fn layers_panel_toggles_the_selected_layer() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        let visibility = *app.store.layer_visibility();
        assert!(!visibility.get(LayerKey::Lines220kv));
        assert!(visibility.get(LayerKey::Lines380kv));
        assert_eq!(app.status_message, "220 kV Lines hidden");

        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.layer_selection_index, 4);
    }

    #[test]
    fn style_panel_adjusts_width_within_bounds() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.style().color_by, ColorBy::Capacity);

        press(&mut app, KeyCode::Down);
        for _ in 0..10 {
            press(&mut app, KeyCode::Right);
        }
        assert!((app.store.style().line_width - 5.0).abs() < f64::EPSILON);
        press(&mut app, KeyCode::Left);
        assert!((app.store.style().line_width - 4.5).abs() < f64::EPSILON);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.store.style().show_labels);
    }

    #[test]
    fn draw_panel_selects_the_tool() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.draw_mode(), DrawMode::LineString);
        assert_eq!(app.status_message, "Tool: Draw Line");
    }
}
