use super::click_map;
use crate::app::state::App;
use crossterm::event::KeyCode;
use grid_explorer::draw::ToolKey;

/// Arrow-key pan distance in canvas dots.
const PAN_STEP_DOTS: f64 = 16.0;
const ZOOM_STEP: f64 = 1.0;

pub fn handle_map_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Left => app.map.pan_by(-PAN_STEP_DOTS, 0.0),
        KeyCode::Right => app.map.pan_by(PAN_STEP_DOTS, 0.0),
        KeyCode::Up => app.map.pan_by(0.0, -PAN_STEP_DOTS),
        KeyCode::Down => app.map.pan_by(0.0, PAN_STEP_DOTS),
        KeyCode::Char('+' | '=') => app.map.zoom_by(ZOOM_STEP),
        KeyCode::Char('-' | '_') => app.map.zoom_by(-ZOOM_STEP),
        KeyCode::Enter => {
            let point = app.crosshair();
            let cell = app.layout.map_or((0, 0), |layout| {
                (
                    layout.map.x + layout.map.width / 2,
                    layout.map.y + layout.map.height / 2,
                )
            });
            click_map(app, point, cell);
        }
        KeyCode::Esc => {
            if !app.map.key(&mut app.store, ToolKey::Cancel) && app.store.popup().is_some() {
                app.store.set_popup(None);
            }
        }
        KeyCode::Delete | KeyCode::Backspace => {
            if app.map.key(&mut app.store, ToolKey::DeleteSelected) {
                app.status_message = "Feature deleted".to_string();
            }
        }
        KeyCode::Char('x') => {
            app.map.key(&mut app.store, ToolKey::DeleteVertex);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::app::input::test_support::{press, ready_app};
    use crossterm::event::KeyCode;
    use grid_explorer::domain::{DrawMode, LngLat, PopupInfo, PopupProperties};
    use grid_explorer::engine::MapEngine;

    fn camera(app: &crate::app::App) -> Option<(LngLat, f64)> {
        app.map.engine().map(|e| (e.camera().center, e.camera().zoom))
    }

    #[test]
    fn arrows_pan_and_plus_minus_zoom() {
        let mut app = ready_app();
        let start = camera(&app).map(|(center, _)| center);

        press(&mut app, KeyCode::Right);
        let moved = camera(&app).map(|(center, _)| center);
        assert!(moved.zip(start).is_some_and(|(m, s)| m.lng > s.lng));

        press(&mut app, KeyCode::Char('+'));
        assert_eq!(camera(&app).map(|(_, zoom)| zoom), Some(6.0));
        press(&mut app, KeyCode::Char('-'));
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(camera(&app).map(|(_, zoom)| zoom), Some(4.0));
    }

    #[test]
    fn enter_places_a_point_at_the_crosshair() {
        let mut app = ready_app();
        app.store.set_draw_mode(DrawMode::Point);
        app.update();

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.drawn_features_count(), 1);
    }

    #[test]
    fn escape_dismisses_the_popup_when_nothing_is_drawing() {
        let mut app = ready_app();
        app.store.set_popup(Some(PopupInfo {
            lng_lat: LngLat::new(10.5, 51.2),
            properties: PopupProperties::Substation(Default::default()),
        }));
        press(&mut app, KeyCode::Esc);
        assert!(app.store.popup().is_none());
    }

    #[test]
    fn double_enter_zooms_in_pan_mode() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(camera(&app).map(|(_, zoom)| zoom), Some(6.0));
    }
}
