use super::click_map;
use crate::app::state::{App, Focus};
use crate::ui::layout;
use crate::ui::widgets::popup::popup_height;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use grid_explorer::draw::PointerEvent;
use grid_explorer::engine::controls::nav_button_at;
use grid_explorer::engine::Gesture;

const WHEEL_ZOOM_STEP: f64 = 0.5;

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.show_help {
        return;
    }
    let Some(regions) = app.layout else {
        return;
    };
    let (column, row) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(tab) = layout::tab_at(regions.tabs, column, row) {
                app.select_tab(tab);
                return;
            }
            if popup_close_hit(app, column, row) {
                app.store.set_popup(None);
                return;
            }
            if let Some(button) = nav_button_at(regions.map, column, row) {
                app.map.zoom_by(button.zoom_delta());
                return;
            }
            if layout::contains(regions.map, column, row) {
                app.focus = Focus::Map;
                app.mouse_drag = Some((column, row));
                app.dragging = false;
            } else if layout::contains(regions.panel, column, row) {
                app.focus = Focus::Sidebar;
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            let (Some(start), Some(point)) = (app.mouse_drag, app.cell_to_point(column, row))
            else {
                return;
            };
            if !app.dragging {
                if start == (column, row) {
                    return;
                }
                if let Some(origin) = app.cell_to_point(start.0, start.1) {
                    app.map.pointer(&mut app.store, PointerEvent::DragStart(origin));
                }
                app.dragging = true;
                app.clicks.reset();
            }
            app.map.pointer(&mut app.store, PointerEvent::Drag(point));
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let Some(start) = app.mouse_drag.take() else {
                return;
            };
            if app.dragging {
                app.dragging = false;
                let end = app
                    .cell_to_point(column, row)
                    .or_else(|| app.cell_to_point(start.0, start.1));
                if let Some(end) = end {
                    app.map.pointer(&mut app.store, PointerEvent::DragEnd(end));
                }
            } else if let Some(point) = app.cell_to_point(start.0, start.1) {
                click_map(app, point, start);
            }
        }
        MouseEventKind::Down(MouseButton::Right) => {
            if let Some(point) = app.cell_to_point(column, row) {
                app.map.pointer(&mut app.store, PointerEvent::RightClick(point));
            }
        }
        MouseEventKind::Moved => {
            if let Some(point) = app.cell_to_point(column, row) {
                app.map.pointer(&mut app.store, PointerEvent::Move(point));
                app.hovering = app.map.is_hovering();
            }
        }
        MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
            if let Some(at) = app.cell_to_point(column, row) {
                let delta = if mouse.kind == MouseEventKind::ScrollUp {
                    WHEEL_ZOOM_STEP
                } else {
                    -WHEEL_ZOOM_STEP
                };
                app.map.gesture(Gesture::Wheel { at, delta });
            }
        }
        _ => {}
    }
}

fn popup_close_hit(app: &App, column: u16, row: u16) -> bool {
    let Some(info) = app.store.popup() else {
        return false;
    };
    app.popup_area(popup_height(info))
        .is_some_and(|area| layout::contains(layout::popup_close_rect(area), column, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::input::test_support::ready_app;
    use crossterm::event::KeyModifiers;
    use grid_explorer::domain::{DrawMode, SidebarTab};
    use grid_explorer::engine::MapEngine;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn zoom(app: &App) -> Option<f64> {
        app.map.engine().map(|e| e.camera().zoom)
    }

    #[test]
    fn clicking_a_tab_title_selects_it() {
        let mut app = ready_app();
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 12, 4));
        assert_eq!(app.store.active_tab(), SidebarTab::Style);
        assert_eq!(app.focus, Focus::Sidebar);
    }

    #[test]
    fn navigation_buttons_zoom() {
        let mut app = ready_app();
        let map = app.layout.map(|l| l.map).unwrap_or_default();
        let (plus, minus) = (map.right() - 5, map.right() - 2);

        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), plus, map.y));
        assert_eq!(zoom(&app), Some(6.0));
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), minus, map.y));
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), minus, map.y));
        assert_eq!(zoom(&app), Some(4.0));
    }

    #[test]
    fn drag_pans_and_release_without_motion_clicks() {
        let mut app = ready_app();
        app.store.set_draw_mode(DrawMode::Point);
        app.update();

        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 60, 20));
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 60, 20));
        assert_eq!(app.store.drawn_features_count(), 1);

        app.store.set_draw_mode(DrawMode::Pan);
        app.update();
        let before = app.map.engine().map(|e| e.camera().center.lng);
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 60, 20));
        handle_mouse(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 70, 20));
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 70, 20));
        let after = app.map.engine().map(|e| e.camera().center.lng);
        assert!(after.zip(before).is_some_and(|(a, b)| a < b));
        assert_eq!(app.store.drawn_features_count(), 1);
    }

    #[test]
    fn wheel_zooms_at_the_pointer() {
        let mut app = ready_app();
        handle_mouse(&mut app, mouse(MouseEventKind::ScrollUp, 60, 20));
        assert_eq!(zoom(&app), Some(5.5));
        handle_mouse(&mut app, mouse(MouseEventKind::ScrollDown, 5, 20));
        assert_eq!(zoom(&app), Some(5.5));
    }
}
