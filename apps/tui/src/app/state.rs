use crate::ui::layout::{self, AppLayout};
use grid_explorer::config::AppConfig;
use grid_explorer::domain::{DrawMode, LayerKey, SidebarTab};
use grid_explorer::draw::TerminalDraw;
use grid_explorer::engine::{MapEngine, ScreenPoint, TerminalEngine};
use grid_explorer::map::{MapView, ViewNotice};
use grid_explorer::store::AppStore;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Two clicks on the same cell within this window form a double click.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

/// Canvas dots per terminal cell.
pub const DOTS_PER_COLUMN: f64 = 2.0;
pub const DOTS_PER_ROW: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Map,
}

/// Rows of the Style panel, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRow {
    ColorBy,
    LineWidth,
    ShowLabels,
}

impl StyleRow {
    pub const ALL: [Self; 3] = [Self::ColorBy, Self::LineWidth, Self::ShowLabels];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::ColorBy),
            1 => Some(Self::LineWidth),
            2 => Some(Self::ShowLabels),
            _ => None,
        }
    }
}

/// Number of selectable rows in a sidebar panel.
pub const fn panel_len(tab: SidebarTab) -> usize {
    match tab {
        SidebarTab::Layers => LayerKey::ALL.len(),
        SidebarTab::Style => StyleRow::ALL.len(),
        SidebarTab::Draw => DrawMode::ALL.len(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClickRecord {
    column: u16,
    row: u16,
    at: Instant,
}

/// Detects double clicks from a stream of single clicks.
#[derive(Debug, Default)]
pub struct ClickTracker {
    last: Option<ClickRecord>,
}

impl ClickTracker {
    /// Records a click and reports whether it completes a double click.
    pub fn register(&mut self, column: u16, row: u16, at: Instant) -> bool {
        let double = self.last.is_some_and(|last| {
            last.column == column
                && last.row == row
                && at.saturating_duration_since(last.at) <= DOUBLE_CLICK_WINDOW
        });
        self.last = if double {
            None
        } else {
            Some(ClickRecord { column, row, at })
        };
        double
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

pub struct App {
    pub running: bool,
    pub store: AppStore,
    pub map: MapView<TerminalEngine, TerminalDraw>,
    pub focus: Focus,
    pub layer_selection_index: usize,
    pub style_selection_index: usize,
    pub draw_selection_index: usize,
    pub status_message: String,
    pub show_help: bool,
    pub hovering: bool,
    pub clicks: ClickTracker,
    /// Last mouse-down position on the map while the button is held.
    pub mouse_drag: Option<(u16, u16)>,
    pub dragging: bool,
    pub layout: Option<AppLayout>,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        info!(
            lines = %config.data_paths().lines.display(),
            substations = %config.data_paths().substations.display(),
            "mounting map"
        );
        Self {
            running: true,
            store: AppStore::new(),
            map: MapView::mount(
                config.engine_options(),
                config.data_paths(),
                TerminalDraw::default(),
            ),
            focus: Focus::Map,
            layer_selection_index: 0,
            style_selection_index: 0,
            draw_selection_index: 0,
            status_message: "Loading grid data...".to_string(),
            show_help: false,
            hovering: false,
            clicks: ClickTracker::default(),
            mouse_drag: None,
            dragging: false,
            layout: None,
        }
    }

    /// Runs one frame of map bookkeeping.
    pub fn update(&mut self) {
        for notice in self.map.tick(&mut self.store) {
            match notice {
                ViewNotice::Ready => self.status_message = "Map ready".to_string(),
                ViewNotice::SourceLoaded { source, features } => {
                    self.status_message = format!("Loaded {features} features from {source}");
                }
                ViewNotice::Error(message) => {
                    warn!("{message}");
                    self.status_message = format!("Error: {message}");
                }
            }
        }
        self.hovering = self.map.is_hovering();
    }

    /// Resizes the engine to match the map area and remembers the layout.
    pub fn set_layout(&mut self, area: Rect) -> AppLayout {
        let layout = layout::compute(area);
        if self.layout.map(|previous| previous.map) != Some(layout.map) {
            self.map.resize(
                f64::from(layout.map.width) * DOTS_PER_COLUMN,
                f64::from(layout.map.height) * DOTS_PER_ROW,
            );
        }
        self.layout = Some(layout);
        layout
    }

    pub fn quit(&mut self) {
        self.running = false;
        self.map.unmount();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Map,
            Focus::Map => Focus::Sidebar,
        };
    }

    pub fn select_tab(&mut self, tab: SidebarTab) {
        self.store.set_active_tab(tab);
        self.focus = Focus::Sidebar;
    }

    pub fn panel_selection(&self) -> usize {
        match self.store.active_tab() {
            SidebarTab::Layers => self.layer_selection_index,
            SidebarTab::Style => self.style_selection_index,
            SidebarTab::Draw => self.draw_selection_index,
        }
    }

    pub fn set_panel_selection(&mut self, index: usize) {
        match self.store.active_tab() {
            SidebarTab::Layers => self.layer_selection_index = index,
            SidebarTab::Style => self.style_selection_index = index,
            SidebarTab::Draw => self.draw_selection_index = index,
        }
    }

    /// Center of the map area in canvas dots.
    pub fn crosshair(&self) -> ScreenPoint {
        let map = self.layout.map_or(Rect::default(), |layout| layout.map);
        ScreenPoint::new(
            f64::from(map.width) * DOTS_PER_COLUMN / 2.0,
            f64::from(map.height) * DOTS_PER_ROW / 2.0,
        )
    }

    /// Converts a terminal cell inside the map area to the dot at its center.
    pub fn cell_to_point(&self, column: u16, row: u16) -> Option<ScreenPoint> {
        let map = self.layout?.map;
        if !layout::contains(map, column, row) {
            return None;
        }
        Some(ScreenPoint::new(
            (f64::from(column - map.x) + 0.5) * DOTS_PER_COLUMN,
            (f64::from(row - map.y) + 0.5) * DOTS_PER_ROW,
        ))
    }

    /// Where the open popup is drawn, if it is on screen.
    pub fn popup_area(&self, height: u16) -> Option<Rect> {
        let info = self.store.popup()?;
        let map = self.layout?.map;
        let engine = self.map.engine()?;
        let point = engine.project(info.lng_lat);
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let column = f64::from(map.x) + (point.x / DOTS_PER_COLUMN).floor();
        let row = f64::from(map.y) + (point.y / DOTS_PER_ROW).floor();
        if column >= f64::from(map.right()) || row >= f64::from(map.bottom()) {
            return None;
        }
        Some(layout::popup_rect(map, (column as u16, row as u16), height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let config = AppConfig {
            data_dir: "does-not-exist".into(),
            basemap_style: "none".to_string(),
            ..AppConfig::default()
        };
        App::new(&config)
    }

    #[test]
    fn double_click_needs_same_cell_and_window() {
        let mut clicks = ClickTracker::default();
        let start = Instant::now();
        assert!(!clicks.register(5, 5, start));
        assert!(clicks.register(5, 5, start + Duration::from_millis(300)));
        assert!(!clicks.register(5, 5, start + Duration::from_millis(350)));

        assert!(!clicks.register(6, 5, start + Duration::from_millis(360)));
        assert!(!clicks.register(6, 5, start + Duration::from_millis(900)));
    }

    #[test]
    fn cells_map_to_dots_inside_the_map_only() {
        let mut app = app();
        let layout = app.set_layout(Rect::new(0, 0, 120, 40));
        let point = app.cell_to_point(layout.map.x, layout.map.y);
        assert_eq!(point, Some(ScreenPoint::new(1.0, 2.0)));
        assert_eq!(app.cell_to_point(0, 0), None);
        assert_eq!(app.crosshair(), ScreenPoint::new(84.0, 68.0));
    }

    #[test]
    fn panel_selection_follows_the_active_tab() {
        let mut app = app();
        app.set_panel_selection(3);
        app.select_tab(SidebarTab::Draw);
        assert_eq!(app.panel_selection(), 0);
        app.set_panel_selection(2);
        app.select_tab(SidebarTab::Layers);
        assert_eq!(app.panel_selection(), 3);
        assert_eq!(app.focus, Focus::Sidebar);
    }

    #[test]
    fn missing_data_surfaces_in_the_status_line() {
        let mut app = app();
        app.update();
        assert_eq!(app.status_message, "Map ready");
        assert!(app.map.is_ready());

        app.update();
        assert!(app.status_message.starts_with("Error: "), "{}", app.status_message);
    }

    #[test]
    fn quitting_releases_the_map() {
        let mut app = app();
        app.update();
        app.quit();
        assert!(!app.running);
        assert!(app.map.engine().is_none());
    }
}
