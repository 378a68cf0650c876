//! Shared UI state. One owned value, passed by reference to the panels
//! that edit it and the map view that mirrors it into the engine.

use crate::domain::{ColorBy, DrawMode, LayerKey, PopupInfo, SidebarTab};

pub const MIN_LINE_WIDTH: f64 = 1.0;
pub const MAX_LINE_WIDTH: f64 = 5.0;
pub const LINE_WIDTH_STEP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerVisibility {
    pub lines380kv: bool,
    pub lines220kv: bool,
    pub lines110kv: bool,
    pub substations: bool,
    pub drawn_features: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            lines380kv: true,
            lines220kv: true,
            lines110kv: true,
            substations: true,
            drawn_features: true,
        }
    }
}

impl LayerVisibility {
    pub const fn get(&self, key: LayerKey) -> bool {
        match key {
            LayerKey::Lines380kv => self.lines380kv,
            LayerKey::Lines220kv => self.lines220kv,
            LayerKey::Lines110kv => self.lines110kv,
            LayerKey::Substations => self.substations,
            LayerKey::DrawnFeatures => self.drawn_features,
        }
    }

    pub fn set(&mut self, key: LayerKey, visible: bool) {
        let slot = match key {
            LayerKey::Lines380kv => &mut self.lines380kv,
            LayerKey::Lines220kv => &mut self.lines220kv,
            LayerKey::Lines110kv => &mut self.lines110kv,
            LayerKey::Substations => &mut self.substations,
            LayerKey::DrawnFeatures => &mut self.drawn_features,
        };
        *slot = visible;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleState {
    pub color_by: ColorBy,
    pub line_width: f64,
    pub show_labels: bool,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            color_by: ColorBy::Voltage,
            line_width: 2.0,
            show_labels: false,
        }
    }
}

/// Clamps a requested width to the slider range and snaps it to the step.
pub fn normalize_line_width(width: f64) -> f64 {
    if !width.is_finite() {
        return StyleState::default().line_width;
    }
    let snapped = (width / LINE_WIDTH_STEP).round() * LINE_WIDTH_STEP;
    snapped.clamp(MIN_LINE_WIDTH, MAX_LINE_WIDTH)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppStore {
    active_tab: SidebarTab,
    layer_visibility: LayerVisibility,
    style: StyleState,
    draw_mode: DrawMode,
    drawn_features_count: usize,
    popup: Option<PopupInfo>,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn active_tab(&self) -> SidebarTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: SidebarTab) {
        self.active_tab = tab;
    }

    pub const fn layer_visibility(&self) -> &LayerVisibility {
        &self.layer_visibility
    }

    pub fn set_layer_visibility(&mut self, key: LayerKey, visible: bool) {
        self.layer_visibility.set(key, visible);
    }

    pub fn toggle_layer(&mut self, key: LayerKey) {
        let visible = self.layer_visibility.get(key);
        self.set_layer_visibility(key, !visible);
    }

    pub const fn style(&self) -> &StyleState {
        &self.style
    }

    pub fn set_color_by(&mut self, color_by: ColorBy) {
        self.style.color_by = color_by;
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.style.line_width = normalize_line_width(width);
    }

    pub fn set_show_labels(&mut self, show: bool) {
        self.style.show_labels = show;
    }

    pub const fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        self.draw_mode = mode;
    }

    pub const fn drawn_features_count(&self) -> usize {
        self.drawn_features_count
    }

    /// Only the draw adapter republishes the count.
    pub(crate) fn set_drawn_features_count(&mut self, count: usize) {
        self.drawn_features_count = count;
    }

    pub const fn popup(&self) -> Option<&PopupInfo> {
        self.popup.as_ref()
    }

    pub fn set_popup(&mut self, popup: Option<PopupInfo>) {
        self.popup = popup;
    }
}
