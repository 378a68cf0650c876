use super::viewport::Viewport;
use ratatui::layout::Rect;

pub const NAV_ZOOM_STEP: f64 = 1.0;
const NAV_LABEL: &str = "[+][-]";
const SCALE_MAX_CELLS: f64 = 14.0;
/// Horizontal canvas dots per terminal cell.
const DOTS_PER_CELL: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavButton {
    ZoomIn,
    ZoomOut,
}

impl NavButton {
    pub const fn zoom_delta(self) -> f64 {
        match self {
            Self::ZoomIn => NAV_ZOOM_STEP,
            Self::ZoomOut => -NAV_ZOOM_STEP,
        }
    }
}

pub const fn nav_label() -> &'static str {
    NAV_LABEL
}

/// Where the zoom buttons sit: the top-right corner of the map area.
pub fn nav_control_rect(map: Rect) -> Rect {
    let width = (NAV_LABEL.len() as u16).min(map.width);
    Rect::new(map.right().saturating_sub(width), map.y, width, map.height.min(1))
}

pub fn nav_button_at(map: Rect, column: u16, row: u16) -> Option<NavButton> {
    let rect = nav_control_rect(map);
    if row != rect.y || column < rect.x || column >= rect.right() {
        return None;
    }
    if column - rect.x < 3 {
        Some(NavButton::ZoomIn)
    } else {
        Some(NavButton::ZoomOut)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleBar {
    pub label: String,
    pub width_cells: u16,
}

/// Largest 1, 2, 3 or 5 times a power of ten not above `value`.
pub fn nice_distance(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    let magnitude = 10f64.powf(value.log10().floor());
    let fraction = value / magnitude;
    let nice = [5.0, 3.0, 2.0, 1.0]
        .into_iter()
        .find(|step| fraction >= *step)
        .unwrap_or(1.0);
    nice * magnitude
}

/// Metric scale bar for the current viewport.
pub fn scale_bar(viewport: &Viewport) -> Option<ScaleBar> {
    let meters_per_cell = viewport.meters_per_dot() * DOTS_PER_CELL;
    let meters = nice_distance(meters_per_cell * SCALE_MAX_CELLS);
    if meters <= 0.0 {
        return None;
    }

    let label = if meters >= 1000.0 {
        format!("{} km", meters / 1000.0)
    } else {
        format!("{meters} m")
    };
    Some(ScaleBar {
        label,
        width_cells: (meters / meters_per_cell).round().max(1.0) as u16,
    })
}
