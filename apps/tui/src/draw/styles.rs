use crate::style::palette::{Rgb, DRAWN_PURPLE, DRAWN_SELECTED_PURPLE, MAP_BACKGROUND};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    pub color: Rgb,
    pub width: f64,
    pub outline_color: Rgb,
    pub outline_width: f64,
}

impl PointStyle {
    const fn drawn(color: Rgb, width: f64, outline_width: f64) -> Self {
        Self {
            color,
            width,
            outline_color: MAP_BACKGROUND,
            outline_width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Rgb,
    pub width: f64,
}

/// Per-mode visuals. Every drawn feature uses the accent color; selection
/// switches to the lighter variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStyles {
    pub point: PointStyle,
    pub line: LineStyle,
    pub coordinate_point: PointStyle,
    pub closing_point: PointStyle,
    pub selected_line: LineStyle,
    pub selection_point: PointStyle,
    pub mid_point: PointStyle,
    pub selected_point: PointStyle,
}

impl Default for DrawStyles {
    fn default() -> Self {
        Self {
            point: PointStyle::drawn(DRAWN_PURPLE, 8.0, 2.0),
            line: LineStyle {
                color: DRAWN_PURPLE,
                width: 2.0,
            },
            coordinate_point: PointStyle::drawn(DRAWN_PURPLE, 5.0, 1.0),
            closing_point: PointStyle::drawn(DRAWN_PURPLE, 7.0, 1.0),
            selected_line: LineStyle {
                color: DRAWN_SELECTED_PURPLE,
                width: 3.0,
            },
            selection_point: PointStyle::drawn(DRAWN_PURPLE, 8.0, 2.0),
            mid_point: PointStyle::drawn(DRAWN_PURPLE, 6.0, 1.0),
            selected_point: PointStyle::drawn(DRAWN_SELECTED_PURPLE, 10.0, 2.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateFlags {
    pub midpoints: bool,
    pub draggable: bool,
    pub deletable: bool,
}

/// What select mode may do with one feature type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    pub draggable: bool,
    pub deletable: bool,
    pub coordinates: Option<CoordinateFlags>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectFlags {
    pub line: FeatureFlags,
    pub point: FeatureFlags,
}

impl Default for SelectFlags {
    fn default() -> Self {
        Self {
            line: FeatureFlags {
                draggable: true,
                deletable: true,
                coordinates: Some(CoordinateFlags {
                    midpoints: true,
                    draggable: true,
                    deletable: true,
                }),
            },
            point: FeatureFlags {
                draggable: true,
                deletable: true,
                coordinates: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawConfig {
    pub styles: DrawStyles,
    pub flags: SelectFlags,
    /// Line placement snaps to existing coordinates.
    pub snap_to_coordinates: bool,
    pub snap_distance_px: f64,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            styles: DrawStyles::default(),
            flags: SelectFlags::default(),
            snap_to_coordinates: true,
            snap_distance_px: 10.0,
        }
    }
}
