use super::viewport::{Bounds, Viewport};
use crate::domain::LngLat;
use crate::style::palette::{Rgb, MAP_BACKGROUND};
use ratatui::widgets::canvas::MapResolution;

/// A render-ready frame in canvas (longitude/latitude) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub bounds: Bounds,
    pub background: Rgb,
    pub basemap: Option<MapResolution>,
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn empty(viewport: &Viewport) -> Self {
        Self {
            bounds: viewport.bounds(),
            background: MAP_BACKGROUND,
            basemap: None,
            shapes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Segment {
        from: (f64, f64),
        to: (f64, f64),
        color: Rgb,
    },
    Dots {
        coords: Vec<(f64, f64)>,
        color: Rgb,
    },
    Label {
        at: (f64, f64),
        text: String,
        color: Rgb,
    },
}

/// Canvas strokes used for a line of the given pixel width.
pub fn stroke_count(width_px: f64) -> usize {
    if width_px.is_finite() {
        (width_px / 2.0).round().max(1.0) as usize
    } else {
        1
    }
}

/// Segments for one polyline part, thickened with parallel strokes offset
/// one dot apart.
pub fn polyline(viewport: &Viewport, coords: &[LngLat], width_px: f64, color: Rgb) -> Vec<Shape> {
    let bounds = viewport.bounds();
    let strokes = stroke_count(width_px);
    let (lng_step, lat_step) = (viewport.lng_per_dot(), viewport.lat_per_dot());

    let mut shapes = Vec::new();
    for pair in coords.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if !bounds.touches_segment(a, b) {
            continue;
        }

        // Unit normal in dot space.
        let dx = (b.lng - a.lng) / lng_step;
        let dy = (b.lat - a.lat) / lat_step;
        let length = dx.hypot(dy);
        let (nx, ny) = if length > 0.0 {
            (-dy / length, dx / length)
        } else {
            (0.0, 0.0)
        };

        for stroke in 0..strokes {
            let offset = stroke as f64 - (strokes - 1) as f64 / 2.0;
            let (ox, oy) = (nx * offset * lng_step, ny * offset * lat_step);
            shapes.push(Shape::Segment {
                from: (a.lng + ox, a.lat + oy),
                to: (b.lng + ox, b.lat + oy),
                color,
            });
        }
    }
    shapes
}

/// Dots filling a disc of `radius_dots` around `center`; always at least
/// the center dot.
pub fn disc(viewport: &Viewport, center: LngLat, radius_dots: f64, color: Rgb) -> Shape {
    let (lng_step, lat_step) = (viewport.lng_per_dot(), viewport.lat_per_dot());
    let reach = radius_dots.max(0.0).floor() as i32;

    let mut coords = Vec::new();
    for iy in -reach..=reach {
        for ix in -reach..=reach {
            let (fx, fy) = (f64::from(ix), f64::from(iy));
            if fx.hypot(fy) <= radius_dots.max(0.0) {
                coords.push((
                    fx.mul_add(lng_step, center.lng),
                    fy.mul_add(lat_step, center.lat),
                ));
            }
        }
    }
    if coords.is_empty() {
        coords.push((center.lng, center.lat));
    }
    Shape::Dots { coords, color }
}
