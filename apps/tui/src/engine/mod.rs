//! The rendering engine boundary and its terminal implementation.
//!
//! Everything the adapters need from a map renderer goes through
//! [`MapEngine`]: source and layer registration, style mutation, feature
//! queries, camera gestures and the asynchronous event feed.

pub mod cluster;
pub mod controls;
pub mod scene;
pub mod terminal;
pub mod viewport;

use crate::data::Feature;
use crate::domain::LngLat;
use crate::style::{LayerSpec, LayoutProperty, PaintProperty, SourceSpec, Visibility};
use ratatui::widgets::canvas::MapResolution;
use thiserror::Error;

pub use scene::{Scene, Shape};
pub use terminal::TerminalEngine;
pub use viewport::Viewport;

pub const DEFAULT_CENTER: LngLat = LngLat::new(10.5, 51.2);
pub const DEFAULT_ZOOM: f64 = 5.0;
pub const DEFAULT_STYLE: &str = "builtin:world-high";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown source `{0}`")]
    UnknownSource(String),
    #[error("unknown layer `{0}`")]
    UnknownLayer(String),
    #[error("source `{0}` is already registered")]
    DuplicateSource(String),
    #[error("layer `{0}` is already registered")]
    DuplicateLayer(String),
    #[error("unknown basemap style `{0}`")]
    UnknownStyle(String),
    #[error("the map has been removed")]
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The style is in place and sources and layers may be registered.
    Load,
    StyleError(String),
    SourceLoaded { source: String, features: usize },
    SourceFailed { source: String, message: String },
}

/// A position on the map canvas, in canvas dots from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A feature as the engine currently renders it, tagged with the layer
/// and source it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub layer_id: String,
    pub source_id: String,
    pub feature: Feature,
}

/// Interactions the engine handles natively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    DoubleClick(ScreenPoint),
    /// Pointer moved by the given offset while held down.
    Drag { dx: f64, dy: f64 },
    Wheel { at: ScreenPoint, delta: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasemapStyle {
    World(MapResolution),
    None,
}

impl BasemapStyle {
    pub fn parse(style: &str) -> Result<Self, EngineError> {
        match style.trim() {
            "builtin:world-high" => Ok(Self::World(MapResolution::High)),
            "builtin:world-low" => Ok(Self::World(MapResolution::Low)),
            "none" => Ok(Self::None),
            other => Err(EngineError::UnknownStyle(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub style: String,
    pub center: LngLat,
    pub zoom: f64,
    pub navigation_control: bool,
    pub scale_control: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            style: DEFAULT_STYLE.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            navigation_control: true,
            scale_control: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: LngLat,
    pub zoom: f64,
}

pub trait MapEngine {
    fn create(options: EngineOptions) -> Self
    where
        Self: Sized;

    fn add_source(&mut self, id: &str, spec: SourceSpec) -> Result<(), EngineError>;
    fn has_source(&self, id: &str) -> bool;
    fn set_source_data(&mut self, id: &str, features: Vec<Feature>) -> Result<(), EngineError>;

    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), EngineError>;
    fn has_layer(&self, id: &str) -> bool;
    /// Registered layer ids in draw order.
    fn layer_ids(&self) -> Vec<String>;

    fn set_paint_property(&mut self, layer_id: &str, property: PaintProperty)
        -> Result<(), EngineError>;
    fn set_layout_property(
        &mut self,
        layer_id: &str,
        property: LayoutProperty,
    ) -> Result<(), EngineError>;
    fn layout_visibility(&self, layer_id: &str) -> Option<Visibility>;

    /// Features rendered under `point`, topmost first, restricted to `layers`.
    fn query_rendered_features(&self, point: ScreenPoint, layers: &[&str]) -> Vec<RenderedFeature>;

    fn project(&self, lng_lat: LngLat) -> ScreenPoint;
    fn unproject(&self, point: ScreenPoint) -> LngLat;

    fn set_double_click_zoom(&mut self, enabled: bool);
    fn double_click_zoom_enabled(&self) -> bool;

    /// Moves the camera by an offset in canvas dots; positive `dx` pans east.
    fn pan_by(&mut self, dx: f64, dy: f64);
    fn zoom_by(&mut self, delta: f64);
    /// Zooms while keeping the location under `point` fixed.
    fn zoom_at(&mut self, point: ScreenPoint, delta: f64);
    fn camera(&self) -> Camera;
    fn resize(&mut self, width: f64, height: f64);

    /// Drains events raised since the last poll.
    fn poll_events(&mut self) -> Vec<EngineEvent>;
    /// Releases all sources, layers and pending work.
    fn remove(&mut self);

    fn gesture(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::DoubleClick(point) => {
                if self.double_click_zoom_enabled() {
                    self.zoom_at(point, 1.0);
                }
            }
            Gesture::Drag { dx, dy } => self.pan_by(-dx, -dy),
            Gesture::Wheel { at, delta } => self.zoom_at(at, delta),
        }
    }
}
