//! Interactive drawing: the tool boundary, the terminal tool and the
//! adapter that binds it to the map and the shared store.

pub mod adapter;
pub mod styles;
pub mod terminal;

use crate::domain::{DrawMode, LngLat};
use crate::engine::{EngineError, MapEngine, ScreenPoint};
use thiserror::Error;

pub use adapter::DrawAdapter;
pub use terminal::TerminalDraw;

/// Prefix shared by every engine layer a drawing tool registers.
pub const TOOL_LAYER_PREFIX: &str = "td-";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error("the drawing tool has not been started")]
    NotStarted,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Modes the tool itself knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    /// Nothing is editable; input falls through to the map.
    #[default]
    Static,
    Point,
    LineString,
    Select,
}

impl ToolMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Point => "point",
            Self::LineString => "linestring",
            Self::Select => "select",
        }
    }
}

impl From<DrawMode> for ToolMode {
    fn from(mode: DrawMode) -> Self {
        match mode {
            DrawMode::Pan => Self::Static,
            DrawMode::LineString => Self::LineString,
            DrawMode::Point => Self::Point,
            DrawMode::Select => Self::Select,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawnGeometry {
    Point(LngLat),
    LineString(Vec<LngLat>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnFeature {
    pub id: u64,
    pub geometry: DrawnGeometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub ids: Vec<u64>,
    pub kind: ChangeKind,
}

/// Pointer input in canvas dots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Click(ScreenPoint),
    DoubleClick(ScreenPoint),
    RightClick(ScreenPoint),
    Move(ScreenPoint),
    DragStart(ScreenPoint),
    Drag(ScreenPoint),
    DragEnd(ScreenPoint),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKey {
    /// Abandons the line being drawn or clears the selection.
    Cancel,
    DeleteSelected,
    DeleteVertex,
}

pub trait DrawTool {
    /// Registers the tool's source and layers with the engine.
    fn start(&mut self, engine: &mut dyn MapEngine) -> Result<(), DrawError>;
    /// Clears everything the tool drew. Safe to call when never started.
    fn stop(&mut self, engine: &mut dyn MapEngine);
    fn enabled(&self) -> bool;

    fn set_mode(&mut self, engine: &mut dyn MapEngine, mode: ToolMode) -> Result<(), DrawError>;
    fn mode(&self) -> ToolMode;

    /// Finished features only.
    fn snapshot(&self) -> Vec<DrawnFeature>;
    /// Change notifications raised since the last call.
    fn take_changes(&mut self) -> Vec<ChangeEvent>;

    /// Returns `true` when the tool consumed the event.
    fn handle_pointer(&mut self, engine: &mut dyn MapEngine, event: PointerEvent) -> bool;
    fn handle_key(&mut self, engine: &mut dyn MapEngine, key: ToolKey) -> bool;

    fn layer_ids(&self) -> &'static [&'static str];

    fn layers_ready(&self, engine: &dyn MapEngine) -> bool {
        self.enabled() && self.layer_ids().iter().all(|id| engine.has_layer(id))
    }
}
