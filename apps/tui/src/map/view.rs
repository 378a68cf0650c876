use super::adapter::{set_visibility, MapAdapter, MapEvent};
use crate::domain::{DrawMode, PopupInfo};
use crate::draw::{DrawAdapter, DrawTool, PointerEvent, ToolKey, TOOL_LAYER_PREFIX};
use crate::engine::{EngineEvent, EngineOptions, Gesture, MapEngine, ScreenPoint};
use crate::store::{AppStore, LayerVisibility, StyleState};
use crate::style::layers::DataPaths;
use tracing::{debug, warn};

/// Something the UI should tell the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNotice {
    Ready,
    SourceLoaded { source: String, features: usize },
    Error(String),
}

/// Last state pushed into the engine, compared against the store on every
/// tick so that only changed slices are re-applied.
#[derive(Debug, Default)]
struct Applied {
    visibility: Option<LayerVisibility>,
    style: Option<StyleState>,
    draw_mode: Option<DrawMode>,
    drawn_visible: Option<bool>,
}

/// Composes the map adapter, the draw adapter and the bound popup. The
/// only owner of the engine and the drawing tool.
pub struct MapView<E: MapEngine, T: DrawTool> {
    map: MapAdapter<E>,
    draw: DrawAdapter<T>,
    applied: Applied,
    /// Drawn-layer visibility waiting for the tool's layers to exist.
    pending_drawn_visibility: Option<bool>,
    popup: Option<PopupInfo>,
    tool_drag: bool,
    last_drag: Option<ScreenPoint>,
    mounted: bool,
}

impl<E: MapEngine, T: DrawTool> MapView<E, T> {
    pub fn mount(options: EngineOptions, data: DataPaths, tool: T) -> Self {
        Self {
            map: MapAdapter::initialize(options, data),
            draw: DrawAdapter::new(tool),
            applied: Applied::default(),
            pending_drawn_visibility: None,
            popup: None,
            tool_drag: false,
            last_drag: None,
            mounted: true,
        }
    }

    pub const fn is_ready(&self) -> bool {
        self.map.is_ready()
    }

    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub const fn engine(&self) -> Option<&E> {
        self.map.engine()
    }

    pub const fn draw(&self) -> &DrawAdapter<T> {
        &self.draw
    }

    pub const fn popup(&self) -> Option<&PopupInfo> {
        self.popup.as_ref()
    }

    pub const fn is_hovering(&self) -> bool {
        self.map.is_hovering()
    }

    /// Processes engine events, then brings the engine in line with the
    /// store.
    pub fn tick(&mut self, store: &mut AppStore) -> Vec<ViewNotice> {
        if !self.mounted {
            return Vec::new();
        }
        let mut notices = Vec::new();
        for event in self.map.poll() {
            match event {
                EngineEvent::Load => {
                    self.on_load();
                    notices.push(ViewNotice::Ready);
                }
                EngineEvent::StyleError(message) => {
                    notices.push(ViewNotice::Error(format!("basemap: {message}")));
                }
                EngineEvent::SourceLoaded { source, features } => {
                    notices.push(ViewNotice::SourceLoaded { source, features });
                }
                EngineEvent::SourceFailed { source, message } => {
                    notices.push(ViewNotice::Error(format!("{source}: {message}")));
                }
            }
        }

        if self.map.is_ready() {
            self.sync(store);
        }
        notices
    }

    fn on_load(&mut self) {
        if let Err(err) = self.map.apply_layer_config() {
            warn!("grid layers not registered: {err}");
        }
        if let Some(engine) = self.map.engine_mut() {
            self.draw.start(engine);
        }
    }

    fn sync(&mut self, store: &mut AppStore) {
        let visibility = *store.layer_visibility();
        if self.applied.visibility != Some(visibility) {
            self.map.set_layer_visibility(&visibility);
            self.applied.visibility = Some(visibility);
        }

        if self.applied.drawn_visible != Some(visibility.drawn_features) {
            self.pending_drawn_visibility = Some(visibility.drawn_features);
            self.applied.drawn_visible = Some(visibility.drawn_features);
        }
        self.apply_pending_drawn_visibility();

        let style = *store.style();
        if self.applied.style != Some(style) {
            self.map.set_line_style(&style);
            self.applied.style = Some(style);
        }

        let mode = store.draw_mode();
        if self.applied.draw_mode != Some(mode) && self.draw.is_started() {
            if let Some(engine) = self.map.engine_mut() {
                self.draw.set_mode(engine, mode);
            }
            if self.draw.mode_ready() {
                self.applied.draw_mode = Some(mode);
            }
        }

        self.draw.sync_count(store);

        if self.popup.as_ref() != store.popup() {
            self.popup = store.popup().cloned();
            debug!(open = self.popup.is_some(), "popup replaced");
        }
    }

    fn apply_pending_drawn_visibility(&mut self) {
        let Some(visible) = self.pending_drawn_visibility else {
            return;
        };
        let Some(engine) = self.map.engine_mut() else {
            return;
        };
        if !self.draw.layers_ready(&*engine) {
            return;
        }
        for id in engine.layer_ids() {
            if id.starts_with(TOOL_LAYER_PREFIX) {
                set_visibility(&mut *engine, &id, visible);
            }
        }
        debug!(visible, "drawn feature layers toggled");
        self.pending_drawn_visibility = None;
    }

    fn apply_map_event(store: &mut AppStore, event: &MapEvent) {
        match event {
            MapEvent::FeatureClicked(info) => store.set_popup(Some(info.clone())),
            MapEvent::PopupDismiss => store.set_popup(None),
            MapEvent::HoverEnter | MapEvent::HoverLeave => {}
        }
    }

    /// Routes pointer input: the drawing tool sees it first, anything it
    /// leaves goes to the map.
    pub fn pointer(&mut self, store: &mut AppStore, event: PointerEvent) -> Option<MapEvent> {
        if !self.map.is_ready() {
            return None;
        }
        let consumed = match self.map.engine_mut() {
            Some(engine) => self.draw.handle_pointer(engine, event),
            None => return None,
        };

        let map_event = match event {
            PointerEvent::Click(point) if !consumed => self.map.handle_click(point),
            PointerEvent::DoubleClick(point) if !consumed => {
                self.gesture(Gesture::DoubleClick(point));
                None
            }
            PointerEvent::Move(point) => self.map.handle_hover(point),
            PointerEvent::DragStart(point) => {
                self.tool_drag = consumed;
                self.last_drag = Some(point);
                None
            }
            PointerEvent::Drag(point) | PointerEvent::DragEnd(point) => {
                if !self.tool_drag {
                    if let Some(last) = self.last_drag {
                        self.gesture(Gesture::Drag {
                            dx: point.x - last.x,
                            dy: point.y - last.y,
                        });
                    }
                }
                self.last_drag = matches!(event, PointerEvent::Drag(_)).then_some(point);
                if matches!(event, PointerEvent::DragEnd(_)) {
                    self.tool_drag = false;
                }
                None
            }
            _ => None,
        };

        if let Some(map_event) = &map_event {
            Self::apply_map_event(store, map_event);
        }
        self.draw.sync_count(store);
        map_event
    }

    /// Returns `true` when the drawing tool handled the key.
    pub fn key(&mut self, store: &mut AppStore, key: ToolKey) -> bool {
        let handled = match self.map.engine_mut() {
            Some(engine) => self.draw.handle_key(engine, key),
            None => false,
        };
        self.draw.sync_count(store);
        handled
    }

    pub fn gesture(&mut self, gesture: Gesture) {
        if let Some(engine) = self.map.engine_mut() {
            engine.gesture(gesture);
        }
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if let Some(engine) = self.map.engine_mut() {
            engine.pan_by(dx, dy);
        }
    }

    pub fn zoom_by(&mut self, delta: f64) {
        if let Some(engine) = self.map.engine_mut() {
            engine.zoom_by(delta);
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if let Some(engine) = self.map.engine_mut() {
            engine.resize(width, height);
        }
    }

    /// Stops the tool, releases the engine and drops the popup.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        if let Some(engine) = self.map.engine_mut() {
            self.draw.stop(engine);
        }
        self.map.teardown();
        self.popup = None;
        self.pending_drawn_visibility = None;
        self.mounted = false;
        debug!("map view unmounted");
    }
}

impl<E: MapEngine, T: DrawTool> Drop for MapView<E, T> {
    fn drop(&mut self) {
        self.unmount();
    }
}
