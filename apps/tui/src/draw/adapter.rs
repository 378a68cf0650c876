use super::{DrawTool, PointerEvent, ToolKey, ToolMode};
use crate::domain::DrawMode;
use crate::engine::MapEngine;
use crate::store::AppStore;
use tracing::{debug, warn};

/// Binds a drawing tool to the map engine and the shared store.
///
/// The tool is started only once the engine is ready. Calls that arrive
/// before that are skipped by checking `started` and `mode_ready` rather
/// than by attempting them and discarding the failure.
#[derive(Debug)]
pub struct DrawAdapter<T: DrawTool> {
    tool: T,
    started: bool,
    mode_ready: bool,
    mode: DrawMode,
}

impl<T: DrawTool> DrawAdapter<T> {
    pub const fn new(tool: T) -> Self {
        Self {
            tool,
            started: false,
            mode_ready: false,
            mode: DrawMode::Pan,
        }
    }

    pub const fn tool(&self) -> &T {
        &self.tool
    }

    pub const fn is_started(&self) -> bool {
        self.started
    }

    pub const fn mode_ready(&self) -> bool {
        self.mode_ready
    }

    pub const fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Starts the tool once. Returns whether it is running.
    pub fn start(&mut self, engine: &mut dyn MapEngine) -> bool {
        if self.started {
            return true;
        }
        match self.tool.start(engine) {
            Ok(()) => {
                debug!("draw adapter started");
                self.started = true;
            }
            Err(err) => warn!("drawing tool failed to start: {err}"),
        }
        self.started
    }

    /// Maps the application mode onto the tool. Placing modes switch the
    /// engine's double-click zoom off; pan and select switch it back on.
    pub fn set_mode(&mut self, engine: &mut dyn MapEngine, mode: DrawMode) {
        self.mode = mode;
        if !self.started {
            debug!(mode = mode.as_str(), "draw mode deferred until the tool starts");
            self.mode_ready = false;
            return;
        }
        match self.tool.set_mode(engine, ToolMode::from(mode)) {
            Ok(()) => {
                self.mode_ready = true;
                engine.set_double_click_zoom(!mode.is_placing());
            }
            Err(err) => {
                self.mode_ready = false;
                warn!(mode = mode.as_str(), "draw mode not applied: {err}");
            }
        }
    }

    /// Republishes the feature count when the tool reports changes.
    pub fn sync_count(&mut self, store: &mut AppStore) -> bool {
        if !self.started || self.tool.take_changes().is_empty() {
            return false;
        }
        let count = self.tool.snapshot().len();
        debug!(count, "drawn features changed");
        store.set_drawn_features_count(count);
        true
    }

    pub fn handle_pointer(&mut self, engine: &mut dyn MapEngine, event: PointerEvent) -> bool {
        self.mode_ready && self.tool.handle_pointer(engine, event)
    }

    pub fn handle_key(&mut self, engine: &mut dyn MapEngine, key: ToolKey) -> bool {
        self.mode_ready && self.tool.handle_key(engine, key)
    }

    /// Whether every layer the tool draws into exists in the engine.
    pub fn layers_ready(&self, engine: &dyn MapEngine) -> bool {
        self.started && self.tool.layers_ready(engine)
    }

    pub fn layer_ids(&self) -> &'static [&'static str] {
        self.tool.layer_ids()
    }

    pub fn stop(&mut self, engine: &mut dyn MapEngine) {
        if !self.started {
            return;
        }
        self.tool.stop(engine);
        self.started = false;
        self.mode_ready = false;
        debug!("draw adapter stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::TerminalDraw;
    use crate::engine::{EngineOptions, ScreenPoint, TerminalEngine};

    fn engine() -> TerminalEngine {
        let mut engine = TerminalEngine::new(EngineOptions {
            style: "none".to_string(),
            ..EngineOptions::default()
        });
        engine.resize(200.0, 160.0);
        engine
    }

    fn click(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Click(ScreenPoint::new(x, y))
    }

    #[test]
    fn mode_before_start_is_deferred_not_fatal() {
        let mut engine = engine();
        let mut adapter = DrawAdapter::new(TerminalDraw::default());
        adapter.set_mode(&mut engine, DrawMode::Point);

        assert!(!adapter.mode_ready());
        assert!(!adapter.handle_pointer(&mut engine, click(10.0, 10.0)));
        assert!(engine.double_click_zoom_enabled());
    }

    #[test]
    fn placing_modes_disable_double_click_zoom() {
        let mut engine = engine();
        let mut adapter = DrawAdapter::new(TerminalDraw::default());
        assert!(adapter.start(&mut engine));

        for (mode, zoom_enabled) in [
            (DrawMode::LineString, false),
            (DrawMode::Pan, true),
            (DrawMode::Point, false),
            (DrawMode::Select, true),
        ] {
            adapter.set_mode(&mut engine, mode);
            assert_eq!(engine.double_click_zoom_enabled(), zoom_enabled, "{mode:?}");
            assert_eq!(adapter.tool().mode(), ToolMode::from(mode));
        }
    }

    #[test]
    fn changes_republish_the_count() {
        let mut engine = engine();
        let mut store = AppStore::new();
        let mut adapter = DrawAdapter::new(TerminalDraw::default());
        adapter.start(&mut engine);
        adapter.set_mode(&mut engine, DrawMode::Point);

        assert!(adapter.handle_pointer(&mut engine, click(100.0, 80.0)));
        assert!(adapter.sync_count(&mut store));
        assert_eq!(store.drawn_features_count(), 1);

        adapter.set_mode(&mut engine, DrawMode::Select);
        assert!(adapter.handle_pointer(&mut engine, click(100.0, 80.0)));
        assert!(adapter.handle_key(&mut engine, ToolKey::DeleteSelected));
        assert!(adapter.sync_count(&mut store));
        assert_eq!(store.drawn_features_count(), 0);

        assert!(!adapter.sync_count(&mut store));
    }

    #[test]
    fn stop_is_safe_without_start() {
        let mut engine = engine();
        let mut adapter = DrawAdapter::new(TerminalDraw::default());
        adapter.stop(&mut engine);
        assert!(!adapter.is_started());

        adapter.start(&mut engine);
        adapter.stop(&mut engine);
        adapter.stop(&mut engine);
        assert!(!adapter.is_started());
    }
}
