use crate::domain::{LayerKey, PopupInfo, PopupProperties};
use crate::engine::{EngineError, EngineEvent, EngineOptions, MapEngine, ScreenPoint};
use crate::store::{LayerVisibility, StyleState};
use crate::style::layers::{
    grid_layers, grid_sources, layer_ids, ColorRule, DataPaths, LayoutProperty, PaintProperty,
    Visibility, LINE_LAYER_IDS, SUBSTATIONS_CIRCLES, SUBSTATIONS_LABELS,
};
use tracing::{debug, info, warn};

/// What the map reports back to the shared store.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    FeatureClicked(PopupInfo),
    PopupDismiss,
    /// Pointer moved onto a clickable substation.
    HoverEnter,
    HoverLeave,
}

/// Owns the single engine instance for the lifetime of the map view.
pub struct MapAdapter<E: MapEngine> {
    engine: Option<E>,
    data: DataPaths,
    ready: bool,
    layers_applied: bool,
    hovering: bool,
    /// Labels show only when both the substation layer and the label
    /// toggle allow it.
    substations_visible: bool,
    show_labels: bool,
}

impl<E: MapEngine> MapAdapter<E> {
    /// Creates the engine. Readiness arrives later through [`Self::poll`].
    pub fn initialize(options: EngineOptions, data: DataPaths) -> Self {
        debug!(center = ?options.center, zoom = options.zoom, "initializing map");
        Self {
            engine: Some(E::create(options)),
            data,
            ready: false,
            layers_applied: false,
            hovering: false,
            substations_visible: true,
            show_labels: false,
        }
    }

    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    pub const fn layers_applied(&self) -> bool {
        self.layers_applied
    }

    pub const fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    /// Drains engine events, marking the map ready on load.
    pub fn poll(&mut self) -> Vec<EngineEvent> {
        let Some(engine) = self.engine.as_mut() else {
            return Vec::new();
        };
        let events = engine.poll_events();
        if events.contains(&EngineEvent::Load) && !self.ready {
            debug!("map ready");
            self.ready = true;
        }
        events
    }

    /// Registers the grid sources and layers. Runs at most once per engine
    /// and only after the engine is ready.
    pub fn apply_layer_config(&mut self) -> Result<bool, EngineError> {
        if !self.ready || self.layers_applied {
            return Ok(false);
        }
        let Some(engine) = self.engine.as_mut() else {
            return Ok(false);
        };

        for (id, spec) in grid_sources(&self.data) {
            engine.add_source(&id, spec)?;
        }
        let layers = grid_layers();
        let count = layers.len();
        for layer in layers {
            engine.add_layer(layer)?;
        }
        self.layers_applied = true;
        info!(layers = count, "grid layers registered");
        Ok(true)
    }

    /// Shows or hides each grid layer. Layers that are not registered yet
    /// are skipped.
    pub fn set_layer_visibility(&mut self, visibility: &LayerVisibility) {
        self.substations_visible = visibility.substations;
        let show_labels = self.show_labels;
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        for key in LayerKey::ALL {
            let visible = visibility.get(key);
            for id in layer_ids(key) {
                let visible = if *id == SUBSTATIONS_LABELS {
                    visible && show_labels
                } else {
                    visible
                };
                set_visibility(engine, id, visible);
            }
        }
    }

    /// Re-applies the color rule and width to every line tier and toggles
    /// the label layer.
    pub fn set_line_style(&mut self, style: &StyleState) {
        self.show_labels = style.show_labels;
        let labels = style.show_labels && self.substations_visible;
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let color = ColorRule::for_color_by(style.color_by);
        for id in LINE_LAYER_IDS {
            if !engine.has_layer(id) {
                continue;
            }
            let result = engine
                .set_paint_property(id, PaintProperty::Color(color.clone()))
                .and_then(|()| engine.set_paint_property(id, PaintProperty::Width(style.line_width)));
            if let Err(err) = result {
                warn!(layer = id, "line style not applied: {err}");
            }
        }
        set_visibility(engine, SUBSTATIONS_LABELS, labels);
    }

    /// Translates a click into a popup request or a dismissal.
    pub fn handle_click(&mut self, point: ScreenPoint) -> Option<MapEvent> {
        if !self.ready {
            return None;
        }
        let engine = self.engine.as_ref()?;
        let lng_lat = engine.unproject(point);

        if let Some(hit) = engine
            .query_rendered_features(point, &[SUBSTATIONS_CIRCLES])
            .into_iter()
            .next()
        {
            debug!(id = ?hit.feature.properties.text("id"), "substation clicked");
            return Some(MapEvent::FeatureClicked(PopupInfo {
                lng_lat,
                properties: PopupProperties::Substation(hit.feature.properties.substation()),
            }));
        }

        if let Some(hit) = engine
            .query_rendered_features(point, &LINE_LAYER_IDS)
            .into_iter()
            .next()
        {
            debug!(id = ?hit.feature.properties.text("id"), "line clicked");
            return Some(MapEvent::FeatureClicked(PopupInfo {
                lng_lat,
                properties: PopupProperties::Line(hit.feature.properties.line()),
            }));
        }

        Some(MapEvent::PopupDismiss)
    }

    /// Reports pointer transitions onto and off clickable substations.
    pub fn handle_hover(&mut self, point: ScreenPoint) -> Option<MapEvent> {
        if !self.ready {
            return None;
        }
        let over = self.engine.as_ref().is_some_and(|engine| {
            !engine
                .query_rendered_features(point, &[SUBSTATIONS_CIRCLES])
                .is_empty()
        });
        match (self.hovering, over) {
            (false, true) => {
                self.hovering = true;
                Some(MapEvent::HoverEnter)
            }
            (true, false) => {
                self.hovering = false;
                Some(MapEvent::HoverLeave)
            }
            _ => None,
        }
    }

    pub const fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Destroys the engine. Later calls become no-ops.
    pub fn teardown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.remove();
            debug!("map engine released");
        }
        self.ready = false;
        self.hovering = false;
    }
}

pub(crate) fn set_visibility(engine: &mut dyn MapEngine, id: &str, visible: bool) {
    if !engine.has_layer(id) {
        return;
    }
    let property = LayoutProperty::Visibility(Visibility::from_flag(visible));
    if let Err(err) = engine.set_layout_property(id, property) {
        warn!(layer = id, "visibility not applied: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColorBy, FeatureKind};
    use crate::map::testing::{feature, Call, MockEngine};
    use crate::style::layers::{LINES_220KV, LINES_380KV, SUBSTATIONS_CLUSTERS};
    use serde_json::json;
    use std::path::PathBuf;

    fn paths() -> DataPaths {
        DataPaths {
            lines: PathBuf::from("lines.geojson"),
            substations: PathBuf::from("substations.geojson"),
        }
    }

    fn ready_adapter() -> MapAdapter<MockEngine> {
        let mut adapter = MapAdapter::<MockEngine>::initialize(EngineOptions::default(), paths());
        adapter.poll();
        adapter
    }

    fn visibility_of(adapter: &MapAdapter<MockEngine>, id: &str) -> Option<Visibility> {
        adapter.engine().and_then(|engine| engine.layout_visibility(id))
    }

    #[test]
    fn visibility_before_layers_is_a_noop() {
        let mut adapter = ready_adapter();
        adapter.set_layer_visibility(&LayerVisibility::default());
        adapter.set_line_style(&StyleState::default());
        let calls = adapter.engine().map(|e| e.calls.len());
        assert_eq!(calls, Some(0));
    }

    #[test]
    fn layer_config_waits_for_ready_and_applies_once() -> Result<(), EngineError> {
        let mut adapter = MapAdapter::<MockEngine>::initialize(EngineOptions::default(), paths());
        assert!(!adapter.apply_layer_config()?);

        adapter.poll();
        assert!(adapter.apply_layer_config()?);
        assert!(!adapter.apply_layer_config()?);

        let sources = adapter
            .engine()
            .map(|e| e.calls.iter().filter(|c| matches!(c, Call::AddSource(_))).count());
        assert_eq!(sources, Some(2));
        Ok(())
    }

    #[test]
    fn hiding_one_tier_leaves_the_others() -> Result<(), EngineError> {
        let mut adapter = ready_adapter();
        adapter.apply_layer_config()?;

        let mut visibility = LayerVisibility::default();
        visibility.set(LayerKey::Lines220kv, false);
        adapter.set_layer_visibility(&visibility);

        assert_eq!(visibility_of(&adapter, LINES_220KV), Some(Visibility::None));
        assert_eq!(visibility_of(&adapter, LINES_380KV), Some(Visibility::Visible));
        assert_eq!(visibility_of(&adapter, SUBSTATIONS_CLUSTERS), Some(Visibility::Visible));
        assert_eq!(visibility_of(&adapter, SUBSTATIONS_LABELS), Some(Visibility::None));
        Ok(())
    }

    #[test]
    fn style_round_trip_restores_voltage_coloring() -> Result<(), EngineError> {
        let mut adapter = ready_adapter();
        adapter.apply_layer_config()?;

        let voltage = StyleState::default();
        adapter.set_line_style(&voltage);
        let first = adapter.engine().map(|e| e.paint_of(LINES_380KV));

        adapter.set_line_style(&StyleState {
            color_by: ColorBy::Capacity,
            ..voltage
        });
        let capacity = adapter.engine().map(|e| e.paint_of(LINES_380KV));
        assert_ne!(capacity, first);

        adapter.set_line_style(&voltage);
        assert_eq!(adapter.engine().map(|e| e.paint_of(LINES_380KV)), first);
        Ok(())
    }

    #[test]
    fn labels_follow_toggle_and_substation_visibility() -> Result<(), EngineError> {
        let mut adapter = ready_adapter();
        adapter.apply_layer_config()?;

        adapter.set_line_style(&StyleState {
            show_labels: true,
            ..StyleState::default()
        });
        assert_eq!(visibility_of(&adapter, SUBSTATIONS_LABELS), Some(Visibility::Visible));

        let mut visibility = LayerVisibility::default();
        visibility.set(LayerKey::Substations, false);
        adapter.set_layer_visibility(&visibility);
        assert_eq!(visibility_of(&adapter, SUBSTATIONS_LABELS), Some(Visibility::None));
        Ok(())
    }

    #[test]
    fn clicks_open_substation_and_line_popups() -> Result<(), EngineError> {
        let mut adapter = ready_adapter();
        adapter.apply_layer_config()?;
        let substation = feature(json!({ "id": "s1", "name": "Alpha", "voltage_kv": 380 }));
        let line = feature(json!({ "id": "l1", "voltage_kv": 220, "capacity_mw": 1500 }));
        if let Some(engine) = adapter.engine_mut() {
            engine.put_hit(ScreenPoint::new(5.0, 5.0), SUBSTATIONS_CIRCLES, substation);
            engine.put_hit(ScreenPoint::new(9.0, 9.0), LINES_220KV, line);
        }

        match adapter.handle_click(ScreenPoint::new(5.0, 5.0)) {
            Some(MapEvent::FeatureClicked(info)) => {
                assert_eq!(info.kind(), FeatureKind::Substation);
                assert!((info.properties.voltage_kv() - 380.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected event {other:?}"),
        }
        match adapter.handle_click(ScreenPoint::new(9.0, 9.0)) {
            Some(MapEvent::FeatureClicked(info)) => assert_eq!(info.kind(), FeatureKind::Line),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(
            adapter.handle_click(ScreenPoint::new(50.0, 50.0)),
            Some(MapEvent::PopupDismiss)
        );
        Ok(())
    }

    #[test]
    fn hover_reports_transitions_only() -> Result<(), EngineError> {
        let mut adapter = ready_adapter();
        adapter.apply_layer_config()?;
        let substation = feature(json!({ "voltage_kv": 220 }));
        if let Some(engine) = adapter.engine_mut() {
            engine.put_hit(ScreenPoint::new(5.0, 5.0), SUBSTATIONS_CIRCLES, substation);
        }

        let over = ScreenPoint::new(5.0, 5.0);
        let away = ScreenPoint::new(40.0, 40.0);
        assert_eq!(adapter.handle_hover(over), Some(MapEvent::HoverEnter));
        assert_eq!(adapter.handle_hover(over), None);
        assert_eq!(adapter.handle_hover(away), Some(MapEvent::HoverLeave));
        assert_eq!(adapter.handle_hover(away), None);
        Ok(())
    }

    #[test]
    fn teardown_releases_the_engine() {
        let mut adapter = ready_adapter();
        adapter.teardown();
        assert!(adapter.engine().is_none());
        assert!(!adapter.is_ready());
        assert_eq!(adapter.handle_click(ScreenPoint::default()), None);
        adapter.teardown();
    }
}
