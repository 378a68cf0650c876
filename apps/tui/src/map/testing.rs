//! Recording doubles for the engine and drawing tool boundaries.

use crate::data::{Feature, FeatureProperties, Geometry};
use crate::domain::LngLat;
use crate::draw::{ChangeEvent, ChangeKind, DrawError, DrawTool, DrawnFeature, DrawnGeometry};
use crate::draw::{PointerEvent, ToolKey, ToolMode};
use crate::engine::{
    Camera, EngineError, EngineEvent, EngineOptions, MapEngine, RenderedFeature, ScreenPoint,
};
use crate::style::layers::{
    ColorRule, Filter, LayerKind, LayerSpec, Layout, LayoutProperty, Paint, PaintProperty,
    SizeRule, SourceData, SourceSpec, Visibility,
};
use crate::style::palette::DRAWN_PURPLE;

pub const MOCK_TOOL_LAYERS: [&str; 2] = ["td-linestring", "td-point"];

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AddSource(String),
    SetSourceData(String),
    AddLayer(String),
    Paint(String, PaintProperty),
    Layout(String, LayoutProperty),
    DoubleClickZoom(bool),
    Remove,
}

#[derive(Debug, Default)]
pub struct MockEngine {
    pub calls: Vec<Call>,
    pub sources: Vec<String>,
    pub layers: Vec<LayerSpec>,
    pub events: Vec<EngineEvent>,
    pub hits: Vec<(ScreenPoint, RenderedFeature)>,
    pub double_click_zoom: bool,
    pub center: LngLat,
    pub zoom: f64,
    pub size: (f64, f64),
}

impl MockEngine {
    pub fn put_hit(&mut self, at: ScreenPoint, layer_id: &str, feature: Feature) {
        self.hits.push((
            at,
            RenderedFeature {
                layer_id: layer_id.to_string(),
                source_id: String::new(),
                feature,
            },
        ));
    }

    pub fn paint_of(&self, id: &str) -> Option<Paint> {
        self.layers
            .iter()
            .find(|layer| layer.id == id)
            .map(|layer| layer.paint.clone())
    }

    fn layer_mut(&mut self, id: &str) -> Result<&mut LayerSpec, EngineError> {
        self.layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .ok_or_else(|| EngineError::UnknownLayer(id.to_string()))
    }
}

impl MapEngine for MockEngine {
    fn create(options: EngineOptions) -> Self {
        Self {
            events: vec![EngineEvent::Load],
            double_click_zoom: true,
            center: options.center,
            zoom: options.zoom,
            ..Self::default()
        }
    }

    fn add_source(&mut self, id: &str, _spec: SourceSpec) -> Result<(), EngineError> {
        if self.has_source(id) {
            return Err(EngineError::DuplicateSource(id.to_string()));
        }
        self.sources.push(id.to_string());
        self.calls.push(Call::AddSource(id.to_string()));
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.iter().any(|source| source == id)
    }

    fn set_source_data(&mut self, id: &str, _features: Vec<Feature>) -> Result<(), EngineError> {
        if !self.has_source(id) {
            return Err(EngineError::UnknownSource(id.to_string()));
        }
        self.calls.push(Call::SetSourceData(id.to_string()));
        Ok(())
    }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), EngineError> {
        if self.has_layer(&layer.id) {
            return Err(EngineError::DuplicateLayer(layer.id));
        }
        self.calls.push(Call::AddLayer(layer.id.clone()));
        self.layers.push(layer);
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|layer| layer.id == id)
    }

    fn layer_ids(&self) -> Vec<String> {
        self.layers.iter().map(|layer| layer.id.clone()).collect()
    }

    fn set_paint_property(
        &mut self,
        layer_id: &str,
        property: PaintProperty,
    ) -> Result<(), EngineError> {
        let layer = self.layer_mut(layer_id)?;
        match &property {
            PaintProperty::Color(rule) => layer.paint.color = rule.clone(),
            PaintProperty::Width(width) => layer.paint.size = SizeRule::Fixed(*width),
        }
        self.calls.push(Call::Paint(layer_id.to_string(), property));
        Ok(())
    }

    fn set_layout_property(
        &mut self,
        layer_id: &str,
        property: LayoutProperty,
    ) -> Result<(), EngineError> {
        let layer = self.layer_mut(layer_id)?;
        match property {
            LayoutProperty::Visibility(visibility) => layer.layout.visibility = visibility,
        }
        self.calls.push(Call::Layout(layer_id.to_string(), property));
        Ok(())
    }

    fn layout_visibility(&self, layer_id: &str) -> Option<Visibility> {
        self.layers
            .iter()
            .find(|layer| layer.id == layer_id)
            .map(|layer| layer.layout.visibility)
    }

    fn query_rendered_features(&self, point: ScreenPoint, layers: &[&str]) -> Vec<RenderedFeature> {
        self.hits
            .iter()
            .filter(|(at, hit)| {
                *at == point
                    && layers.contains(&hit.layer_id.as_str())
                    && self.layout_visibility(&hit.layer_id) == Some(Visibility::Visible)
            })
            .map(|(_, hit)| hit.clone())
            .collect()
    }

    fn project(&self, lng_lat: LngLat) -> ScreenPoint {
        ScreenPoint::new(lng_lat.lng, lng_lat.lat)
    }

    fn unproject(&self, point: ScreenPoint) -> LngLat {
        LngLat::new(point.x, point.y)
    }

    fn set_double_click_zoom(&mut self, enabled: bool) {
        self.double_click_zoom = enabled;
        self.calls.push(Call::DoubleClickZoom(enabled));
    }

    fn double_click_zoom_enabled(&self) -> bool {
        self.double_click_zoom
    }

    fn pan_by(&mut self, dx: f64, dy: f64) {
        self.center.lng += dx;
        self.center.lat -= dy;
    }

    fn zoom_by(&mut self, delta: f64) {
        self.zoom += delta;
    }

    fn zoom_at(&mut self, _point: ScreenPoint, delta: f64) {
        self.zoom += delta;
    }

    fn camera(&self) -> Camera {
        Camera {
            center: self.center,
            zoom: self.zoom,
        }
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.size = (width, height);
    }

    fn poll_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn remove(&mut self) {
        self.calls.push(Call::Remove);
        self.layers.clear();
        self.sources.clear();
    }
}

pub fn feature(props: serde_json::Value) -> Feature {
    Feature::new(
        Geometry::Point(LngLat::default()),
        FeatureProperties::new(props.as_object().cloned().unwrap_or_default()),
    )
}

pub fn tool_layer(id: &str) -> LayerSpec {
    LayerSpec {
        id: id.to_string(),
        kind: LayerKind::Line,
        source: "td".to_string(),
        min_zoom: None,
        filter: Filter::Always,
        paint: Paint {
            color: ColorRule::Fixed(DRAWN_PURPLE),
            size: SizeRule::Fixed(2.0),
            opacity: 1.0,
        },
        layout: Layout::default(),
    }
}

/// Drawing tool that places one point per click in point mode.
#[derive(Debug, Default)]
pub struct MockTool {
    pub started: bool,
    pub register_layers: bool,
    pub mode: ToolMode,
    pub features: Vec<DrawnFeature>,
    pub changes: Vec<ChangeEvent>,
    pub stops: usize,
}

impl MockTool {
    pub fn registering() -> Self {
        Self {
            register_layers: true,
            ..Self::default()
        }
    }
}

impl DrawTool for MockTool {
    fn start(&mut self, engine: &mut dyn MapEngine) -> Result<(), DrawError> {
        if self.register_layers {
            engine.add_source(
                "td",
                SourceSpec {
                    data: SourceData::Inline(Vec::new()),
                    cluster: None,
                },
            )?;
            for id in MOCK_TOOL_LAYERS {
                engine.add_layer(tool_layer(id))?;
            }
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self, _engine: &mut dyn MapEngine) {
        self.stops += 1;
        self.started = false;
    }

    fn enabled(&self) -> bool {
        self.started
    }

    fn set_mode(&mut self, _engine: &mut dyn MapEngine, mode: ToolMode) -> Result<(), DrawError> {
        if !self.started {
            return Err(DrawError::NotStarted);
        }
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> ToolMode {
        self.mode
    }

    fn snapshot(&self) -> Vec<DrawnFeature> {
        self.features.clone()
    }

    fn take_changes(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.changes)
    }

    fn handle_pointer(&mut self, engine: &mut dyn MapEngine, event: PointerEvent) -> bool {
        match (self.mode, event) {
            (ToolMode::Point, PointerEvent::Click(point)) => {
                let id = self.features.len() as u64;
                self.features.push(DrawnFeature {
                    id,
                    geometry: DrawnGeometry::Point(engine.unproject(point)),
                });
                self.changes.push(ChangeEvent {
                    ids: vec![id],
                    kind: ChangeKind::Create,
                });
                true
            }
            _ => false,
        }
    }

    fn handle_key(&mut self, _engine: &mut dyn MapEngine, _key: ToolKey) -> bool {
        false
    }

    fn layer_ids(&self) -> &'static [&'static str] {
        &MOCK_TOOL_LAYERS
    }
}
