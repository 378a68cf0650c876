use super::cluster::cluster_features;
use super::scene::{disc, polyline, stroke_count, Scene, Shape};
use super::viewport::Viewport;
use super::{
    BasemapStyle, Camera, EngineError, EngineEvent, EngineOptions, MapEngine, RenderedFeature,
    ScreenPoint,
};
use crate::data::{
    load_feature_collection, load_feature_collection_blocking, DataError, Feature,
    FeatureCollection,
};
use crate::domain::LngLat;
use crate::style::layers::{
    ClusterOptions, LayerKind, LayerSpec, LayoutProperty, PaintProperty, SizeRule, SourceData,
    SourceSpec, TextAnchor, Visibility,
};
use ratatui::widgets::canvas::MapResolution;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Extra reach, in dots, granted to pointer queries. A terminal cell is
/// two dots wide and four tall.
const HIT_TOLERANCE_DOTS: f64 = 2.0;
/// Horizontal dots taken by one character of label text.
const DOTS_PER_CHAR: f64 = 2.0;
const LABEL_DROP_DOTS: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SourceStatus {
    Loading,
    Ready,
    Failed,
}

#[derive(Debug)]
struct Source {
    features: Vec<Feature>,
    cluster: Option<ClusterOptions>,
    status: SourceStatus,
    /// Cluster output cached for one integer zoom level.
    clustered: Option<(i32, Vec<Feature>)>,
}

impl Source {
    fn rendered(&self) -> &[Feature] {
        match &self.clustered {
            Some((_, features)) => features,
            None => &self.features,
        }
    }

    fn recluster(&mut self, zoom: f64) {
        let Some(options) = self.cluster else {
            return;
        };
        if zoom > options.max_zoom {
            self.clustered = None;
            return;
        }
        let level = zoom.floor() as i32;
        if self.clustered.as_ref().is_some_and(|(cached, _)| *cached == level) {
            return;
        }
        self.clustered = Some((level, cluster_features(&self.features, zoom, options)));
    }
}

#[derive(Debug)]
struct LoadResult {
    source: String,
    result: Result<FeatureCollection, DataError>,
}

/// Map engine that renders into a ratatui canvas.
///
/// Path-backed sources are read on a tokio task when a runtime is
/// available and synchronously otherwise; either way the outcome is
/// reported through [`MapEngine::poll_events`].
pub struct TerminalEngine {
    options: EngineOptions,
    basemap: Option<MapResolution>,
    viewport: Viewport,
    sources: HashMap<String, Source>,
    layers: Vec<LayerSpec>,
    double_click_zoom: bool,
    events: VecDeque<EngineEvent>,
    load_tx: UnboundedSender<LoadResult>,
    load_rx: UnboundedReceiver<LoadResult>,
    removed: bool,
}

impl TerminalEngine {
    pub fn new(options: EngineOptions) -> Self {
        let mut events = VecDeque::new();
        let basemap = match BasemapStyle::parse(&options.style) {
            Ok(BasemapStyle::World(resolution)) => Some(resolution),
            Ok(BasemapStyle::None) => None,
            Err(err) => {
                warn!(style = %options.style, "basemap style unavailable: {err}");
                events.push_back(EngineEvent::StyleError(err.to_string()));
                None
            }
        };
        events.push_back(EngineEvent::Load);

        let (load_tx, load_rx) = unbounded_channel();
        debug!(style = %options.style, zoom = options.zoom, "map engine created");

        Self {
            viewport: Viewport::new(options.center, options.zoom),
            options,
            basemap,
            sources: HashMap::new(),
            layers: Vec::new(),
            double_click_zoom: true,
            events,
            load_tx,
            load_rx,
            removed: false,
        }
    }

    pub const fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Whether a source still waits for its data.
    pub fn is_loading(&self, source: &str) -> bool {
        self.sources
            .get(source)
            .is_some_and(|s| s.status == SourceStatus::Loading)
    }

    pub fn source_failed(&self, source: &str) -> bool {
        self.sources
            .get(source)
            .is_some_and(|s| s.status == SourceStatus::Failed)
    }

    /// Builds the frame for the current camera.
    pub fn scene(&self) -> Scene {
        let mut scene = Scene::empty(&self.viewport);
        scene.basemap = self.basemap;
        if self.removed {
            return scene;
        }

        for layer in self.layers.iter().filter(|l| self.layer_renders(l)) {
            let Some(source) = self.sources.get(&layer.source) else {
                continue;
            };
            for feature in source.rendered() {
                if layer.filter.matches(&feature.properties) {
                    self.draw_feature(layer, feature, &mut scene.shapes);
                }
            }
        }
        scene
    }

    fn layer_renders(&self, layer: &LayerSpec) -> bool {
        layer.layout.visibility.is_visible()
            && layer.min_zoom.map_or(true, |min| self.viewport.zoom >= min)
    }

    fn draw_feature(&self, layer: &LayerSpec, feature: &Feature, shapes: &mut Vec<Shape>) {
        let props = &feature.properties;
        let color = layer.paint.color.evaluate(props).with_opacity(layer.paint.opacity);
        let size = layer.paint.size.evaluate(props);

        match layer.kind {
            LayerKind::Line => {
                for part in feature.geometry.parts() {
                    shapes.extend(polyline(&self.viewport, part, size, color));
                }
            }
            LayerKind::Circle => {
                if let Some(point) = self.visible_point(feature) {
                    shapes.push(disc(&self.viewport, point, Viewport::px_to_dots(size), color));
                }
            }
            LayerKind::Symbol => {
                let Some(point) = self.visible_point(feature) else {
                    return;
                };
                let Some(text) = layer.layout.text.as_ref().map(|rule| rule.evaluate(props)) else {
                    return;
                };
                if text.is_empty() {
                    return;
                }
                let origin = self.label_origin(point, &text, layer.layout.anchor);
                shapes.push(Shape::Label {
                    at: (origin.lng, origin.lat),
                    text,
                    color,
                });
            }
        }
    }

    fn visible_point(&self, feature: &Feature) -> Option<LngLat> {
        feature
            .geometry
            .as_point()
            .filter(|point| self.viewport.bounds().contains(*point))
    }

    fn label_origin(&self, point: LngLat, text: &str, anchor: TextAnchor) -> LngLat {
        let screen = self.viewport.project(point);
        let half_width = text.chars().count() as f64 * DOTS_PER_CHAR / 2.0;
        let drop = match anchor {
            TextAnchor::Center => 0.0,
            TextAnchor::Top => LABEL_DROP_DOTS,
        };
        self.viewport
            .unproject(ScreenPoint::new(screen.x - half_width, screen.y + drop))
    }

    fn hit(&self, layer: &LayerSpec, feature: &Feature, point: ScreenPoint) -> bool {
        let props = &feature.properties;
        match layer.kind {
            LayerKind::Circle => feature.geometry.as_point().is_some_and(|center| {
                let radius = Viewport::px_to_dots(layer.paint.size.evaluate(props));
                self.viewport.project(center).distance(point) <= radius + HIT_TOLERANCE_DOTS
            }),
            LayerKind::Line => {
                let reach = stroke_count(layer.paint.size.evaluate(props)) as f64 / 2.0
                    + HIT_TOLERANCE_DOTS;
                feature.geometry.parts().iter().any(|part| {
                    part.windows(2).any(|pair| {
                        let a = self.viewport.project(pair[0]);
                        let b = self.viewport.project(pair[1]);
                        segment_distance(point, a, b) <= reach
                    })
                })
            }
            LayerKind::Symbol => {
                let Some(anchor) = feature.geometry.as_point() else {
                    return false;
                };
                let text = layer
                    .layout
                    .text
                    .as_ref()
                    .map(|rule| rule.evaluate(props))
                    .unwrap_or_default();
                if text.is_empty() {
                    return false;
                }
                let origin = self
                    .viewport
                    .project(self.label_origin(anchor, &text, layer.layout.anchor));
                let width = text.chars().count() as f64 * DOTS_PER_CHAR;
                (origin.x..=origin.x + width).contains(&point.x)
                    && (point.y - origin.y).abs() <= HIT_TOLERANCE_DOTS
            }
        }
    }

    fn layer_mut(&mut self, id: &str) -> Result<&mut LayerSpec, EngineError> {
        self.layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .ok_or_else(|| EngineError::UnknownLayer(id.to_string()))
    }

    fn ensure_alive(&self) -> Result<(), EngineError> {
        if self.removed {
            Err(EngineError::Removed)
        } else {
            Ok(())
        }
    }

    fn after_camera_change(&mut self) {
        let zoom = self.viewport.zoom;
        for source in self.sources.values_mut() {
            source.recluster(zoom);
        }
    }

    fn spawn_load(&self, source: String, path: PathBuf) {
        let tx = self.load_tx.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let result = load_feature_collection(&path).await;
                // The engine may be gone by now.
                let _ = tx.send(LoadResult { source, result });
            });
        } else {
            let result = load_feature_collection_blocking(&path);
            let _ = tx.send(LoadResult { source, result });
        }
    }

    fn apply_load(&mut self, load: LoadResult) -> Option<EngineEvent> {
        let zoom = self.viewport.zoom;
        let source = self.sources.get_mut(&load.source)?;
        match load.result {
            Ok(collection) => {
                info!(
                    source = %load.source,
                    features = collection.len(),
                    skipped = collection.skipped,
                    "source loaded"
                );
                let features = collection.len();
                source.features = collection.features;
                source.status = SourceStatus::Ready;
                source.clustered = None;
                source.recluster(zoom);
                Some(EngineEvent::SourceLoaded {
                    source: load.source,
                    features,
                })
            }
            Err(err) => {
                warn!(source = %load.source, "source failed to load: {err}");
                source.status = SourceStatus::Failed;
                Some(EngineEvent::SourceFailed {
                    source: load.source,
                    message: err.to_string(),
                })
            }
        }
    }
}

impl MapEngine for TerminalEngine {
    fn create(options: EngineOptions) -> Self {
        Self::new(options)
    }

    fn add_source(&mut self, id: &str, spec: SourceSpec) -> Result<(), EngineError> {
        self.ensure_alive()?;
        if self.sources.contains_key(id) {
            return Err(EngineError::DuplicateSource(id.to_string()));
        }

        let mut source = Source {
            features: Vec::new(),
            cluster: spec.cluster,
            status: SourceStatus::Ready,
            clustered: None,
        };
        match spec.data {
            SourceData::Inline(features) => {
                source.features = features;
                source.recluster(self.viewport.zoom);
            }
            SourceData::Path(path) => {
                debug!(source = id, path = %path.display(), "loading source");
                source.status = SourceStatus::Loading;
                self.spawn_load(id.to_string(), path);
            }
        }
        self.sources.insert(id.to_string(), source);
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn set_source_data(&mut self, id: &str, features: Vec<Feature>) -> Result<(), EngineError> {
        self.ensure_alive()?;
        let zoom = self.viewport.zoom;
        let source = self
            .sources
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownSource(id.to_string()))?;
        source.features = features;
        source.status = SourceStatus::Ready;
        source.clustered = None;
        source.recluster(zoom);
        Ok(())
    }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), EngineError> {
        self.ensure_alive()?;
        if self.has_layer(&layer.id) {
            return Err(EngineError::DuplicateLayer(layer.id));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(EngineError::UnknownSource(layer.source));
        }
        debug!(layer = %layer.id, "layer added");
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
        match property {
            PaintProperty::Color(rule) => layer.paint.color = rule,
            PaintProperty::Width(width) => {
                layer.paint.size = SizeRule::Fixed(width);
            }
        }
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
        Ok(())
    }

    fn layout_visibility(&self, layer_id: &str) -> Option<Visibility> {
        self.layers
            .iter()
            .find(|layer| layer.id == layer_id)
            .map(|layer| layer.layout.visibility)
    }

    fn query_rendered_features(&self, point: ScreenPoint, layers: &[&str]) -> Vec<RenderedFeature> {
        let mut hits = Vec::new();
        for layer in self.layers.iter().rev() {
            if !layers.contains(&layer.id.as_str()) || !self.layer_renders(layer) {
                continue;
            }
            let Some(source) = self.sources.get(&layer.source) else {
                continue;
            };
            hits.extend(
                source
                    .rendered()
                    .iter()
                    .filter(|f| layer.filter.matches(&f.properties) && self.hit(layer, f, point))
                    .map(|f| RenderedFeature {
                        layer_id: layer.id.clone(),
                        source_id: layer.source.clone(),
                        feature: f.clone(),
                    }),
            );
        }
        hits
    }

    fn project(&self, lng_lat: LngLat) -> ScreenPoint {
        self.viewport.project(lng_lat)
    }

    fn unproject(&self, point: ScreenPoint) -> LngLat {
        self.viewport.unproject(point)
    }

    fn set_double_click_zoom(&mut self, enabled: bool) {
        self.double_click_zoom = enabled;
    }

    fn double_click_zoom_enabled(&self) -> bool {
        self.double_click_zoom
    }

    fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
    }

    fn zoom_by(&mut self, delta: f64) {
        self.viewport.zoom_by(delta);
        self.after_camera_change();
    }

    fn zoom_at(&mut self, point: ScreenPoint, delta: f64) {
        self.viewport.zoom_at(point, delta);
        self.after_camera_change();
    }

    fn camera(&self) -> Camera {
        Camera {
            center: self.viewport.center,
            zoom: self.viewport.zoom,
        }
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
    }

    fn poll_events(&mut self) -> Vec<EngineEvent> {
        while let Ok(load) = self.load_rx.try_recv() {
            if self.removed {
                continue;
            }
            if let Some(event) = self.apply_load(load) {
                self.events.push_back(event);
            }
        }
        self.events.drain(..).collect()
    }

    fn remove(&mut self) {
        if self.removed {
            return;
        }
        debug!("map engine removed");
        self.removed = true;
        self.sources.clear();
        self.layers.clear();
        self.events.clear();
    }
}

/// Distance from `p` to the segment `a`..`b`.
fn segment_distance(p: ScreenPoint, a: ScreenPoint, b: ScreenPoint) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx.mul_add(dx, dy * dy);
    if length_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p.x - a.x).mul_add(dx, (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    p.distance(ScreenPoint::new(t.mul_add(dx, a.x), t.mul_add(dy, a.y)))
}
