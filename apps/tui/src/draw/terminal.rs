use super::styles::{DrawConfig, LineStyle, PointStyle};
use super::{
    ChangeEvent, ChangeKind, DrawError, DrawTool, DrawnFeature, DrawnGeometry, PointerEvent,
    ToolKey, ToolMode,
};
use crate::data::{Feature, FeatureProperties, Geometry};
use crate::domain::LngLat;
use crate::engine::viewport::Viewport;
use crate::engine::{MapEngine, ScreenPoint};
use crate::style::layers::{
    ColorRule, Filter, LayerKind, LayerSpec, Layout, Paint, SizeRule, SourceData, SourceSpec,
};
use crate::style::palette::DRAWN_PURPLE;
use tracing::{debug, warn};

pub const TOOL_SOURCE: &str = "td";
pub const LINE_LAYER: &str = "td-linestring";
pub const POINT_LAYER: &str = "td-point";
const LAYER_IDS: [&str; 2] = [LINE_LAYER, POINT_LAYER];

const KIND: &str = "td_kind";
const COLOR: &str = "td_color";
const WIDTH: &str = "td_width";
const ROLE: &str = "td_role";

/// Pointer precision is one terminal cell, two dots wide and four tall.
const CELL_SLACK_DOTS: f64 = 2.0;
const LINE_REACH_DOTS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Feature { id: u64, last: LngLat },
    Vertex { id: u64, index: usize },
}

/// Drawing tool rendered through the map engine's own layers.
///
/// Lines in progress live outside the feature store until they are
/// finished with at least two vertices, so they never show up in a
/// snapshot and cancelling one raises no change.
#[derive(Debug, Default)]
pub struct TerminalDraw {
    config: DrawConfig,
    started: bool,
    mode: ToolMode,
    features: Vec<DrawnFeature>,
    next_id: u64,
    drawing: Vec<LngLat>,
    cursor: Option<LngLat>,
    selected: Option<u64>,
    selected_vertex: Option<usize>,
    drag: Option<Drag>,
    changes: Vec<ChangeEvent>,
}

impl TerminalDraw {
    pub fn new(config: DrawConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub const fn selected(&self) -> Option<u64> {
        self.selected
    }

    pub const fn is_drawing(&self) -> bool {
        !self.drawing.is_empty()
    }

    fn vertex_reach(&self) -> f64 {
        Viewport::px_to_dots(self.config.styles.selection_point.width) + CELL_SLACK_DOTS
    }

    fn point_reach(&self) -> f64 {
        Viewport::px_to_dots(self.config.styles.point.width) + CELL_SLACK_DOTS
    }

    fn snap_reach(&self) -> f64 {
        Viewport::px_to_dots(self.config.snap_distance_px) + CELL_SLACK_DOTS
    }

    fn emit(&mut self, kind: ChangeKind, id: u64) {
        self.changes.push(ChangeEvent {
            ids: vec![id],
            kind,
        });
    }

    fn create(&mut self, geometry: DrawnGeometry) {
        let id = self.next_id;
        self.next_id += 1;
        self.features.push(DrawnFeature { id, geometry });
        self.emit(ChangeKind::Create, id);
    }

    fn feature(&self, id: u64) -> Option<&DrawnFeature> {
        self.features.iter().find(|f| f.id == id)
    }

    fn feature_mut(&mut self, id: u64) -> Option<&mut DrawnFeature> {
        self.features.iter_mut().find(|f| f.id == id)
    }

    fn selected_line(&self) -> Option<&[LngLat]> {
        match &self.feature(self.selected?)?.geometry {
            DrawnGeometry::LineString(coords) => Some(coords),
            DrawnGeometry::Point(_) => None,
        }
    }

    /// Topmost finished feature under `point`; points win over lines.
    fn feature_at(&self, engine: &dyn MapEngine, point: ScreenPoint) -> Option<u64> {
        let points = self.features.iter().rev().find(|f| match &f.geometry {
            DrawnGeometry::Point(at) => engine.project(*at).distance(point) <= self.point_reach(),
            DrawnGeometry::LineString(_) => false,
        });
        let lines = || {
            self.features.iter().rev().find(|f| match &f.geometry {
                DrawnGeometry::LineString(coords) => coords.windows(2).any(|pair| {
                    let (a, b) = (engine.project(pair[0]), engine.project(pair[1]));
                    segment_distance(point, a, b) <= LINE_REACH_DOTS
                }),
                DrawnGeometry::Point(_) => false,
            })
        };
        points.or_else(lines).map(|f| f.id)
    }

    fn nearest_within(
        engine: &dyn MapEngine,
        candidates: impl Iterator<Item = (usize, LngLat)>,
        point: ScreenPoint,
        reach: f64,
    ) -> Option<(usize, LngLat)> {
        candidates
            .map(|(index, at)| (index, at, engine.project(at).distance(point)))
            .filter(|(_, _, distance)| *distance <= reach)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(index, at, _)| (index, at))
    }

    fn vertex_at(&self, engine: &dyn MapEngine, point: ScreenPoint) -> Option<usize> {
        let coords = self.selected_line()?;
        Self::nearest_within(
            engine,
            coords.iter().copied().enumerate(),
            point,
            self.vertex_reach(),
        )
        .map(|(index, _)| index)
    }

    /// Index of the segment whose midpoint is under `point`.
    fn midpoint_at(&self, engine: &dyn MapEngine, point: ScreenPoint) -> Option<usize> {
        let coords = self.selected_line()?;
        let midpoints = coords
            .windows(2)
            .map(|pair| midpoint(pair[0], pair[1]))
            .enumerate();
        Self::nearest_within(engine, midpoints, point, self.vertex_reach()).map(|(index, _)| index)
    }

    /// Location for a new line vertex, pulled onto a nearby existing
    /// coordinate when snapping is on.
    fn snap(&self, engine: &dyn MapEngine, point: ScreenPoint) -> LngLat {
        let fallback = engine.unproject(point);
        if !self.config.snap_to_coordinates {
            return fallback;
        }
        let existing = self
            .features
            .iter()
            .flat_map(|f| match &f.geometry {
                DrawnGeometry::Point(at) => vec![*at],
                DrawnGeometry::LineString(coords) => coords.clone(),
            })
            .chain(self.drawing.iter().copied())
            .enumerate();
        Self::nearest_within(engine, existing, point, self.snap_reach())
            .map_or(fallback, |(_, at)| at)
    }

    fn finish_line(&mut self, engine: &mut dyn MapEngine) {
        let coords = std::mem::take(&mut self.drawing);
        self.cursor = None;
        if coords.len() >= 2 {
            debug!(vertices = coords.len(), "line finished");
            self.create(DrawnGeometry::LineString(coords));
        }
        self.render(engine);
    }

    fn clear_interaction(&mut self) {
        self.drawing.clear();
        self.cursor = None;
        self.selected = None;
        self.selected_vertex = None;
        self.drag = None;
    }

    fn delete_selected(&mut self, engine: &mut dyn MapEngine) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let deletable = match self.feature(id).map(|f| &f.geometry) {
            Some(DrawnGeometry::Point(_)) => self.config.flags.point.deletable,
            Some(DrawnGeometry::LineString(_)) => self.config.flags.line.deletable,
            None => false,
        };
        if !deletable {
            return false;
        }
        self.features.retain(|f| f.id != id);
        self.selected = None;
        self.selected_vertex = None;
        self.emit(ChangeKind::Delete, id);
        self.render(engine);
        true
    }

    /// Removes one vertex of the selected line as long as two remain.
    fn delete_vertex(&mut self, engine: &mut dyn MapEngine, index: usize) -> bool {
        let allowed = self
            .config
            .flags
            .line
            .coordinates
            .is_some_and(|flags| flags.deletable);
        let Some(id) = self.selected.filter(|_| allowed) else {
            return false;
        };
        let removed = match self.feature_mut(id).map(|f| &mut f.geometry) {
            Some(DrawnGeometry::LineString(coords)) if coords.len() > 2 && index < coords.len() => {
                coords.remove(index);
                true
            }
            _ => false,
        };
        if removed {
            self.selected_vertex = None;
            self.emit(ChangeKind::Update, id);
            self.render(engine);
        }
        removed
    }

    fn insert_midpoint(&mut self, engine: &mut dyn MapEngine, segment: usize) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let inserted = match self.feature_mut(id).map(|f| &mut f.geometry) {
            Some(DrawnGeometry::LineString(coords)) if segment + 1 < coords.len() => {
                let at = midpoint(coords[segment], coords[segment + 1]);
                coords.insert(segment + 1, at);
                true
            }
            _ => false,
        };
        if inserted {
            self.selected_vertex = Some(segment + 1);
            self.emit(ChangeKind::Update, id);
            self.render(engine);
        }
        inserted
    }

    fn apply_drag(&mut self, drag: Drag, to: LngLat) -> Drag {
        match drag {
            Drag::Vertex { id, index } => {
                if let Some(DrawnGeometry::LineString(coords)) =
                    self.feature_mut(id).map(|f| &mut f.geometry)
                {
                    if let Some(vertex) = coords.get_mut(index) {
                        *vertex = to;
                    }
                }
                drag
            }
            Drag::Feature { id, last } => {
                let (dlng, dlat) = (to.lng - last.lng, to.lat - last.lat);
                let shift = |at: &mut LngLat| {
                    at.lng += dlng;
                    at.lat += dlat;
                };
                match self.feature_mut(id).map(|f| &mut f.geometry) {
                    Some(DrawnGeometry::Point(at)) => shift(at),
                    Some(DrawnGeometry::LineString(coords)) => coords.iter_mut().for_each(shift),
                    None => {}
                }
                Drag::Feature { id, last: to }
            }
        }
    }

    fn drag_start(&mut self, engine: &mut dyn MapEngine, point: ScreenPoint) -> bool {
        let flags = self.config.flags;
        let vertex_drag = flags.line.coordinates.is_some_and(|c| c.draggable);
        if let (true, Some(id), Some(index)) =
            (vertex_drag, self.selected, self.vertex_at(engine, point))
        {
            self.drag = Some(Drag::Vertex { id, index });
            self.selected_vertex = Some(index);
            self.render(engine);
            return true;
        }

        let Some(id) = self.feature_at(engine, point) else {
            return false;
        };
        let draggable = match self.feature(id).map(|f| &f.geometry) {
            Some(DrawnGeometry::Point(_)) => flags.point.draggable,
            Some(DrawnGeometry::LineString(_)) => flags.line.draggable,
            None => false,
        };
        if !draggable {
            return false;
        }
        self.selected = Some(id);
        self.selected_vertex = None;
        self.drag = Some(Drag::Feature {
            id,
            last: engine.unproject(point),
        });
        self.render(engine);
        true
    }

    fn select_click(&mut self, engine: &mut dyn MapEngine, point: ScreenPoint) -> bool {
        if self.selected.is_some() {
            if let Some(index) = self.vertex_at(engine, point) {
                self.selected_vertex = Some(index);
                self.render(engine);
                return true;
            }
            let midpoints = self
                .config
                .flags
                .line
                .coordinates
                .is_some_and(|c| c.midpoints);
            if let Some(segment) = self.midpoint_at(engine, point).filter(|_| midpoints) {
                return self.insert_midpoint(engine, segment);
            }
        }

        match self.feature_at(engine, point) {
            Some(id) => {
                self.selected = Some(id);
                self.selected_vertex = None;
                self.render(engine);
                true
            }
            None => {
                if self.selected.take().is_some() {
                    self.selected_vertex = None;
                    self.render(engine);
                }
                false
            }
        }
    }

    fn line_click(&mut self, engine: &mut dyn MapEngine, point: ScreenPoint) -> bool {
        if let Some(&last) = self.drawing.last() {
            // Clicking the last vertex again finishes the line.
            if engine.project(last).distance(point) <= self.vertex_reach() {
                if self.drawing.len() >= 2 {
                    self.finish_line(engine);
                }
                return true;
            }
        }
        let at = self.snap(engine, point);
        self.drawing.push(at);
        self.render(engine);
        true
    }

    fn line_double_click(&mut self, engine: &mut dyn MapEngine, point: ScreenPoint) -> bool {
        if self.drawing.is_empty() {
            return true;
        }
        let near_last = self
            .drawing
            .last()
            .is_some_and(|last| engine.project(*last).distance(point) <= self.vertex_reach());
        if !near_last {
            let at = self.snap(engine, point);
            self.drawing.push(at);
        }
        if self.drawing.len() >= 2 {
            self.finish_line(engine);
        }
        true
    }

    fn render(&self, engine: &mut dyn MapEngine) {
        if !self.started {
            return;
        }
        if let Err(err) = engine.set_source_data(TOOL_SOURCE, self.render_features()) {
            warn!("drawing layer update failed: {err}");
        }
    }

    fn render_features(&self) -> Vec<Feature> {
        let styles = &self.config.styles;
        let show_midpoints = self
            .config
            .flags
            .line
            .coordinates
            .is_some_and(|c| c.midpoints);
        let mut lines = Vec::new();
        let mut points = Vec::new();

        for feature in &self.features {
            let selected = self.selected == Some(feature.id);
            match &feature.geometry {
                DrawnGeometry::Point(at) => {
                    let style = if selected {
                        styles.selected_point
                    } else {
                        styles.point
                    };
                    push_point(&mut points, *at, style, "feature");
                }
                DrawnGeometry::LineString(coords) => {
                    let style = if selected {
                        styles.selected_line
                    } else {
                        styles.line
                    };
                    lines.push(line_feature(coords.clone(), style));
                    if !selected {
                        continue;
                    }
                    if show_midpoints {
                        for pair in coords.windows(2) {
                            let at = midpoint(pair[0], pair[1]);
                            push_point(&mut points, at, styles.mid_point, "midpoint");
                        }
                    }
                    for (index, vertex) in coords.iter().enumerate() {
                        let style = if self.selected_vertex == Some(index) {
                            styles.selected_point
                        } else {
                            styles.selection_point
                        };
                        push_point(&mut points, *vertex, style, "selection");
                    }
                }
            }
        }

        if !self.drawing.is_empty() {
            let mut preview = self.drawing.clone();
            preview.extend(self.cursor);
            if preview.len() >= 2 {
                lines.push(line_feature(preview, styles.line));
            }
            let last = self.drawing.len().saturating_sub(1);
            for (index, vertex) in self.drawing.iter().enumerate() {
                if index == last && self.drawing.len() >= 2 {
                    push_point(&mut points, *vertex, styles.closing_point, "closing");
                } else {
                    push_point(&mut points, *vertex, styles.coordinate_point, "coordinate");
                }
            }
        }

        lines.extend(points);
        lines
    }
}

fn midpoint(a: LngLat, b: LngLat) -> LngLat {
    LngLat::new((a.lng + b.lng) / 2.0, (a.lat + b.lat) / 2.0)
}

fn segment_distance(p: ScreenPoint, a: ScreenPoint, b: ScreenPoint) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx.mul_add(dx, dy * dy);
    if length_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p.x - a.x).mul_add(dx, (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    p.distance(ScreenPoint::new(t.mul_add(dx, a.x), t.mul_add(dy, a.y)))
}

fn styled(kind: &str, role: &str, color: String, width: f64) -> FeatureProperties {
    let mut props = FeatureProperties::default();
    props.insert(KIND, kind);
    props.insert(ROLE, role);
    props.insert(COLOR, color);
    props.insert(WIDTH, width);
    props
}

fn line_feature(coords: Vec<LngLat>, style: LineStyle) -> Feature {
    Feature::new(
        Geometry::LineString(coords),
        styled("line", "feature", style.color.to_string(), style.width),
    )
}

/// Pushes the outline disc, then the fill on top of it.
fn push_point(out: &mut Vec<Feature>, at: LngLat, style: PointStyle, role: &str) {
    if style.outline_width > 0.0 {
        out.push(Feature::new(
            Geometry::Point(at),
            styled(
                "point",
                "outline",
                style.outline_color.to_string(),
                style.width + style.outline_width,
            ),
        ));
    }
    out.push(Feature::new(
        Geometry::Point(at),
        styled("point", role, style.color.to_string(), style.width),
    ));
}

fn tool_layers() -> Vec<LayerSpec> {
    let layer = |id: &str, kind: LayerKind, geometry: &str, fallback_width: f64| LayerSpec {
        id: id.to_string(),
        kind,
        source: TOOL_SOURCE.to_string(),
        min_zoom: None,
        filter: Filter::eq(KIND, geometry),
        paint: Paint {
            color: ColorRule::Property {
                key: COLOR.to_string(),
                fallback: DRAWN_PURPLE,
            },
            size: SizeRule::Property {
                key: WIDTH.to_string(),
                fallback: fallback_width,
            },
            opacity: 1.0,
        },
        layout: Layout::default(),
    };
    vec![
        layer(LINE_LAYER, LayerKind::Line, "line", 2.0),
        layer(POINT_LAYER, LayerKind::Circle, "point", 8.0),
    ]
}

impl DrawTool for TerminalDraw {
    fn start(&mut self, engine: &mut dyn MapEngine) -> Result<(), DrawError> {
        if self.started {
            return Ok(());
        }
        if !engine.has_source(TOOL_SOURCE) {
            engine.add_source(
                TOOL_SOURCE,
                SourceSpec {
                    data: SourceData::Inline(Vec::new()),
                    cluster: None,
                },
            )?;
        }
        for layer in tool_layers() {
            if !engine.has_layer(&layer.id) {
                engine.add_layer(layer)?;
            }
        }
        self.started = true;
        debug!("drawing tool started");
        self.render(engine);
        Ok(())
    }

    fn stop(&mut self, engine: &mut dyn MapEngine) {
        if !self.started {
            debug!("drawing tool stop skipped, never started");
            return;
        }
        self.clear_interaction();
        self.features.clear();
        self.changes.clear();
        if let Err(err) = engine.set_source_data(TOOL_SOURCE, Vec::new()) {
            debug!("drawing layers already gone: {err}");
        }
        self.started = false;
        self.mode = ToolMode::Static;
        debug!("drawing tool stopped");
    }

    fn enabled(&self) -> bool {
        self.started
    }

    fn set_mode(&mut self, engine: &mut dyn MapEngine, mode: ToolMode) -> Result<(), DrawError> {
        if !self.started {
            return Err(DrawError::NotStarted);
        }
        if mode != self.mode {
            debug!(from = self.mode.as_str(), to = mode.as_str(), "draw mode changed");
            self.clear_interaction();
            self.mode = mode;
            self.render(engine);
        }
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
        if !self.started {
            return false;
        }
        match (self.mode, event) {
            (ToolMode::Static, _) => false,

            (ToolMode::Point, PointerEvent::Click(point)) => {
                let at = engine.unproject(point);
                self.create(DrawnGeometry::Point(at));
                self.render(engine);
                true
            }
            (ToolMode::Point, PointerEvent::DoubleClick(_)) => true,

            (ToolMode::LineString, PointerEvent::Click(point)) => self.line_click(engine, point),
            (ToolMode::LineString, PointerEvent::DoubleClick(point)) => {
                self.line_double_click(engine, point)
            }
            (ToolMode::LineString, PointerEvent::Move(point)) => {
                if !self.drawing.is_empty() {
                    self.cursor = Some(engine.unproject(point));
                    self.render(engine);
                }
                false
            }

            (ToolMode::Select, PointerEvent::Click(point)) => self.select_click(engine, point),
            (ToolMode::Select, PointerEvent::RightClick(point)) => {
                match self.vertex_at(engine, point) {
                    Some(index) => self.delete_vertex(engine, index),
                    None => false,
                }
            }
            (ToolMode::Select, PointerEvent::DragStart(point)) => self.drag_start(engine, point),
            (ToolMode::Select, PointerEvent::Drag(point)) => match self.drag {
                Some(drag) => {
                    self.drag = Some(self.apply_drag(drag, engine.unproject(point)));
                    self.render(engine);
                    true
                }
                None => false,
            },
            (ToolMode::Select, PointerEvent::DragEnd(point)) => match self.drag.take() {
                Some(drag) => {
                    let (Drag::Feature { id, .. } | Drag::Vertex { id, .. }) =
                        self.apply_drag(drag, engine.unproject(point));
                    self.emit(ChangeKind::Update, id);
                    self.render(engine);
                    true
                }
                None => false,
            },

            _ => false,
        }
    }

    fn handle_key(&mut self, engine: &mut dyn MapEngine, key: ToolKey) -> bool {
        if !self.started {
            return false;
        }
        match (self.mode, key) {
            (ToolMode::LineString, ToolKey::Cancel) if !self.drawing.is_empty() => {
                debug!("line cancelled");
                self.drawing.clear();
                self.cursor = None;
                self.render(engine);
                true
            }
            (ToolMode::Select, ToolKey::Cancel) if self.selected.is_some() => {
                self.selected = None;
                self.selected_vertex = None;
                self.render(engine);
                true
            }
            (ToolMode::Select, ToolKey::DeleteSelected) => self.delete_selected(engine),
            (ToolMode::Select, ToolKey::DeleteVertex) => match self.selected_vertex {
                Some(index) => self.delete_vertex(engine, index),
                None => false,
            },
            _ => false,
        }
    }

    fn layer_ids(&self) -> &'static [&'static str] {
        &LAYER_IDS
    }
}
