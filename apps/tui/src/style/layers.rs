//! Declarative source and layer configuration for the grid map.

use super::expr::{
    abbreviate_count, capacity_color, cluster_radius, substation_radius, voltage_color,
    EHV_MIN_KV, HV_HIGH_MIN_KV, HV_MIN_KV,
};
use super::palette::{Rgb, CLUSTER_FILL, EHV_ORANGE, HV_GREEN, HV_HIGH_BLUE, LABEL_TEXT};
use crate::data::{Feature, FeatureProperties};
use crate::domain::{ColorBy, LayerKey};
use std::path::PathBuf;

pub const SOURCE_LINES: &str = "transmission-lines";
pub const SOURCE_SUBSTATIONS: &str = "substations";

pub const LINES_380KV: &str = "lines-380kv";
pub const LINES_220KV: &str = "lines-220kv";
pub const LINES_110KV: &str = "lines-110kv";
pub const SUBSTATIONS_CLUSTERS: &str = "substations-clusters";
pub const SUBSTATIONS_CLUSTER_COUNT: &str = "substations-cluster-count";
pub const SUBSTATIONS_CIRCLES: &str = "substations-circles";
pub const SUBSTATIONS_LABELS: &str = "substations-labels";

pub const LINE_LAYER_IDS: [&str; 3] = [LINES_380KV, LINES_220KV, LINES_110KV];

pub const CLUSTER_MAX_ZOOM: f64 = 7.0;
pub const CLUSTER_RADIUS_PX: f64 = 40.0;

/// Property the engine sets on synthesized cluster features.
pub const POINT_COUNT: &str = "point_count";

/// Engine layer ids driven by one visibility key. Drawn features have no
/// fixed ids; their layers belong to the drawing tool.
pub const fn layer_ids(key: LayerKey) -> &'static [&'static str] {
    match key {
        LayerKey::Lines380kv => &[LINES_380KV],
        LayerKey::Lines220kv => &[LINES_220KV],
        LayerKey::Lines110kv => &[LINES_110KV],
        LayerKey::Substations => &[
            SUBSTATIONS_CLUSTERS,
            SUBSTATIONS_CLUSTER_COUNT,
            SUBSTATIONS_CIRCLES,
            SUBSTATIONS_LABELS,
        ],
        LayerKey::DrawnFeatures => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Line,
    Circle,
    Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    None,
}

impl Visibility {
    pub const fn from_flag(visible: bool) -> Self {
        if visible {
            Self::Visible
        } else {
            Self::None
        }
    }

    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    pub max_zoom: f64,
    pub radius_px: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceData {
    /// Fetched by the engine after registration.
    Path(PathBuf),
    Inline(Vec<Feature>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpec {
    pub data: SourceData,
    pub cluster: Option<ClusterOptions>,
}

/// Boolean predicate over feature properties. Voltage comparisons read a
/// missing voltage as 0.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Always,
    VoltageAtLeast(f64),
    VoltageBelow(f64),
    Has(String),
    Eq(String, String),
    Not(Box<Filter>),
    All(Vec<Filter>),
    Any(Vec<Filter>),
}

impl Filter {
    pub fn voltage_range(min_kv: f64, max_kv: Option<f64>) -> Self {
        match max_kv {
            Some(max_kv) => Self::All(vec![
                Self::VoltageAtLeast(min_kv),
                Self::VoltageBelow(max_kv),
            ]),
            None => Self::VoltageAtLeast(min_kv),
        }
    }

    pub fn is_cluster() -> Self {
        Self::Has(POINT_COUNT.to_string())
    }

    pub fn not_cluster() -> Self {
        Self::Not(Box::new(Self::is_cluster()))
    }

    pub fn eq(key: &str, value: &str) -> Self {
        Self::Eq(key.to_string(), value.to_string())
    }

    pub fn matches(&self, props: &FeatureProperties) -> bool {
        match self {
            Self::Always => true,
            Self::VoltageAtLeast(kv) => props.voltage_kv() >= *kv,
            Self::VoltageBelow(kv) => props.voltage_kv() < *kv,
            Self::Has(key) => props.has(key),
            Self::Eq(key, value) => props.text(key).as_deref() == Some(value.as_str()),
            Self::Not(inner) => !inner.matches(props),
            Self::All(filters) => filters.iter().all(|f| f.matches(props)),
            Self::Any(filters) => filters.iter().any(|f| f.matches(props)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColorRule {
    Fixed(Rgb),
    VoltageStep,
    CapacityRamp,
    /// Hex color read from a feature property.
    Property { key: String, fallback: Rgb },
}

impl ColorRule {
    pub const fn for_color_by(color_by: ColorBy) -> Self {
        match color_by {
            ColorBy::Voltage => Self::VoltageStep,
            ColorBy::Capacity => Self::CapacityRamp,
        }
    }

    pub fn evaluate(&self, props: &FeatureProperties) -> Rgb {
        match self {
            Self::Fixed(color) => *color,
            Self::VoltageStep => voltage_color(props.number("voltage_kv")),
            Self::CapacityRamp => capacity_color(props.number("capacity_mw")),
            Self::Property { key, fallback } => props
                .text(key)
                .and_then(|hex| Rgb::from_hex(&hex))
                .unwrap_or(*fallback),
        }
    }
}

/// Line width or circle radius, in pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum SizeRule {
    Fixed(f64),
    SubstationVoltageStep,
    ClusterCountStep,
    Property { key: String, fallback: f64 },
}

impl SizeRule {
    pub fn evaluate(&self, props: &FeatureProperties) -> f64 {
        match self {
            Self::Fixed(size) => *size,
            Self::SubstationVoltageStep => substation_radius(props.number("voltage_kv")),
            Self::ClusterCountStep => cluster_radius(props.number(POINT_COUNT).unwrap_or(0.0)),
            Self::Property { key, fallback } => props.number(key).unwrap_or(*fallback),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextRule {
    Property(String),
    AbbreviatedPointCount,
}

impl TextRule {
    pub fn evaluate(&self, props: &FeatureProperties) -> String {
        match self {
            Self::Property(key) => props.text_or_default(key),
            Self::AbbreviatedPointCount => {
                abbreviate_count(props.number(POINT_COUNT).unwrap_or(0.0) as usize)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: ColorRule,
    pub size: SizeRule,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Center,
    /// Text hangs below the anchor point.
    Top,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub visibility: Visibility,
    pub text: Option<TextRule>,
    pub anchor: TextAnchor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub kind: LayerKind,
    pub source: String,
    pub min_zoom: Option<f64>,
    pub filter: Filter,
    pub paint: Paint,
    pub layout: Layout,
}

/// Paint mutations the map adapter issues after registration.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintProperty {
    Color(ColorRule),
    Width(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutProperty {
    Visibility(Visibility),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    pub lines: PathBuf,
    pub substations: PathBuf,
}

pub fn grid_sources(paths: &DataPaths) -> Vec<(String, SourceSpec)> {
    vec![
        (
            SOURCE_LINES.to_string(),
            SourceSpec {
                data: SourceData::Path(paths.lines.clone()),
                cluster: None,
            },
        ),
        (
            SOURCE_SUBSTATIONS.to_string(),
            SourceSpec {
                data: SourceData::Path(paths.substations.clone()),
                cluster: Some(ClusterOptions {
                    max_zoom: CLUSTER_MAX_ZOOM,
                    radius_px: CLUSTER_RADIUS_PX,
                }),
            },
        ),
    ]
}

fn line_layer(id: &str, min_zoom: f64, filter: Filter, color: Rgb, width: f64, opacity: f64) -> LayerSpec {
    LayerSpec {
        id: id.to_string(),
        kind: LayerKind::Line,
        source: SOURCE_LINES.to_string(),
        min_zoom: Some(min_zoom),
        filter,
        paint: Paint {
            color: ColorRule::Fixed(color),
            size: SizeRule::Fixed(width),
            opacity,
        },
        layout: Layout::default(),
    }
}

fn unclustered_hv() -> Filter {
    Filter::All(vec![Filter::not_cluster(), Filter::VoltageAtLeast(HV_MIN_KV)])
}

/// Every grid layer in draw order. Line tiers start with fixed colors; the
/// style sync replaces them with the active color-by rule.
pub fn grid_layers() -> Vec<LayerSpec> {
    vec![
        line_layer(
            LINES_380KV,
            3.0,
            Filter::voltage_range(EHV_MIN_KV, None),
            EHV_ORANGE,
            2.5,
            0.9,
        ),
        line_layer(
            LINES_220KV,
            5.0,
            Filter::voltage_range(HV_HIGH_MIN_KV, Some(EHV_MIN_KV)),
            HV_HIGH_BLUE,
            2.0,
            0.85,
        ),
        line_layer(
            LINES_110KV,
            7.0,
            Filter::voltage_range(HV_MIN_KV, Some(HV_HIGH_MIN_KV)),
            HV_GREEN,
            1.5,
            0.8,
        ),
        LayerSpec {
            id: SUBSTATIONS_CLUSTERS.to_string(),
            kind: LayerKind::Circle,
            source: SOURCE_SUBSTATIONS.to_string(),
            min_zoom: None,
            filter: Filter::is_cluster(),
            paint: Paint {
                color: ColorRule::Fixed(CLUSTER_FILL),
                size: SizeRule::ClusterCountStep,
                opacity: 0.85,
            },
            layout: Layout::default(),
        },
        LayerSpec {
            id: SUBSTATIONS_CLUSTER_COUNT.to_string(),
            kind: LayerKind::Symbol,
            source: SOURCE_SUBSTATIONS.to_string(),
            min_zoom: None,
            filter: Filter::is_cluster(),
            paint: Paint {
                color: ColorRule::Fixed(LABEL_TEXT),
                size: SizeRule::Fixed(11.0),
                opacity: 1.0,
            },
            layout: Layout {
                visibility: Visibility::Visible,
                text: Some(TextRule::AbbreviatedPointCount),
                anchor: TextAnchor::Center,
            },
        },
        LayerSpec {
            id: SUBSTATIONS_CIRCLES.to_string(),
            kind: LayerKind::Circle,
            source: SOURCE_SUBSTATIONS.to_string(),
            min_zoom: None,
            filter: unclustered_hv(),
            paint: Paint {
                color: ColorRule::VoltageStep,
                size: SizeRule::SubstationVoltageStep,
                opacity: 0.95,
            },
            layout: Layout::default(),
        },
        LayerSpec {
            id: SUBSTATIONS_LABELS.to_string(),
            kind: LayerKind::Symbol,
            source: SOURCE_SUBSTATIONS.to_string(),
            min_zoom: None,
            filter: unclustered_hv(),
            paint: Paint {
                color: ColorRule::Fixed(LABEL_TEXT),
                size: SizeRule::Fixed(11.0),
                opacity: 1.0,
            },
            layout: Layout {
                visibility: Visibility::None,
                text: Some(TextRule::Property("name".to_string())),
                anchor: TextAnchor::Top,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: serde_json::Value) -> FeatureProperties {
        FeatureProperties::new(value.as_object().cloned().unwrap_or_default())
    }

    fn layer(id: &str) -> Option<LayerSpec> {
        grid_layers().into_iter().find(|layer| layer.id == id)
    }

    #[test]
    fn tier_filters_partition_rendered_voltages() {
        let layers = [LINES_380KV, LINES_220KV, LINES_110KV]
            .iter()
            .filter_map(|id| layer(id))
            .collect::<Vec<_>>();
        assert_eq!(layers.len(), 3);

        for kv in [0.0, 50.0, 109.0, 110.0, 150.0, 219.9, 220.0, 300.0, 380.0, 750.0] {
            let p = props(json!({ "voltage_kv": kv }));
            let hits = layers.iter().filter(|l| l.filter.matches(&p)).count();
            let expected = usize::from(kv >= 110.0);
            assert_eq!(hits, expected, "voltage {kv} matched {hits} tiers");
        }
    }

    #[test]
    fn missing_voltage_is_never_rendered() {
        let p = props(json!({ "name": "mystery" }));
        for id in [LINES_380KV, LINES_220KV, LINES_110KV, SUBSTATIONS_CIRCLES] {
            assert!(!layer(id).is_some_and(|l| l.filter.matches(&p)), "{id}");
        }
    }

    #[test]
    fn clusters_and_points_are_disjoint() {
        let cluster = props(json!({ "point_count": 12, "voltage_kv": 380 }));
        let point = props(json!({ "voltage_kv": 380 }));
        let clusters = layer(SUBSTATIONS_CLUSTERS).map(|l| l.filter);
        let circles = layer(SUBSTATIONS_CIRCLES).map(|l| l.filter);

        assert!(clusters.as_ref().is_some_and(|f| f.matches(&cluster)));
        assert!(!clusters.as_ref().is_some_and(|f| f.matches(&point)));
        assert!(circles.as_ref().is_some_and(|f| f.matches(&point)));
        assert!(!circles.as_ref().is_some_and(|f| f.matches(&cluster)));
    }

    #[test]
    fn labels_start_hidden() {
        let labels = layer(SUBSTATIONS_LABELS).map(|l| l.layout.visibility);
        assert_eq!(labels, Some(Visibility::None));
    }

    #[test]
    fn min_zooms_follow_tier_scale() {
        let zooms = LINE_LAYER_IDS
            .iter()
            .map(|id| layer(id).and_then(|l| l.min_zoom))
            .collect::<Vec<_>>();
        assert_eq!(zooms, vec![Some(3.0), Some(5.0), Some(7.0)]);
    }

    #[test]
    fn substation_key_drives_all_substation_layers() {
        assert_eq!(layer_ids(LayerKey::Substations).len(), 4);
        assert!(layer_ids(LayerKey::DrawnFeatures).is_empty());
    }

    #[test]
    fn property_color_falls_back() {
        let rule = ColorRule::Property {
            key: "color".to_string(),
            fallback: HV_GREEN,
        };
        assert_eq!(rule.evaluate(&props(json!({ "color": "#f97316" }))), EHV_ORANGE);
        assert_eq!(rule.evaluate(&props(json!({ "color": "nope" }))), HV_GREEN);
    }
}
