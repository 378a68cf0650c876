use serde::Serialize;

/// Voltage band a feature falls into. `Other` covers everything below 110 kV,
/// including features with no voltage at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoltageTier {
    Ehv,
    HvHigh,
    Hv,
    Other,
}

impl VoltageTier {
    pub const ALL: [Self; 4] = [Self::Ehv, Self::HvHigh, Self::Hv, Self::Other];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ehv => "EHV",
            Self::HvHigh => "HV-high",
            Self::Hv => "HV",
            Self::Other => "other",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ehv => "380 kV+",
            Self::HvHigh => "220-379 kV",
            Self::Hv => "110-219 kV",
            Self::Other => "< 110 kV",
        }
    }

    /// Tiers below 110 kV are never drawn.
    pub const fn is_rendered(self) -> bool {
        !matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBy {
    #[default]
    Voltage,
    Capacity,
}

impl ColorBy {
    pub const ALL: [Self; 2] = [Self::Voltage, Self::Capacity];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Voltage => "voltage",
            Self::Capacity => "capacity",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Voltage => "Voltage (kV)",
            Self::Capacity => "Capacity (MW)",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Voltage => Self::Capacity,
            Self::Capacity => Self::Voltage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    #[default]
    Pan,
    LineString,
    Point,
    Select,
}

impl DrawMode {
    pub const ALL: [Self; 4] = [Self::Pan, Self::LineString, Self::Point, Self::Select];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::LineString => "linestring",
            Self::Point => "point",
            Self::Select => "select",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Pan),
            1 => Some(Self::LineString),
            2 => Some(Self::Point),
            3 => Some(Self::Select),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pan => "Pan",
            Self::LineString => "Draw Line",
            Self::Point => "Draw Substation",
            Self::Select => "Select",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Pan => "Navigate the map",
            Self::LineString => "Draw transmission lines",
            Self::Point => "Place substation nodes",
            Self::Select => "Select & edit features",
        }
    }

    /// Modes whose finish gesture collides with the engine's double-click zoom.
    pub const fn is_placing(self) -> bool {
        matches!(self, Self::LineString | Self::Point)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidebarTab {
    #[default]
    Layers,
    Style,
    Draw,
}

impl SidebarTab {
    pub const ALL: [Self; 3] = [Self::Layers, Self::Style, Self::Draw];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Layers => "Layers",
            Self::Style => "Style",
            Self::Draw => "Draw",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Layers => 0,
            Self::Style => 1,
            Self::Draw => 2,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Layers),
            1 => Some(Self::Style),
            2 => Some(Self::Draw),
            _ => None,
        }
    }
}

/// The fixed set of independently toggleable layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKey {
    Lines380kv,
    Lines220kv,
    Lines110kv,
    Substations,
    DrawnFeatures,
}

impl LayerKey {
    pub const ALL: [Self; 5] = [
        Self::Lines380kv,
        Self::Lines220kv,
        Self::Lines110kv,
        Self::Substations,
        Self::DrawnFeatures,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Lines380kv => "380 kV Lines",
            Self::Lines220kv => "220 kV Lines",
            Self::Lines110kv => "110 kV Lines",
            Self::Substations => "Substations",
            Self::DrawnFeatures => "Drawn Features",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Lines380kv),
            1 => Some(Self::Lines220kv),
            2 => Some(Self::Lines110kv),
            3 => Some(Self::Substations),
            4 => Some(Self::DrawnFeatures),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Substation,
    Line,
}

impl FeatureKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Substation => "Substation",
            Self::Line => "Transmission Line",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SubstationProperties {
    pub id: String,
    pub name: String,
    pub voltage_kv: f64,
    pub country: Option<String>,
    pub operator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TransmissionLineProperties {
    pub id: String,
    pub name: Option<String>,
    pub voltage_kv: f64,
    pub capacity_mw: Option<f64>,
    pub country: Option<String>,
    pub length_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "feature_type", content = "properties", rename_all = "lowercase")]
pub enum PopupProperties {
    Substation(SubstationProperties),
    Line(TransmissionLineProperties),
}

impl PopupProperties {
    pub const fn kind(&self) -> FeatureKind {
        match self {
            Self::Substation(_) => FeatureKind::Substation,
            Self::Line(_) => FeatureKind::Line,
        }
    }

    pub const fn voltage_kv(&self) -> f64 {
        match self {
            Self::Substation(props) => props.voltage_kv,
            Self::Line(props) => props.voltage_kv,
        }
    }
}

/// A single open info panel bound to one clicked feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupInfo {
    pub lng_lat: LngLat,
    pub properties: PopupProperties,
}

impl PopupInfo {
    pub const fn kind(&self) -> FeatureKind {
        self.properties.kind()
    }
}
