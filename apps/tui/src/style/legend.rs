use super::palette::{
    Rgb, CAPACITY_LOW_BLUE, DRAWN_PURPLE, EHV_ORANGE, HV_GREEN, HV_HIGH_BLUE, OTHER_GRAY,
};
use crate::domain::{ColorBy, LayerKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendEntry {
    pub label: &'static str,
    pub color: Rgb,
}

const fn entry(label: &'static str, color: Rgb) -> LegendEntry {
    LegendEntry { label, color }
}

const VOLTAGE_LEGEND: [LegendEntry; 4] = [
    entry("380 kV+ (EHV)", EHV_ORANGE),
    entry("220–379 kV (HV)", HV_HIGH_BLUE),
    entry("110–219 kV (HV)", HV_GREEN),
    entry("Drawn", DRAWN_PURPLE),
];

const CAPACITY_LEGEND: [LegendEntry; 3] = [
    entry("High (≥2000 MW)", EHV_ORANGE),
    entry("Medium (1000 MW)", HV_HIGH_BLUE),
    entry("Low (0 MW)", CAPACITY_LOW_BLUE),
];

pub const fn legend_title(color_by: ColorBy) -> &'static str {
    match color_by {
        ColorBy::Voltage => "Voltage Legend",
        ColorBy::Capacity => "Capacity Legend",
    }
}

pub const fn legend_entries(color_by: ColorBy) -> &'static [LegendEntry] {
    match color_by {
        ColorBy::Voltage => &VOLTAGE_LEGEND,
        ColorBy::Capacity => &CAPACITY_LEGEND,
    }
}

/// Swatch shown next to a layer toggle.
pub const fn layer_swatch(key: LayerKey) -> Rgb {
    match key {
        LayerKey::Lines380kv => EHV_ORANGE,
        LayerKey::Lines220kv => HV_HIGH_BLUE,
        LayerKey::Lines110kv => HV_GREEN,
        LayerKey::Substations => OTHER_GRAY,
        LayerKey::DrawnFeatures => DRAWN_PURPLE,
    }
}
