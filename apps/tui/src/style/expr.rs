//! Pure attribute-to-paint functions. Every rule the layers use is defined
//! here so it can be evaluated and tested without an engine.

use super::palette::{
    Rgb, CAPACITY_LOW_BLUE, EHV_ORANGE, HV_GREEN, HV_HIGH_BLUE, OTHER_GRAY,
};
use crate::data::FeatureProperties;
use crate::domain::{ColorBy, VoltageTier};

pub const EHV_MIN_KV: f64 = 380.0;
pub const HV_HIGH_MIN_KV: f64 = 220.0;
pub const HV_MIN_KV: f64 = 110.0;

pub const CAPACITY_STOPS: [(f64, Rgb); 3] = [
    (0.0, CAPACITY_LOW_BLUE),
    (1000.0, HV_HIGH_BLUE),
    (2000.0, EHV_ORANGE),
];

/// Returns the output of the last threshold that does not exceed `input`,
/// or `default` when `input` is below every threshold. `stops` must be
/// sorted by threshold.
pub fn step<T: Copy>(input: f64, default: T, stops: &[(f64, T)]) -> T {
    stops
        .iter()
        .take_while(|(threshold, _)| input >= *threshold)
        .last()
        .map_or(default, |(_, output)| *output)
}

/// Linear interpolation between color stops, clamped at both ends.
pub fn interpolate(input: f64, stops: &[(f64, Rgb)]) -> Rgb {
    let Some(&(first_at, first)) = stops.first() else {
        return OTHER_GRAY;
    };
    if input.is_nan() || input <= first_at {
        return first;
    }

    for pair in stops.windows(2) {
        let (low_at, low) = pair[0];
        let (high_at, high) = pair[1];
        if input <= high_at {
            let span = high_at - low_at;
            let t = if span > 0.0 { (input - low_at) / span } else { 1.0 };
            return low.lerp(high, t);
        }
    }

    stops.last().map_or(first, |(_, color)| *color)
}

fn coalesce(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn voltage_tier(voltage_kv: Option<f64>) -> VoltageTier {
    step(
        coalesce(voltage_kv),
        VoltageTier::Other,
        &[
            (HV_MIN_KV, VoltageTier::Hv),
            (HV_HIGH_MIN_KV, VoltageTier::HvHigh),
            (EHV_MIN_KV, VoltageTier::Ehv),
        ],
    )
}

pub const fn tier_color(tier: VoltageTier) -> Rgb {
    match tier {
        VoltageTier::Ehv => EHV_ORANGE,
        VoltageTier::HvHigh => HV_HIGH_BLUE,
        VoltageTier::Hv => HV_GREEN,
        VoltageTier::Other => OTHER_GRAY,
    }
}

pub fn voltage_color(voltage_kv: Option<f64>) -> Rgb {
    tier_color(voltage_tier(voltage_kv))
}

pub fn capacity_color(capacity_mw: Option<f64>) -> Rgb {
    interpolate(coalesce(capacity_mw), &CAPACITY_STOPS)
}

pub fn line_color(color_by: ColorBy, props: &FeatureProperties) -> Rgb {
    match color_by {
        ColorBy::Voltage => voltage_color(props.number("voltage_kv")),
        ColorBy::Capacity => capacity_color(props.number("capacity_mw")),
    }
}

/// Substation marker radius in pixels.
pub fn substation_radius(voltage_kv: Option<f64>) -> f64 {
    step(
        coalesce(voltage_kv),
        3.0,
        &[(HV_MIN_KV, 4.0), (HV_HIGH_MIN_KV, 5.0), (EHV_MIN_KV, 7.0)],
    )
}

/// Cluster bubble radius in pixels.
pub fn cluster_radius(point_count: f64) -> f64 {
    step(point_count, 14.0, &[(50.0, 20.0), (200.0, 26.0)])
}

/// Short form of a cluster count: `999`, `1.2k`, `15k`.
pub fn abbreviate_count(count: usize) -> String {
    if count >= 10_000 {
        format!("{}k", (count as f64 / 1000.0).round())
    } else if count >= 1000 {
        let tenths = (count as f64 / 100.0).round() / 10.0;
        if tenths.fract() == 0.0 {
            format!("{tenths:.0}k")
        } else {
            format!("{tenths:.1}k")
        }
    } else {
        count.to_string()
    }
}
