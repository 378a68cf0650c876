//! Network statistics for the headless mode.

use crate::data::{load_feature_collection_blocking, DataError, FeatureCollection};
use crate::domain::VoltageTier;
use crate::style::layers::DataPaths;
use crate::style::voltage_tier;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSummary {
    pub tier: VoltageTier,
    pub label: &'static str,
    pub lines: usize,
    pub line_km: f64,
    pub substations: usize,
}

impl TierSummary {
    const fn empty(tier: VoltageTier) -> Self {
        Self {
            tier,
            label: tier.label(),
            lines: 0,
            line_km: 0.0,
            substations: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSummary {
    /// Rendered tiers, highest voltage first.
    pub tiers: Vec<TierSummary>,
    /// Lines below 110 kV, which the map never draws.
    pub excluded_lines: usize,
    pub excluded_substations: usize,
    pub countries: usize,
    /// Features dropped while parsing for unsupported geometry.
    pub skipped: usize,
}

impl GridSummary {
    pub fn total_lines(&self) -> usize {
        self.tiers.iter().map(|tier| tier.lines).sum()
    }

    pub fn total_substations(&self) -> usize {
        self.tiers.iter().map(|tier| tier.substations).sum()
    }
}

pub fn summarize(lines: &FeatureCollection, substations: &FeatureCollection) -> GridSummary {
    let mut tiers: Vec<TierSummary> = VoltageTier::ALL
        .into_iter()
        .filter(|tier| tier.is_rendered())
        .map(TierSummary::empty)
        .collect();
    let mut excluded_lines = 0;
    let mut excluded_substations = 0;
    let mut countries = BTreeSet::new();

    for feature in lines.features.iter().filter(|f| !f.geometry.is_point()) {
        let tier = voltage_tier(feature.properties.number("voltage_kv"));
        match tiers.iter_mut().find(|summary| summary.tier == tier) {
            Some(summary) => {
                summary.lines += 1;
                summary.line_km += feature.length_km();
            }
            None => excluded_lines += 1,
        }
        countries.extend(feature.properties.non_empty_text("country"));
    }

    for feature in substations.features.iter().filter(|f| f.geometry.is_point()) {
        let tier = voltage_tier(feature.properties.number("voltage_kv"));
        match tiers.iter_mut().find(|summary| summary.tier == tier) {
            Some(summary) => summary.substations += 1,
            None => excluded_substations += 1,
        }
        countries.extend(feature.properties.non_empty_text("country"));
    }

    GridSummary {
        tiers,
        excluded_lines,
        excluded_substations,
        countries: countries.len(),
        skipped: lines.skipped + substations.skipped,
    }
}

/// Loads both data files and summarizes them.
pub fn load_summary(paths: &DataPaths) -> Result<GridSummary, DataError> {
    let lines = load_feature_collection_blocking(&paths.lines)?;
    let substations = load_feature_collection_blocking(&paths.substations)?;
    Ok(summarize(&lines, &substations))
}

impl fmt::Display for GridSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "European HV Grid")?;
        writeln!(f, "================")?;
        writeln!(f, "Transmission lines: {}", self.total_lines())?;
        writeln!(f, "Substations: {}", self.total_substations())?;
        writeln!(f, "Countries: {}", self.countries)?;
        writeln!(f)?;
        writeln!(f, "By voltage tier:")?;
        for tier in &self.tiers {
            writeln!(
                f,
                "- {}: {} lines, {:.1} km, {} substations",
                tier.label, tier.lines, tier.line_km, tier.substations
            )?;
        }
        writeln!(f)?;
        write!(
            f,
            "Below 110 kV (not shown): {} lines, {} substations",
            self.excluded_lines, self.excluded_substations
        )?;
        if self.skipped > 0 {
            write!(f, "\nSkipped (unsupported geometry): {}", self.skipped)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LINES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature",
              "properties": { "voltage_kv": 380, "country": "DE", "length_km": 100 },
              "geometry": { "type": "LineString", "coordinates": [[10, 50], [11, 50]] } },
            { "type": "Feature",
              "properties": { "voltage_kv": "220", "country": "FR" },
              "geometry": { "type": "LineString", "coordinates": [[2, 48], [2, 49]] } },
            { "type": "Feature",
              "properties": { "voltage_kv": 63, "country": "FR" },
              "geometry": { "type": "LineString", "coordinates": [[2, 48], [3, 48]] } },
            { "type": "Feature",
              "properties": {},
              "geometry": { "type": "Polygon", "coordinates": [] } }
        ]
    }"#;

    const SUBSTATIONS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature",
              "properties": { "voltage_kv": 400, "country": "DE" },
              "geometry": { "type": "Point", "coordinates": [10, 50] } },
            { "type": "Feature",
              "properties": { "voltage_kv": 110, "country": "PL" },
              "geometry": { "type": "Point", "coordinates": [20, 52] } },
            { "type": "Feature",
              "properties": { "name": "unknown" },
              "geometry": { "type": "Point", "coordinates": [5, 45] } }
        ]
    }"#;

    fn summary() -> Result<GridSummary, DataError> {
        let lines = FeatureCollection::from_json_str(LINES)?;
        let substations = FeatureCollection::from_json_str(SUBSTATIONS)?;
        Ok(summarize(&lines, &substations))
    }

    #[test]
    fn counts_each_rendered_tier() -> Result<(), DataError> {
        let summary = summary()?;
        let tiers: Vec<_> = summary
            .tiers
            .iter()
            .map(|t| (t.tier, t.lines, t.substations))
            .collect();
        assert_eq!(
            tiers,
            vec![
                (VoltageTier::Ehv, 1, 1),
                (VoltageTier::HvHigh, 1, 0),
                (VoltageTier::Hv, 0, 1),
            ]
        );
        assert_eq!(summary.excluded_lines, 1);
        assert_eq!(summary.excluded_substations, 1);
        assert_eq!(summary.countries, 3);
        assert_eq!(summary.skipped, 1);
        Ok(())
    }

    #[test]
    fn uses_recorded_length_and_measures_the_rest() -> Result<(), DataError> {
        let summary = summary()?;
        assert!((summary.tiers[0].line_km - 100.0).abs() < f64::EPSILON);
        assert!((summary.tiers[1].line_km - 111.2).abs() < 0.5);
        Ok(())
    }

    #[test]
    fn text_report_lists_tiers_and_exclusions() -> Result<(), DataError> {
        let text = summary()?.to_string();
        assert!(text.contains("Transmission lines: 2"));
        assert!(text.contains("- 380 kV+: 1 lines, 100.0 km, 1 substations"));
        assert!(text.contains("Below 110 kV (not shown): 1 lines, 1 substations"));
        assert!(text.contains("Skipped (unsupported geometry): 1"));
        Ok(())
    }

    #[test]
    fn json_report_uses_tier_names() -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_value(summary()?)?;
        assert_eq!(json["tiers"][0]["tier"], "ehv");
        assert_eq!(json["countries"], 3);
        Ok(())
    }

    #[test]
    fn loads_from_disk() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let lines = dir.path().join("lines.geojson");
        let substations = dir.path().join("substations.geojson");
        std::fs::File::create(&lines)?.write_all(LINES.as_bytes())?;
        std::fs::File::create(&substations)?.write_all(SUBSTATIONS.as_bytes())?;

        let summary = load_summary(&DataPaths { lines, substations })?;
        assert_eq!(summary.total_substations(), 2);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let paths = DataPaths {
            lines: "does/not/exist.geojson".into(),
            substations: "does/not/exist.geojson".into(),
        };
        assert!(matches!(load_summary(&paths), Err(DataError::Io { .. })));
    }
}
