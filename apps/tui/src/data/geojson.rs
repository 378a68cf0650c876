use super::{line_length_km, DataError, FeatureProperties};
use crate::domain::LngLat;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LngLat),
    LineString(Vec<LngLat>),
    MultiLineString(Vec<Vec<LngLat>>),
}

impl Geometry {
    /// Line parts; a point yields a single one-coordinate part.
    pub fn parts(&self) -> Vec<&[LngLat]> {
        match self {
            Self::Point(point) => vec![std::slice::from_ref(point)],
            Self::LineString(coords) => vec![coords.as_slice()],
            Self::MultiLineString(lines) => lines.iter().map(Vec::as_slice).collect(),
        }
    }

    pub const fn as_point(&self) -> Option<LngLat> {
        match self {
            Self::Point(point) => Some(*point),
            _ => None,
        }
    }

    pub const fn is_point(&self) -> bool {
        matches!(self, Self::Point(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

impl Feature {
    pub const fn new(geometry: Geometry, properties: FeatureProperties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// `length_km` when the data carries it, otherwise the measured length.
    pub fn length_km(&self) -> f64 {
        self.properties
            .number("length_km")
            .unwrap_or_else(|| line_length_km(self.geometry.parts()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    /// Features dropped for unsupported or malformed geometry.
    pub skipped: usize,
}

#[derive(Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

impl FeatureCollection {
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        let raw: RawCollection = serde_json::from_str(json)?;
        if raw.kind != "FeatureCollection" {
            return Err(DataError::NotAFeatureCollection(raw.kind));
        }

        let mut collection = Self::default();
        for feature in raw.features {
            let mut properties = feature.properties.unwrap_or_default();
            if let Some(id) = feature.id {
                properties.entry("id").or_insert(id);
            }

            match feature.geometry.and_then(convert_geometry) {
                Some(geometry) => collection
                    .features
                    .push(Feature::new(geometry, FeatureProperties::new(properties))),
                None => collection.skipped += 1,
            }
        }

        if collection.skipped > 0 {
            tracing::debug!(
                skipped = collection.skipped,
                "dropped features with unsupported geometry"
            );
        }

        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn convert_geometry(raw: RawGeometry) -> Option<Geometry> {
    match raw.kind.as_str() {
        "Point" => {
            let coords: Vec<f64> = serde_json::from_value(raw.coordinates).ok()?;
            position(&coords).map(Geometry::Point)
        }
        "LineString" => {
            let coords: Vec<Vec<f64>> = serde_json::from_value(raw.coordinates).ok()?;
            line(&coords).map(Geometry::LineString)
        }
        "MultiLineString" => {
            let lines: Vec<Vec<Vec<f64>>> = serde_json::from_value(raw.coordinates).ok()?;
            let lines = lines
                .iter()
                .filter_map(|coords| line(coords))
                .collect::<Vec<_>>();
            (!lines.is_empty()).then_some(Geometry::MultiLineString(lines))
        }
        _ => None,
    }
}

fn position(coords: &[f64]) -> Option<LngLat> {
    match coords {
        [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Some(LngLat::new(*lng, *lat)),
        _ => None,
    }
}

fn line(coords: &[Vec<f64>]) -> Option<Vec<LngLat>> {
    let points = coords
        .iter()
        .map(|coord| position(coord))
        .collect::<Option<Vec<_>>>()?;
    (points.len() >= 2).then_some(points)
}

pub async fn load_feature_collection(path: &Path) -> Result<FeatureCollection, DataError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    FeatureCollection::from_json_str(&json)
}

pub fn load_feature_collection_blocking(path: &Path) -> Result<FeatureCollection, DataError> {
    let json = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FeatureCollection::from_json_str(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "s1",
             "geometry": {"type": "Point", "coordinates": [10.5, 51.2, 120.0]},
             "properties": {"name": "Alpha", "voltage_kv": 380}},
            {"type": "Feature",
             "geometry": {"type": "LineString", "coordinates": [[10.0, 50.0], [11.0, 50.5]]},
             "properties": {"id": "l1", "voltage_kv": 220}},
            {"type": "Feature",
             "geometry": {"type": "MultiLineString", "coordinates": [[[9.0, 49.0], [9.5, 49.5]], [[1.0, 1.0]]]},
             "properties": null},
            {"type": "Feature",
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]},
             "properties": {}},
            {"type": "Feature", "geometry": null, "properties": {}}
        ]
    }"#;

    #[test]
    fn parses_supported_geometries_and_counts_the_rest() -> Result<(), DataError> {
        let collection = FeatureCollection::from_json_str(SAMPLE)?;
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.skipped, 2);

        let first = &collection.features[0];
        assert_eq!(first.geometry.as_point(), Some(LngLat::new(10.5, 51.2)));
        assert_eq!(first.properties.text("id").as_deref(), Some("s1"));

        // The one-coordinate part is dropped, the valid part survives.
        match &collection.features[2].geometry {
            Geometry::MultiLineString(lines) => assert_eq!(lines.len(), 1),
            other => panic!("unexpected geometry {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn rejects_non_collections() {
        let result = FeatureCollection::from_json_str(r#"{"type": "Feature"}"#);
        assert!(matches!(result, Err(DataError::NotAFeatureCollection(kind)) if kind == "Feature"));
    }

    #[test]
    fn measured_length_is_used_when_property_is_missing() -> Result<(), DataError> {
        let collection = FeatureCollection::from_json_str(SAMPLE)?;
        let line = &collection.features[1];
        assert!(line.length_km() > 50.0);
        Ok(())
    }

    #[tokio::test]
    async fn loads_from_disk() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(SAMPLE.as_bytes())?;

        let collection = load_feature_collection(file.path()).await?;
        assert_eq!(collection.len(), 3);

        let missing = load_feature_collection(Path::new("/definitely/not/here.geojson")).await;
        assert!(matches!(missing, Err(DataError::Io { .. })));
        Ok(())
    }
}
