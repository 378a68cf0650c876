use super::viewport::TILE_SIZE_PX;
use crate::data::{Feature, FeatureProperties, Geometry};
use crate::domain::LngLat;
use crate::style::expr::abbreviate_count;
use crate::style::layers::{ClusterOptions, POINT_COUNT};
use std::collections::BTreeMap;

/// Groups point features into clusters for the given zoom.
///
/// Points are bucketed on a grid of `radius_px` cells laid over the world
/// at the integer zoom level. Buckets holding two or more points become a
/// single cluster feature at the members' centroid with `cluster`,
/// `cluster_id`, `point_count` and `point_count_abbreviated` properties.
/// Above the cluster max zoom, and for non-point features, input passes
/// through untouched.
pub fn cluster_features(features: &[Feature], zoom: f64, options: ClusterOptions) -> Vec<Feature> {
    if zoom > options.max_zoom || options.radius_px <= 0.0 {
        return features.to_vec();
    }

    let world_px = TILE_SIZE_PX * zoom.floor().max(0.0).exp2();
    let mut cells: BTreeMap<(i64, i64), Vec<&Feature>> = BTreeMap::new();
    let mut passthrough = Vec::new();

    for feature in features {
        let Some(point) = feature.geometry.as_point() else {
            passthrough.push(feature.clone());
            continue;
        };
        let x = (point.lng + 180.0) / 360.0 * world_px;
        let y = (90.0 - point.lat) / 360.0 * world_px;
        let key = (
            (x / options.radius_px).floor() as i64,
            (y / options.radius_px).floor() as i64,
        );
        cells.entry(key).or_default().push(feature);
    }

    let mut clustered = passthrough;
    for (cluster_id, members) in cells.into_values().enumerate() {
        match members.as_slice() {
            [single] => clustered.push((*single).clone()),
            _ => clustered.push(cluster_feature(cluster_id, &members)),
        }
    }
    clustered
}

fn cluster_feature(cluster_id: usize, members: &[&Feature]) -> Feature {
    let count = members.len();
    let (lng, lat) = members
        .iter()
        .filter_map(|feature| feature.geometry.as_point())
        .fold((0.0, 0.0), |(lng, lat), point| (lng + point.lng, lat + point.lat));

    let mut properties = FeatureProperties::default();
    properties.insert("cluster", true);
    properties.insert("cluster_id", cluster_id);
    properties.insert(POINT_COUNT, count);
    properties.insert("point_count_abbreviated", abbreviate_count(count));

    Feature::new(
        Geometry::Point(LngLat::new(lng / count as f64, lat / count as f64)),
        properties,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTIONS: ClusterOptions = ClusterOptions {
        max_zoom: 7.0,
        radius_px: 40.0,
    };

    fn point(lng: f64, lat: f64) -> Feature {
        Feature::new(Geometry::Point(LngLat::new(lng, lat)), FeatureProperties::default())
    }

    #[test]
    fn nearby_points_merge_at_low_zoom() {
        let features = vec![point(10.0, 50.0), point(10.01, 50.01), point(-70.0, -30.0)];
        let clustered = cluster_features(&features, 3.0, OPTIONS);

        assert_eq!(clustered.len(), 2);
        let cluster = clustered
            .iter()
            .find(|f| f.properties.has(POINT_COUNT))
            .map(|f| f.properties.number(POINT_COUNT));
        assert_eq!(cluster, Some(Some(2.0)));
    }

    #[test]
    fn clustering_stops_above_max_zoom() {
        let features = vec![point(10.0, 50.0), point(10.0001, 50.0001)];
        assert_eq!(cluster_features(&features, 7.5, OPTIONS), features);
    }

    #[test]
    fn centroid_sits_between_members() {
        let features = vec![point(10.0, 50.0), point(10.02, 50.02)];
        let clustered = cluster_features(&features, 2.0, OPTIONS);
        let center = clustered.first().and_then(|f| f.geometry.as_point());
        let center = center.unwrap_or_default();
        assert!((center.lng - 10.01).abs() < 1e-9);
        assert!((center.lat - 50.01).abs() < 1e-9);
    }

    #[test]
    fn result_is_deterministic() {
        let features = (0..50)
            .map(|i| point(f64::from(i) * 0.3, 45.0 + f64::from(i % 7) * 0.2))
            .collect::<Vec<_>>();
        assert_eq!(
            cluster_features(&features, 4.0, OPTIONS),
            cluster_features(&features, 4.0, OPTIONS)
        );
    }
}
