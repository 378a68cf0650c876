use crate::domain::LngLat;

const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two coordinates.
pub fn haversine_km(a: LngLat, b: LngLat) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

pub fn line_length_km<'a>(parts: impl IntoIterator<Item = &'a [LngLat]>) -> f64 {
    parts
        .into_iter()
        .flat_map(|part| part.windows(2))
        .map(|pair| haversine_km(pair[0], pair[1]))
        .sum()
}
