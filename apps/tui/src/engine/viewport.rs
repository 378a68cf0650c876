use super::ScreenPoint;
use crate::domain::LngLat;

/// Width of the world at zoom 0, in pixels.
pub const TILE_SIZE_PX: f64 = 512.0;
/// Canvas dots per style pixel. Style sizes are given in pixels.
pub const DOTS_PER_PX: f64 = 0.25;
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 18.0;
pub const MAX_LATITUDE: f64 = 85.0;

const METERS_PER_DEGREE: f64 = 111_320.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Bounds {
    pub fn contains(&self, lng_lat: LngLat) -> bool {
        (self.west..=self.east).contains(&lng_lat.lng)
            && (self.south..=self.north).contains(&lng_lat.lat)
    }

    /// Whether the box spanned by two points can touch these bounds.
    pub fn touches_segment(&self, a: LngLat, b: LngLat) -> bool {
        !(a.lng.max(b.lng) < self.west
            || a.lng.min(b.lng) > self.east
            || a.lat.max(b.lat) < self.south
            || a.lat.min(b.lat) > self.north)
    }
}

/// Equirectangular camera. Degrees of longitude map linearly to canvas dots
/// and latitude is stretched by the secant of the center latitude, so the
/// picture matches the terminal world map drawn under it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LngLat,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: LngLat, zoom: f64) -> Self {
        let mut viewport = Self {
            center,
            zoom,
            width: 0.0,
            height: 0.0,
        };
        viewport.normalize();
        viewport
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    pub fn world_dots(&self) -> f64 {
        TILE_SIZE_PX * DOTS_PER_PX * self.zoom.exp2()
    }

    pub fn lng_per_dot(&self) -> f64 {
        360.0 / self.world_dots()
    }

    pub fn lat_per_dot(&self) -> f64 {
        self.lng_per_dot() * self.center.lat.to_radians().cos()
    }

    pub fn bounds(&self) -> Bounds {
        let half_lng = self.width / 2.0 * self.lng_per_dot();
        let half_lat = self.height / 2.0 * self.lat_per_dot();
        Bounds {
            west: self.center.lng - half_lng,
            east: self.center.lng + half_lng,
            south: self.center.lat - half_lat,
            north: self.center.lat + half_lat,
        }
    }

    pub fn project(&self, lng_lat: LngLat) -> ScreenPoint {
        let bounds = self.bounds();
        ScreenPoint::new(
            (lng_lat.lng - bounds.west) / self.lng_per_dot(),
            (bounds.north - lng_lat.lat) / self.lat_per_dot(),
        )
    }

    pub fn unproject(&self, point: ScreenPoint) -> LngLat {
        let bounds = self.bounds();
        LngLat::new(
            point.x.mul_add(self.lng_per_dot(), bounds.west),
            (-point.y).mul_add(self.lat_per_dot(), bounds.north),
        )
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.center.lng += dx * self.lng_per_dot();
        self.center.lat -= dy * self.lat_per_dot();
        self.normalize();
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.zoom += delta;
        self.normalize();
    }

    pub fn zoom_at(&mut self, point: ScreenPoint, delta: f64) {
        let anchor = self.unproject(point);
        self.zoom_by(delta);
        self.center.lng = (self.width / 2.0 - point.x).mul_add(self.lng_per_dot(), anchor.lng);
        self.center.lat = (point.y - self.height / 2.0).mul_add(self.lat_per_dot(), anchor.lat);
        self.normalize();
    }

    /// Ground distance covered by one horizontal dot at the center latitude.
    pub fn meters_per_dot(&self) -> f64 {
        self.lng_per_dot() * METERS_PER_DEGREE * self.center.lat.to_radians().cos()
    }

    /// Converts a style size in pixels to canvas dots.
    pub fn px_to_dots(px: f64) -> f64 {
        px * DOTS_PER_PX
    }

    fn normalize(&mut self) {
        if !self.zoom.is_finite() {
            self.zoom = MIN_ZOOM;
        }
        self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.center.lat = self.center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        self.center.lng = (self.center.lng + 180.0).rem_euclid(360.0) - 180.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        let mut viewport = Viewport::new(LngLat::new(10.5, 51.2), 5.0);
        viewport.resize(200.0, 120.0);
        viewport
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn center_projects_to_the_middle() {
        let v = viewport();
        let p = v.project(v.center);
        assert!(close(p.x, 100.0) && close(p.y, 60.0));
    }

    #[test]
    fn project_and_unproject_agree() {
        let v = viewport();
        let berlin = LngLat::new(13.4, 52.5);
        let back = v.unproject(v.project(berlin));
        assert!(close(back.lng, berlin.lng) && close(back.lat, berlin.lat));
    }

    #[test]
    fn zoom_at_keeps_the_anchor_in_place() {
        let mut v = viewport();
        let point = ScreenPoint::new(40.0, 30.0);
        let before = v.unproject(point);
        v.zoom_at(point, 1.0);
        let after = v.project(before);
        assert!((after.x - point.x).abs() < 1e-6);
        // Latitude scale follows the new center, so allow a little drift.
        assert!((after.y - point.y).abs() < 1.0);
    }

    #[test]
    fn zoom_and_latitude_are_clamped() {
        let mut v = viewport();
        v.zoom_by(100.0);
        assert!(close(v.zoom, MAX_ZOOM));
        v.zoom_by(-100.0);
        assert!(close(v.zoom, MIN_ZOOM));
        v.pan_by(0.0, -1.0e6);
        assert!(close(v.center.lat, MAX_LATITUDE));
    }

    #[test]
    fn longitude_wraps() {
        let mut v = Viewport::new(LngLat::new(179.0, 0.0), 0.0);
        v.pan_by(10.0 / v.lng_per_dot(), 0.0);
        assert!(close(v.center.lng, -171.0));
    }
}
