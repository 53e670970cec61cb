use crate::core::constants::MAX_LATITUDE;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, used by the Haversine distance.
const EARTH_RADIUS: f64 = 6378137.0;

/// A geographical coordinate in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within geographic ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.abs() <= 90.0 && self.lng.abs() <= 180.0
    }

    /// Clamps latitude to the projectable Web Mercator range.
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Wraps longitude into [-180, 180].
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Great-circle distance to another coordinate in meters (Haversine).
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        EARTH_RADIUS * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A point in screen or projected pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scale(&self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn floor(&self) -> Point {
        Point::new(self.x.floor(), self.y.floor())
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A bounding box of geographical coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Degenerate bounds containing a single coordinate.
    pub fn from_point(point: LatLng) -> Self {
        Self::new(point, point)
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Grows the bounds to include a coordinate.
    pub fn extend(&mut self, point: &LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lat_lng_validity() {
        assert!(LatLng::new(40.7128, -74.0060).is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, 200.0).is_valid());
    }

    #[test]
    fn lng_wrapping() {
        assert_eq!(LatLng::wrap_lng(190.0), -170.0);
        assert_eq!(LatLng::wrap_lng(-190.0), 170.0);
        assert_eq!(LatLng::wrap_lng(45.0), 45.0);
    }

    #[test]
    fn haversine_distance() {
        let nyc = LatLng::new(40.7128, -74.0060);
        let la = LatLng::new(34.0522, -118.2437);
        let distance = nyc.distance_to(&la);

        // Approximately 3944 km
        assert!((distance - 3_944_000.0).abs() < 10_000.0);
    }

    #[test]
    fn point_arithmetic() {
        let a = Point::new(3.0, 4.0);
        let b = Point::new(1.0, 1.0);
        assert_eq!(a + b, Point::new(4.0, 5.0));
        assert_eq!(a - b, Point::new(2.0, 3.0));
        assert_eq!(a.scale(2.0), Point::new(6.0, 8.0));
        assert_eq!(Point::default().distance_to(&a), 5.0);
    }

    #[test]
    fn bounds_extend_and_center() {
        let mut bounds = LatLngBounds::from_point(LatLng::new(40.0, -74.0));
        bounds.extend(&LatLng::new(42.0, -72.0));

        assert!(bounds.contains(&LatLng::new(41.0, -73.0)));
        assert!(!bounds.contains(&LatLng::new(39.0, -73.0)));
        assert_eq!(bounds.center(), LatLng::new(41.0, -73.0));
    }
}
