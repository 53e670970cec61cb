use crate::core::{
    constants::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE},
    geo::{LatLng, LatLngBounds, Point},
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The current view of the map: center, zoom, and screen dimensions.
///
/// Projection is standard Web Mercator (EPSG:3857). Screen coordinates are
/// container-relative, with the viewport center mapping to the middle of the
/// container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Center of the view in geographical coordinates
    pub center: LatLng,
    /// Current zoom level
    pub zoom: f64,
    /// Size of the viewport in pixels
    pub size: Point,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        if !center.is_valid() {
            log::warn!(
                "viewport created with out-of-range center ({}, {})",
                center.lat,
                center.lng
            );
        }
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(
            LatLng::clamp_lat(center.lat),
            LatLng::wrap_lng(center.lng),
        );
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    /// World width in pixels at the current zoom level.
    pub fn world_size(&self) -> f64 {
        TILE_SIZE * 2_f64.powf(self.zoom)
    }

    /// Projects a coordinate to world pixel space at the current zoom.
    pub fn project(&self, lat_lng: &LatLng) -> Point {
        let scale = self.world_size();
        let lat_rad = LatLng::clamp_lat(lat_lng.lat).to_radians();

        let x = (lat_lng.lng + 180.0) / 360.0 * scale;
        let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * scale;

        Point::new(x, y)
    }

    /// Unprojects world pixel coordinates back to a geographic coordinate.
    pub fn unproject(&self, pixel: &Point) -> LatLng {
        let scale = self.world_size();

        let lng = pixel.x / scale * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * pixel.y / scale)).sinh().atan().to_degrees();

        LatLng::new(lat, lng)
    }

    /// Converts a geographic coordinate to container-relative screen pixels.
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let world = self.project(lat_lng);
        let origin = self.project(&self.center);
        world - origin + self.size.scale(0.5)
    }

    /// Converts container-relative screen pixels back to a coordinate.
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let origin = self.project(&self.center);
        let world = *pixel - self.size.scale(0.5) + origin;
        self.unproject(&world)
    }

    /// Visible bounds of the viewport in geographic coordinates.
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&Point::new(self.size.x, self.size.y));

        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::default(), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_creation_clamps_zoom() {
        let viewport = Viewport::new(LatLng::new(40.7128, -74.0060), 25.0, Point::new(800.0, 600.0));
        assert_eq!(viewport.zoom, MAX_ZOOM);
        assert_eq!(viewport.center.lat, 40.7128);
    }

    #[test]
    fn center_projects_to_container_middle() {
        let viewport = Viewport::new(LatLng::new(37.7749, -122.4194), 10.0, Point::new(512.0, 512.0));
        let pixel = viewport.lat_lng_to_pixel(&viewport.center);

        assert!((pixel.x - 256.0).abs() < 1e-6);
        assert!((pixel.y - 256.0).abs() < 1e-6);
    }

    #[test]
    fn pixel_round_trip() {
        let viewport = Viewport::new(LatLng::new(51.5074, -0.1278), 12.0, Point::new(800.0, 600.0));
        let pixel = Point::new(123.0, 456.0);
        let back = viewport.lat_lng_to_pixel(&viewport.pixel_to_lat_lng(&pixel));

        assert!((back.x - pixel.x).abs() < 1e-6);
        assert!((back.y - pixel.y).abs() < 1e-6);
    }

    #[test]
    fn east_is_right_and_north_is_up() {
        let viewport = Viewport::new(LatLng::default(), 4.0, Point::new(512.0, 512.0));

        let east = viewport.lat_lng_to_pixel(&LatLng::new(0.0, 10.0));
        let north = viewport.lat_lng_to_pixel(&LatLng::new(10.0, 0.0));
        let center = viewport.lat_lng_to_pixel(&viewport.center);

        assert!(east.x > center.x);
        assert!(north.y < center.y);
    }

    #[test]
    fn zoom_limits_apply() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(2.0, 15.0);

        viewport.set_zoom(1.0);
        assert_eq!(viewport.zoom, 2.0);

        viewport.set_zoom(20.0);
        assert_eq!(viewport.zoom, 15.0);
    }

    #[test]
    fn bounds_contain_center() {
        let viewport = Viewport::new(LatLng::new(48.8566, 2.3522), 11.0, Point::new(800.0, 600.0));
        assert!(viewport.bounds().contains(&viewport.center));
    }
}
