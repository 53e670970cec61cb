//! Engine-wide constants derived from Leaflet defaults and common web-map
//! conventions. Keeping them in a single place makes it easier to tweak
//! magic numbers.

/// Default square tile size in pixels, fixes the Web Mercator world scale.
pub const TILE_SIZE: f64 = 256.0;

/// Default zoom level a marker assumes when none is supplied.
pub const DEFAULT_ZOOM: f64 = 8.0;

/// Minimum supported zoom level.
pub const MIN_ZOOM: f64 = 0.0;

/// Maximum supported zoom level.
pub const MAX_ZOOM: f64 = 18.0;

/// Latitude limit of the Web Mercator projection.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Base diameter of a cluster disc in pixels.
pub const CLUSTER_BASE_SIZE: f32 = 40.0;

/// Pixels of disc growth per clustered item.
pub const CLUSTER_GROWTH_PER_ITEM: f32 = 2.0;

/// Cluster discs never grow past this diameter.
pub const CLUSTER_MAX_SIZE: f32 = 60.0;

/// Base size of a single-event pin in pixels.
pub const PIN_BASE_SIZE: f32 = 36.0;

/// Pin scale factor while selected (wins over hover).
pub const SELECTED_SCALE: f32 = 1.2;

/// Pin scale factor while hovered.
pub const HOVERED_SCALE: f32 = 1.1;

/// Stacking priority for selected markers.
pub const SELECTED_LAYER_PRIORITY: i32 = 1000;

/// Stacking priority for everything else.
pub const BASE_LAYER_PRIORITY: i32 = 100;
