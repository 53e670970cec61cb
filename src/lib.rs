//! # pinlay
//!
//! A marker, cluster, and popup presentation layer for egui-based map views,
//! inspired by Leaflet's marker/popup model.
//!
//! The crate derives marker visuals (pin or cluster disc, size, anchor,
//! stacking priority) from presentation state, wires pointer events to
//! optional callbacks, and conditionally attaches an info popup whose
//! lifecycle is owned by the parent. A shared view-state provider/accessor
//! carries selection state through the ambient egui context.

pub mod core;
pub mod prelude;
pub mod spatial;
pub mod ui;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    geo::{LatLng, LatLngBounds, Point},
    viewport::Viewport,
};

pub use crate::spatial::cluster::{ClusterGroup, GridClusterer, GridClustererConfig};

pub use crate::ui::{
    icon::{IconCache, IconKind, IconSpec, VisualState},
    marker::{EventMarker, MarkerResponse},
    overlay::{MarkerOverlay, OverlayResponse},
    popup::{InfoContent, InfoPopup, InfoView, TextInfoContent},
    state::{map_state, provide_map_state, remove_map_state, MapViewState},
    style::{ClusterStyle, Gradient, OverlayStyle, OverlayThemes, PinStyle, PopupStyle},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("missing provider: {0}")]
    MissingProvider(String),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;
