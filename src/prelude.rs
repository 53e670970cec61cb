//! Prelude module for common pinlay types and traits
//!
//! Re-exports the most commonly used types for easy importing with
//! `use pinlay::prelude::*;`

pub use crate::core::{
    constants,
    geo::{LatLng, LatLngBounds, Point},
    viewport::Viewport,
};

pub use crate::spatial::cluster::{ClusterGroup, GridClusterer, GridClustererConfig};

pub use crate::ui::{
    icon::{IconCache, IconKind, IconSpec, VisualState},
    marker::{ClickHandler, CloseHandler, EventMarker, MarkerResponse},
    overlay::{MarkerOverlay, OverlayResponse},
    popup::{InfoContent, InfoPopup, InfoView, TextInfoContent},
    state::{map_state, provide_map_state, remove_map_state, MapViewState},
    style::{ClusterStyle, Gradient, OverlayStyle, OverlayThemes, PinStyle, PopupStyle},
};

pub use crate::{Error as MapError, Result};

pub use std::sync::{Arc, Mutex};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
