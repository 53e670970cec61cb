pub mod icon;
pub mod marker;
pub mod overlay;
pub mod popup;
pub mod state;
pub mod style;

pub use icon::{IconCache, IconKind, IconSpec, VisualState};
pub use marker::{ClickHandler, CloseHandler, EventMarker, MarkerResponse};
pub use overlay::{MarkerOverlay, OverlayClickHandler, OverlayCloseHandler, OverlayResponse};
pub use popup::{InfoContent, InfoPopup, InfoView, TextInfoContent};
pub use state::{map_state, provide_map_state, remove_map_state, MapViewState};
pub use style::{ClusterStyle, Gradient, OverlayStyle, OverlayThemes, PinStyle, PopupStyle};
