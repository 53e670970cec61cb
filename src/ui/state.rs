use crate::{
    core::{constants::DEFAULT_ZOOM, geo::LatLng},
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Shared map view state, owned by the embedding application and reachable
/// through the ambient egui context once a provider installs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapViewState {
    /// Id of the currently selected event, if any
    pub selected_event: Option<String>,
    /// Current zoom level
    pub zoom: f64,
    /// Current map center
    pub center: LatLng,
}

impl Default for MapViewState {
    fn default() -> Self {
        Self {
            selected_event: None,
            zoom: DEFAULT_ZOOM,
            center: LatLng::default(),
        }
    }
}

fn state_id() -> egui::Id {
    egui::Id::new("pinlay_map_view_state")
}

/// Installs `state` as the ambient map view state for `ctx`.
///
/// Consumers reach it through [`map_state`]; the handle is shared, so
/// mutations are visible to every consumer immediately.
pub fn provide_map_state(ctx: &egui::Context, state: Arc<Mutex<MapViewState>>) {
    log::debug!("installing map view state provider");
    ctx.memory_mut(|mem| mem.data.insert_temp(state_id(), state));
}

/// Uninstalls the ambient map view state from `ctx`.
pub fn remove_map_state(ctx: &egui::Context) {
    log::debug!("removing map view state provider");
    ctx.memory_mut(|mem| mem.data.remove::<Arc<Mutex<MapViewState>>>(state_id()));
}

/// Returns the provider-supplied map view state, unchanged.
///
/// Fails with [`MapError::MissingProvider`] when no provider is in scope.
/// That is a structural wiring mistake, not a runtime condition: treat it as
/// fatal at the call site rather than retrying.
pub fn map_state(ctx: &egui::Context) -> Result<Arc<Mutex<MapViewState>>> {
    ctx.memory(|mem| mem.data.get_temp::<Arc<Mutex<MapViewState>>>(state_id()))
        .ok_or_else(|| {
            MapError::MissingProvider(
                "map view state accessed outside a provider scope; \
                 call provide_map_state on an ancestor first"
                    .to_string(),
            )
            .into()
        })
}
