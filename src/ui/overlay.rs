use crate::{
    core::{geo::LatLng, viewport::Viewport},
    spatial::cluster::{ClusterGroup, GridClusterer, GridClustererConfig},
    ui::{
        marker::EventMarker,
        popup::{InfoContent, TextInfoContent},
        state::map_state,
        style::OverlayStyle,
    },
    Result,
};
use egui::Ui;
use fxhash::{FxHashMap, FxHashSet};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Click callback shared across the overlay's markers.
pub type OverlayClickHandler = Arc<dyn Fn(&str, Option<&Value>) + Send + Sync>;

/// Close-request callback shared across the overlay's popups.
pub type OverlayCloseHandler = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Clone)]
struct EventEntry {
    position: LatLng,
    details: Option<Value>,
    loading: bool,
}

/// What one overlay pass produced.
#[derive(Debug, Default)]
pub struct OverlayResponse {
    /// Id and payload of the marker clicked this frame, if any
    pub clicked: Option<(String, Option<Value>)>,
    /// A popup was rendered this frame
    pub popup_shown: bool,
    /// Markers drawn, singles and clusters combined
    pub rendered: usize,
    /// How many of those were cluster discs
    pub clusters: usize,
}

/// Per-map manager holding one presenter per visible event or cluster.
///
/// Each frame the overlay runs the cluster pass, retires presenters whose
/// group disappeared (ending their transient hover state with them), draws
/// the survivors sorted by stacking priority so selected markers and their
/// popups land on top, and syncs selection against the shared view state
/// when a provider is in scope.
pub struct MarkerOverlay {
    entries: FxHashMap<String, EventEntry>,
    presenters: FxHashMap<String, EventMarker>,
    clusterer: GridClusterer,
    clustering_enabled: bool,
    style: OverlayStyle,
    local_selected: Option<String>,
    close_requests: Arc<Mutex<Vec<String>>>,
    popup_content: Box<dyn InfoContent + Send>,
    on_marker_click: Option<OverlayClickHandler>,
    on_info_close: Option<OverlayCloseHandler>,
}

impl MarkerOverlay {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            presenters: FxHashMap::default(),
            clusterer: GridClusterer::default(),
            clustering_enabled: true,
            style: OverlayStyle::default(),
            local_selected: None,
            close_requests: Arc::new(Mutex::new(Vec::new())),
            popup_content: Box::new(TextInfoContent),
            on_marker_click: None,
            on_info_close: None,
        }
    }

    pub fn with_clusterer(mut self, config: GridClustererConfig) -> Self {
        self.clusterer = GridClusterer::new(config);
        self
    }

    /// Enables or disables the cluster pass entirely.
    pub fn clustering(mut self, enabled: bool) -> Self {
        self.clustering_enabled = enabled;
        self
    }

    pub fn style(mut self, style: OverlayStyle) -> Self {
        self.set_style(style);
        self
    }

    /// Replaces the popup content collaborator for every marker.
    pub fn popup_content(mut self, content: Box<dyn InfoContent + Send>) -> Self {
        self.popup_content = content;
        self
    }

    pub fn on_marker_click<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, Option<&Value>) + Send + Sync + 'static,
    {
        self.on_marker_click = Some(Arc::new(handler));
        self
    }

    /// Called with the event id whose popup asked to close.
    pub fn on_info_close<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_info_close = Some(Arc::new(handler));
        self
    }

    /// Adds or replaces an event position.
    pub fn add_event(&mut self, id: impl Into<String>, position: LatLng) {
        let id = id.into();
        if !position.is_valid() {
            log::warn!("event {} has out-of-range position, keeping as supplied", id);
        }
        self.entries.insert(
            id,
            EventEntry {
                position,
                details: None,
                loading: false,
            },
        );
        self.clusterer.invalidate();
    }

    /// Attaches details and the loading flag to an existing event.
    pub fn set_event_details(&mut self, id: &str, details: Option<Value>, loading: bool) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.details = details;
            entry.loading = loading;
        }
    }

    pub fn remove_event(&mut self, id: &str) {
        self.entries.remove(id);
        self.presenters.remove(id);
        self.clusterer.invalidate();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.presenters.clear();
        self.clusterer.invalidate();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overrides the style and rebuilds presenters on the next pass.
    pub fn set_style(&mut self, style: OverlayStyle) {
        self.style = style;
        self.presenters.clear();
    }

    /// Sets the selection used when no shared view state provider is in
    /// scope.
    pub fn select(&mut self, id: Option<String>) {
        self.local_selected = id;
    }

    /// The effective selection: the provider's when installed, otherwise the
    /// overlay's own.
    pub fn selected_id(&self, ctx: &egui::Context) -> Option<String> {
        match map_state(ctx) {
            Ok(state) => state.lock().ok().and_then(|s| s.selected_event.clone()),
            Err(_) => self.local_selected.clone(),
        }
    }

    fn write_selection(&mut self, ctx: &egui::Context, id: Option<String>) {
        match map_state(ctx) {
            Ok(state) => {
                if let Ok(mut state) = state.lock() {
                    state.selected_event = id;
                }
            }
            Err(_) => self.local_selected = id,
        }
    }

    /// Runs one overlay pass: cluster, prune, draw, dispatch.
    pub fn show(&mut self, ui: &mut Ui, viewport: &Viewport) -> Result<OverlayResponse> {
        let selected = self.selected_id(ui.ctx());

        let mut positions: Vec<(String, LatLng)> = self
            .entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.position))
            .collect();
        positions.sort_by(|a, b| a.0.cmp(&b.0));

        let groups: Vec<ClusterGroup> = if self.clustering_enabled {
            self.clusterer.cluster(&positions, viewport)
        } else {
            positions
                .iter()
                .map(|(id, position)| ClusterGroup {
                    id: id.clone(),
                    center: *position,
                    members: vec![id.clone()],
                })
                .collect()
        };

        // Retire presenters whose group disappeared; their hover state ends
        // with them.
        let live: FxHashSet<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        self.presenters.retain(|id, _| live.contains(id.as_str()));

        for group in &groups {
            self.sync_presenter(group, selected.as_deref(), viewport.zoom);
        }

        // Draw low priority first so selected markers end up on top.
        let mut order: Vec<(i32, String)> = self
            .presenters
            .iter_mut()
            .map(|(id, presenter)| (presenter.icon().layer_priority, id.clone()))
            .collect();
        order.sort();

        let mut outcome = OverlayResponse {
            rendered: order.len(),
            ..OverlayResponse::default()
        };
        outcome.clusters = groups.iter().filter(|g| !g.is_single()).count();

        for (_, id) in &order {
            if let Some(presenter) = self.presenters.get_mut(id) {
                let shown =
                    presenter.show_with_content(ui, viewport, self.popup_content.as_mut())?;
                if shown.popup_shown {
                    outcome.popup_shown = true;
                }
                if shown.clicked {
                    outcome.clicked =
                        Some((id.clone(), presenter.cluster_payload().cloned()));
                }
            }
        }

        if let Some((clicked_id, payload)) = &outcome.clicked {
            if let Some(handler) = &self.on_marker_click {
                handler(clicked_id, payload.as_ref());
            }
            // Clicking a single event selects it; cluster clicks leave the
            // selection to the application (typically a zoom-in).
            if self.entries.contains_key(clicked_id) {
                self.write_selection(ui.ctx(), Some(clicked_id.clone()));
            }
        }

        let closed: Vec<String> = match self.close_requests.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        for id in closed {
            self.write_selection(ui.ctx(), None);
            if let Some(handler) = &self.on_info_close {
                handler(&id);
            }
        }

        Ok(outcome)
    }

    /// Creates or refreshes the presenter backing one cluster group.
    fn sync_presenter(&mut self, group: &ClusterGroup, selected: Option<&str>, zoom: f64) {
        let style = self.style.clone();
        let presenter = self
            .presenters
            .entry(group.id.clone())
            .or_insert_with(|| EventMarker::new(group.id.clone(), group.center).style(style));

        presenter.set_position(group.center);
        presenter.set_zoom(zoom);

        if group.is_single() {
            let entry = self.entries.get(&group.members[0]);
            presenter.set_selected(selected == Some(group.id.as_str()));
            presenter.set_details(entry.and_then(|e| e.details.clone()));
            presenter.set_loading(entry.map(|e| e.loading).unwrap_or(false));

            let queue = self.close_requests.clone();
            let id = group.id.clone();
            presenter.set_close_handler(Some(Box::new(move || {
                if let Ok(mut queue) = queue.lock() {
                    queue.push(id.clone());
                }
            })));
        } else {
            presenter.set_cluster(
                group.count(),
                Some(json!({
                    "cluster_id": group.id,
                    "member_ids": group.members,
                })),
            );
        }
    }
}

impl Default for MarkerOverlay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;
    use crate::ui::state::{provide_map_state, MapViewState};

    fn run_frame(
        ctx: &egui::Context,
        overlay: &mut MarkerOverlay,
        viewport: &Viewport,
    ) -> OverlayResponse {
        let mut outcome = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                outcome = Some(overlay.show(ui, viewport).unwrap());
            });
        });
        outcome.unwrap()
    }

    fn overlay_with_three_events() -> MarkerOverlay {
        let mut overlay = MarkerOverlay::new();
        overlay.add_event("a", LatLng::new(40.7128, -74.0060));
        overlay.add_event("b", LatLng::new(40.7129, -74.0061));
        overlay.add_event("c", LatLng::new(34.0522, -118.2437));
        overlay
    }

    #[test]
    fn clusters_merge_and_singles_survive() {
        let ctx = egui::Context::default();
        let viewport = Viewport::new(LatLng::new(40.0, -95.0), 4.0, Point::new(800.0, 600.0));
        let mut overlay = overlay_with_three_events();

        let outcome = run_frame(&ctx, &mut overlay, &viewport);
        assert_eq!(outcome.rendered, 2);
        assert_eq!(outcome.clusters, 1);
        assert!(!outcome.popup_shown);
    }

    #[test]
    fn high_zoom_disables_clustering() {
        let ctx = egui::Context::default();
        let viewport = Viewport::new(LatLng::new(40.7128, -74.0060), 16.0, Point::new(800.0, 600.0));
        let mut overlay = overlay_with_three_events();

        let outcome = run_frame(&ctx, &mut overlay, &viewport);
        assert_eq!(outcome.rendered, 3);
        assert_eq!(outcome.clusters, 0);
    }

    #[test]
    fn provider_selection_shows_a_popup() {
        let ctx = egui::Context::default();
        let state = Arc::new(Mutex::new(MapViewState {
            selected_event: Some("c".to_string()),
            ..MapViewState::default()
        }));
        provide_map_state(&ctx, state);

        let viewport = Viewport::new(LatLng::new(34.0522, -118.2437), 16.0, Point::new(800.0, 600.0));
        let mut overlay = overlay_with_three_events();

        let outcome = run_frame(&ctx, &mut overlay, &viewport);
        assert!(outcome.popup_shown);
    }

    #[test]
    fn local_selection_without_provider() {
        let ctx = egui::Context::default();
        let viewport = Viewport::new(LatLng::new(34.0522, -118.2437), 16.0, Point::new(800.0, 600.0));
        let mut overlay = overlay_with_three_events();

        overlay.select(Some("c".to_string()));
        let outcome = run_frame(&ctx, &mut overlay, &viewport);
        assert!(outcome.popup_shown);

        overlay.select(None);
        let outcome = run_frame(&ctx, &mut overlay, &viewport);
        assert!(!outcome.popup_shown);
    }

    #[test]
    fn stale_presenters_are_retired() {
        let ctx = egui::Context::default();
        let viewport = Viewport::new(LatLng::new(40.7128, -74.0060), 16.0, Point::new(800.0, 600.0));
        let mut overlay = overlay_with_three_events();

        run_frame(&ctx, &mut overlay, &viewport);
        assert_eq!(overlay.presenters.len(), 3);

        overlay.remove_event("b");
        run_frame(&ctx, &mut overlay, &viewport);
        assert_eq!(overlay.presenters.len(), 2);
        assert!(!overlay.presenters.contains_key("b"));
    }

    #[test]
    fn selected_markers_draw_last() {
        let ctx = egui::Context::default();
        let viewport = Viewport::new(LatLng::new(40.7128, -74.0060), 16.0, Point::new(800.0, 600.0));
        let mut overlay = overlay_with_three_events();
        overlay.select(Some("a".to_string()));

        run_frame(&ctx, &mut overlay, &viewport);

        let mut order: Vec<(i32, String)> = overlay
            .presenters
            .iter_mut()
            .map(|(id, p)| (p.icon().layer_priority, id.clone()))
            .collect();
        order.sort();
        assert_eq!(order.last().unwrap().1, "a");
    }

    #[test]
    fn empty_overlay_renders_nothing() {
        let ctx = egui::Context::default();
        let viewport = Viewport::default();
        let mut overlay = MarkerOverlay::new();

        let outcome = run_frame(&ctx, &mut overlay, &viewport);
        assert_eq!(outcome.rendered, 0);
        assert!(outcome.clicked.is_none());
    }
}
