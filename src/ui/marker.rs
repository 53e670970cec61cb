use crate::{
    core::{constants::DEFAULT_ZOOM, geo::LatLng, viewport::Viewport},
    ui::{
        icon::{IconCache, IconKind, IconSpec, VisualState},
        popup::{InfoContent, InfoPopup, InfoView, TextInfoContent},
        style::{ClusterStyle, OverlayStyle, PinStyle},
    },
    Result,
};
use egui::{CursorIcon, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2};
use serde_json::Value;

/// Click callback: receives the event id and the opaque cluster payload.
pub type ClickHandler = Box<dyn Fn(&str, Option<&Value>) + Send + Sync>;

/// Popup close-request callback, forwarded to the popup content untouched.
pub type CloseHandler = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone)]
struct ClusterInfo {
    count: u32,
    payload: Option<Value>,
}

/// What a single `show` pass produced.
pub struct MarkerResponse {
    pub response: Response,
    /// The marker was clicked this frame
    pub clicked: bool,
    /// The info popup was rendered this frame
    pub popup_shown: bool,
}

/// One positioned marker: a pin for a single event or a labeled disc for a
/// cluster, with an optional info popup attached while selected.
///
/// The only internally owned mutable state is the transient hover flag (and
/// the icon memo); position and the supplied payloads are never mutated.
///
/// # Examples
///
/// ```no_run
/// # use pinlay::{EventMarker, LatLng, Viewport};
/// let marker = EventMarker::new("evt-17", LatLng::new(59.33, 18.07))
///     .selected(false)
///     .on_click(|id, _payload| println!("clicked {id}"));
/// # let _ = (marker, Viewport::default());
/// ```
pub struct EventMarker {
    id: String,
    position: LatLng,
    selected: bool,
    cluster: Option<ClusterInfo>,
    details: Option<Value>,
    loading_details: bool,
    zoom: f64,
    on_click: Option<ClickHandler>,
    on_info_close: Option<CloseHandler>,
    style: OverlayStyle,
    hovered: bool,
    icon_cache: IconCache,
}

impl EventMarker {
    pub fn new(id: impl Into<String>, position: LatLng) -> Self {
        Self {
            id: id.into(),
            position,
            selected: false,
            cluster: None,
            details: None,
            loading_details: false,
            zoom: DEFAULT_ZOOM,
            on_click: None,
            on_info_close: None,
            style: OverlayStyle::default(),
            hovered: false,
            icon_cache: IconCache::new(),
        }
    }

    /// Marks the marker selected; selected markers scale up, stack above
    /// their neighbors, and carry the info popup.
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Turns the marker into a cluster disc aggregating `count` events,
    /// with an opaque payload handed back on click.
    pub fn cluster(mut self, count: u32, payload: Option<Value>) -> Self {
        self.cluster = Some(ClusterInfo { count, payload });
        self
    }

    /// Opaque event payload shown by the popup content.
    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Signals that details are still being fetched.
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading_details = loading;
        self
    }

    /// Current map zoom.
    // TODO: zoom-responsive pin sizing; the icon formulas ignore zoom today.
    pub fn zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn on_click<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, Option<&Value>) + Send + Sync + 'static,
    {
        self.on_click = Some(Box::new(handler));
        self
    }

    pub fn on_info_close<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_info_close = Some(Box::new(handler));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn current_zoom(&self) -> f64 {
        self.zoom
    }

    /// Flips the selected flag in place (the overlay syncs this from shared
    /// view state between frames).
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Moves the marker; the parent owns the position and supplies a fresh
    /// one per render.
    pub fn set_position(&mut self, position: LatLng) {
        self.position = position;
    }

    pub fn set_details(&mut self, details: Option<Value>) {
        self.details = details;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading_details = loading;
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    /// Updates cluster membership in place, keeping hover state intact.
    pub fn set_cluster(&mut self, count: u32, payload: Option<Value>) {
        self.cluster = Some(ClusterInfo { count, payload });
    }

    /// Replaces the popup close-request handler.
    pub fn set_close_handler(&mut self, handler: Option<CloseHandler>) {
        self.on_info_close = handler;
    }

    /// The opaque cluster payload, if this marker is a cluster.
    pub fn cluster_payload(&self) -> Option<&Value> {
        self.cluster.as_ref().and_then(|c| c.payload.as_ref())
    }

    /// The memoization key for icon derivation.
    pub fn visual_state(&self) -> VisualState {
        match &self.cluster {
            Some(info) => VisualState::cluster(info.count),
            None => VisualState::pin(self.selected, self.hovered),
        }
    }

    /// The derived icon for the current presentation state.
    pub fn icon(&mut self) -> IconSpec {
        self.icon_cache.icon(self.visual_state()).clone()
    }

    /// Invokes the click handler if one is present; a missing handler is a
    /// silent no-op.
    pub fn handle_click(&self) {
        if let Some(on_click) = &self.on_click {
            let payload = self.cluster.as_ref().and_then(|c| c.payload.as_ref());
            on_click(&self.id, payload);
        }
    }

    pub fn pointer_entered(&mut self) {
        self.hovered = true;
    }

    pub fn pointer_exited(&mut self) {
        self.hovered = false;
    }

    /// Renders the marker with the built-in text popup content.
    pub fn show(&mut self, ui: &mut Ui, viewport: &Viewport) -> Result<MarkerResponse> {
        let mut content = TextInfoContent;
        self.show_with_content(ui, viewport, &mut content)
    }

    /// Renders the marker, delegating popup content to `content`.
    pub fn show_with_content(
        &mut self,
        ui: &mut Ui,
        viewport: &Viewport,
        content: &mut dyn InfoContent,
    ) -> Result<MarkerResponse> {
        let screen = viewport.lat_lng_to_pixel(&self.position);
        let screen_pos = Pos2::new(screen.x as f32, screen.y as f32);

        let icon = self.icon();
        let rect = Rect::from_min_size(
            screen_pos - icon.anchor,
            Vec2::splat(icon.size),
        );

        let response = ui
            .allocate_rect(rect, Sense::click())
            .on_hover_cursor(CursorIcon::PointingHand);

        // Pointer enter/exit transitions drive the transient hover flag;
        // the resized icon shows up on the next pass, like any other
        // presentation-state change.
        if response.hovered() && !self.hovered {
            self.pointer_entered();
        } else if !response.hovered() && self.hovered {
            self.pointer_exited();
        }

        let clicked = response.clicked();
        if clicked {
            log::debug!("marker {} clicked", self.id);
            self.handle_click();
        }

        match icon.kind {
            IconKind::Cluster => {
                let label = icon.label.as_deref().unwrap_or("");
                paint_cluster(ui, rect, label, &self.style.cluster);
            }
            IconKind::Pin => paint_pin(ui, rect, &self.style.pin),
        }

        let popup_shown = self.selected;
        if popup_shown {
            let anchor = screen_pos + icon.popup_anchor;
            let view = InfoView {
                details: self.details.as_ref(),
                loading: self.loading_details,
                cached: false,
                on_close: self
                    .on_info_close
                    .as_ref()
                    .map(|handler| handler.as_ref() as &(dyn Fn() + Send + Sync)),
            };
            let popup = InfoPopup::new(self.style.popup.clone());
            popup.show_above(
                ui,
                egui::Id::new(("pinlay_popup", &self.id)),
                anchor,
                content,
                &view,
            )?;
        }

        Ok(MarkerResponse {
            response,
            clicked,
            popup_shown,
        })
    }
}

/// Paints a cluster disc with its centered count label.
fn paint_cluster(ui: &mut Ui, rect: Rect, label: &str, style: &ClusterStyle) {
    let painter = ui.painter();
    let center = rect.center();
    let radius = rect.width() / 2.0 - style.border_width / 2.0;

    painter.circle_filled(center + Vec2::new(1.5, 2.5), radius, style.shadow_color);
    painter.circle_filled(center, radius, style.gradient.fill());
    painter.circle_stroke(center, radius, Stroke::new(style.border_width, style.border_color));
    painter.text(
        center,
        egui::Align2::CENTER_CENTER,
        label,
        style.label_font.clone(),
        style.label_color,
    );
}

/// Paints a teardrop pin whose tip touches the bottom-center of `rect`.
fn paint_pin(ui: &mut Ui, rect: Rect, style: &PinStyle) {
    let painter = ui.painter();
    let tip = rect.center_bottom();
    let head_radius = rect.width() * 0.34;
    let head_center = Pos2::new(rect.center().x, rect.top() + head_radius + style.border_width);

    painter.circle_filled(
        head_center + Vec2::new(1.5, 2.5),
        head_radius,
        style.shadow_color,
    );

    let tail = vec![
        tip,
        head_center + Vec2::new(-head_radius * 0.8, head_radius * 0.5),
        head_center + Vec2::new(head_radius * 0.8, head_radius * 0.5),
    ];
    painter.add(egui::Shape::convex_polygon(
        tail,
        style.gradient.fill(),
        Stroke::new(style.border_width, style.border_color),
    ));

    painter.circle_filled(head_center, head_radius, style.gradient.fill());
    painter.circle_stroke(
        head_center,
        head_radius,
        Stroke::new(style.border_width, style.border_color),
    );
    painter.circle_filled(head_center, head_radius * 0.35, style.glyph_color);
}
