use crate::{ui::style::PopupStyle, Result};
use egui::{Align2, Area, Frame, Order, Pos2, Ui};
use serde_json::Value;

/// Everything the popup-content collaborator gets to see.
pub struct InfoView<'a> {
    /// Opaque event payload, if details have arrived
    pub details: Option<&'a Value>,
    /// True while details are being fetched by the application
    pub loading: bool,
    /// True when the details came from an application-side cache
    pub cached: bool,
    /// Close request callback, passed through from the parent untouched
    pub on_close: Option<&'a (dyn Fn() + Send + Sync)>,
}

/// The popup's inner content, supplied by the embedding application.
///
/// The popup chrome draws no close affordance of its own; implementations
/// may invoke `view.on_close` to ask the parent to deselect.
pub trait InfoContent {
    fn show(&mut self, ui: &mut Ui, view: &InfoView<'_>) -> Result<()>;
}

/// Minimal default content: title and description pulled out of the payload.
#[derive(Debug, Default)]
pub struct TextInfoContent;

impl InfoContent for TextInfoContent {
    fn show(&mut self, ui: &mut Ui, view: &InfoView<'_>) -> Result<()> {
        if view.loading {
            ui.label("Loading details…");
            return Ok(());
        }

        match view.details {
            Some(details) => {
                if let Some(title) = details.get("title").and_then(Value::as_str) {
                    ui.strong(title);
                }
                if let Some(description) = details.get("description").and_then(Value::as_str) {
                    ui.label(description);
                }
                if view.cached {
                    ui.weak("(cached)");
                }
            }
            None => {
                ui.weak("No details available");
            }
        }

        if let Some(on_close) = view.on_close {
            if ui.button("Close").clicked() {
                on_close();
            }
        }

        Ok(())
    }
}

/// A floating info panel anchored above a marker.
///
/// Visibility is entirely parent-driven: there is no auto-close timer and no
/// outside-click dismissal. Callers simply stop showing the popup.
#[derive(Debug, Clone, Default)]
pub struct InfoPopup {
    pub style: PopupStyle,
}

impl InfoPopup {
    pub fn new(style: PopupStyle) -> Self {
        Self { style }
    }

    /// Renders the popup with its bottom-center at `anchor`, floating above
    /// all widget-layer painting.
    pub fn show_above(
        &self,
        ui: &Ui,
        id: egui::Id,
        anchor: Pos2,
        content: &mut dyn InfoContent,
        view: &InfoView<'_>,
    ) -> Result<()> {
        let style = &self.style;
        let pos = anchor - egui::vec2(0.0, style.anchor_gap);

        let inner = Area::new(id)
            .order(Order::Foreground)
            .pivot(Align2::CENTER_BOTTOM)
            .fixed_pos(pos)
            .show(ui.ctx(), |ui| {
                Frame::none()
                    .fill(style.background_color)
                    .stroke(style.border_stroke)
                    .rounding(style.rounding)
                    .inner_margin(style.padding)
                    .show(ui, |ui| {
                        ui.set_min_width(style.min_width);
                        ui.set_max_width(style.max_width);
                        ui.set_max_height(style.max_height);
                        ui.style_mut().visuals.override_text_color = Some(style.text_color);
                        content.show(ui, view)
                    })
                    .inner
            });

        inner.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn text_content_close_invokes_callback() {
        let closes = AtomicUsize::new(0);
        let close_fn = || {
            closes.fetch_add(1, Ordering::SeqCst);
        };

        let details = json!({"title": "Concert", "description": "Live"});
        let view = InfoView {
            details: Some(&details),
            loading: false,
            cached: false,
            on_close: Some(&close_fn),
        };

        // Direct invocation path: the content forwards the parent's callback
        // unchanged, so calling it behaves identically from either side.
        view.on_close.unwrap()();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn popup_renders_inside_a_frame() {
        let ctx = egui::Context::default();
        let popup = InfoPopup::default();
        let details = json!({"title": "Festival", "description": "Outdoor"});
        let mut content = TextInfoContent;

        let mut render_result = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let view = InfoView {
                    details: Some(&details),
                    loading: false,
                    cached: false,
                    on_close: None,
                };
                render_result = Some(popup.show_above(
                    ui,
                    egui::Id::new("test_popup"),
                    egui::pos2(200.0, 200.0),
                    &mut content,
                    &view,
                ));
            });
        });

        assert!(render_result.unwrap().is_ok());
    }

    #[test]
    fn default_style_matches_sizing_contract() {
        let popup = InfoPopup::default();
        assert_eq!(popup.style.min_width, 280.0);
        assert_eq!(popup.style.max_width, 500.0);
    }
}
