//! Minimal overlay viewer: a handful of events over a pannable viewport.
//!
//! Run with: `cargo run --example basic_overlay --features app`

use eframe::egui;
use pinlay::prelude::*;
use serde_json::json;

struct OverlayDemo {
    viewport: Viewport,
    overlay: MarkerOverlay,
    state: Arc<Mutex<MapViewState>>,
}

impl OverlayDemo {
    fn new() -> Self {
        let mut overlay = MarkerOverlay::new()
            .on_marker_click(|id, payload| {
                log::info!("clicked {id}, payload: {payload:?}");
            })
            .on_info_close(|id| {
                log::info!("popup for {id} closed");
            });

        overlay.add_event("jazz-night", LatLng::new(40.7128, -74.0060));
        overlay.set_event_details(
            "jazz-night",
            Some(json!({
                "title": "Jazz Night",
                "description": "Live quartet in the Village",
            })),
            false,
        );

        overlay.add_event("book-fair", LatLng::new(40.7180, -74.0020));
        overlay.set_event_details(
            "book-fair",
            Some(json!({
                "title": "Book Fair",
                "description": "Used and rare books, all day",
            })),
            false,
        );

        overlay.add_event("harbor-run", LatLng::new(40.7010, -74.0150));
        overlay.set_event_details(
            "harbor-run",
            Some(json!({
                "title": "Harbor Run",
                "description": "10k along the waterfront",
            })),
            false,
        );

        Self {
            viewport: Viewport::new(LatLng::new(40.7128, -74.0060), 12.0, Point::new(800.0, 600.0)),
            overlay,
            state: Arc::new(Mutex::new(MapViewState::default())),
        }
    }
}

impl eframe::App for OverlayDemo {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        provide_map_state(ctx, self.state.clone());

        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = ui.available_rect_before_wrap();
            self.viewport
                .set_size(Point::new(rect.width() as f64, rect.height() as f64));

            ui.painter()
                .rect_filled(rect, 0.0, egui::Color32::from_rgb(228, 235, 240));

            // Drag to pan, scroll to zoom
            let response = ui.interact(
                rect,
                ui.id().with("map_background"),
                egui::Sense::click_and_drag(),
            );
            if response.dragged() {
                let delta = response.drag_delta();
                let center_px = self.viewport.lat_lng_to_pixel(&self.viewport.center);
                let new_center = self.viewport.pixel_to_lat_lng(&Point::new(
                    center_px.x - delta.x as f64,
                    center_px.y - delta.y as f64,
                ));
                self.viewport.set_center(new_center);
            }
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.viewport.set_zoom(self.viewport.zoom + scroll as f64 * 0.002);
            }

            if let Err(err) = self.overlay.show(ui, &self.viewport) {
                log::error!("overlay pass failed: {err}");
            }

            let status = match self.state.lock() {
                Ok(state) => match &state.selected_event {
                    Some(id) => format!("selected: {id}  (zoom {:.1})", self.viewport.zoom),
                    None => format!("click a marker  (zoom {:.1})", self.viewport.zoom),
                },
                Err(_) => String::new(),
            };
            ui.painter().text(
                rect.left_top() + egui::vec2(8.0, 8.0),
                egui::Align2::LEFT_TOP,
                status,
                egui::FontId::proportional(12.0),
                egui::Color32::from_gray(80),
            );
        });
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    eframe::run_native(
        "pinlay — marker overlay demo",
        eframe::NativeOptions::default(),
        Box::new(|_cc| Box::new(OverlayDemo::new())),
    )
}
