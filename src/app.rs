use std::time::Duration;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{listings, panels, plot};

/// Poll interval while a background load is running.
const LOADING_REPAINT: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ListingsApp {
    pub state: AppState,
}

impl ListingsApp {
    pub fn new(mut state: AppState) -> Self {
        state.request_load();
        Self { state }
    }
}

impl eframe::App for ListingsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll();
        self.state.refresh_if_stale();

        // Wake up for the loader result, or when the snapshot expires.
        match self.state.time_until_refresh() {
            None => ctx.request_repaint_after(LOADING_REPAINT),
            Some(wait) => ctx.request_repaint_after(wait),
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters & sorting ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // Widgets above may have changed the criteria.
        self.state.refresh_results();

        // ---- Central panel: search, metrics, chart, listings ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::search_bar(ui, &mut self.state);
            self.state.refresh_results();
            ui.add_space(6.0);

            ui.horizontal(|ui| {
                panels::metrics(ui, &self.state);
                plot::note_chart(ui, &mut self.state);
            });
            self.state.refresh_results();
            ui.separator();

            listings::listing_area(ui, &mut self.state);
        });
    }
}
