use std::collections::BTreeSet;

use eframe::egui::{self, emath::Numeric, Color32, DragValue, RichText, ScrollArea, Slider, Ui};

use crate::data::bounds::NOTE_DOMAIN;
use crate::data::filter::FilterCriteria;
use crate::data::sort::{SortPreset, SORT_PRESETS};
use crate::source::FileSource;
use crate::state::AppState;

/// Slider granularity of the price range, in euros.
const PRICE_STEP: f64 = 500.0;

/// Slider granularity of the mileage range, in kilometres.
const MILEAGE_STEP: f64 = 1000.0;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filters & sorting");
    ui.separator();

    let bounds = match &state.catalog {
        Some(catalog) => catalog.bounds.clone(),
        None => {
            ui.label(if state.loading() {
                "Loading listings…"
            } else {
                "No dataset loaded."
            });
            return;
        }
    };

    let mut reset = false;
    let criteria = &mut state.criteria;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.checkbox(&mut criteria.bypass, "Show all listings (ignore filters)");
            ui.separator();

            ui.add_enabled_ui(!criteria.bypass, |ui: &mut Ui| {
                range_sliders(ui, "💰 Price (€)", &mut criteria.price_range, bounds.price, PRICE_STEP);
                range_sliders(ui, "⭐ Note", &mut criteria.note_range, NOTE_DOMAIN, 1.0);

                // Year / mileage widgets only exist when the data has values for them.
                if let (Some(range), Some(domain)) = (criteria.year_range.as_mut(), bounds.year) {
                    range_sliders(ui, "📅 Year", range, domain, 1.0);
                }
                if let (Some(range), Some(domain)) =
                    (criteria.mileage_range.as_mut(), bounds.mileage)
                {
                    range_sliders(ui, "🛣 Mileage (km)", range, domain, MILEAGE_STEP);
                }
                ui.separator();

                multi_select(ui, "⛽ Fuel", &bounds.fuel_types, &mut criteria.fuel_types);
                multi_select(
                    ui,
                    "⚙ Transmission",
                    &bounds.transmissions,
                    &mut criteria.transmissions,
                );
                multi_select(ui, "🚗 Body type", &bounds.body_types, &mut criteria.body_types);
            });
            ui.separator();

            sort_selector(ui, criteria);
            ui.separator();

            if ui.button("Reset filters").clicked() {
                reset = true;
            }
        });

    if reset {
        state.reset_filters();
    }
}

/// Number inputs plus two sliders editing an inclusive `(min, max)` pair
/// inside `domain`. Sliders snap to `step`; the inputs accept any value.
fn range_sliders<T: Numeric>(
    ui: &mut Ui,
    label: &str,
    range: &mut (T, T),
    domain: (T, T),
    step: f64,
) {
    ui.strong(label);
    let (lo, hi) = domain;

    let (mut min_changed, mut max_changed) = (false, false);
    ui.horizontal(|ui: &mut Ui| {
        ui.label("from");
        min_changed |= ui.add(DragValue::new(&mut range.0).range(lo..=hi)).changed();
        ui.label("to");
        max_changed |= ui.add(DragValue::new(&mut range.1).range(lo..=hi)).changed();
    });
    min_changed |= ui
        .add(Slider::new(&mut range.0, lo..=hi).step_by(step).text("min"))
        .changed();
    max_changed |= ui
        .add(Slider::new(&mut range.1, lo..=hi).step_by(step).text("max"))
        .changed();

    keep_ordered(range, min_changed, max_changed);
    ui.add_space(4.0);
}

/// Keep min <= max, moving whichever bound the user did not touch.
fn keep_ordered<T: PartialOrd + Copy>(range: &mut (T, T), min_changed: bool, max_changed: bool) {
    if range.0 > range.1 {
        if min_changed || !max_changed {
            range.1 = range.0;
        } else {
            range.0 = range.1;
        }
    }
}

/// Collapsible checkbox list. Nothing checked means no restriction.
fn multi_select(ui: &mut Ui, label: &str, options: &[String], selected: &mut BTreeSet<String>) {
    let header_text = if selected.is_empty() {
        format!("{label}  (all)")
    } else {
        format!("{label}  ({}/{})", selected.len(), options.len())
    };

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(label)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if options.is_empty() {
                ui.weak("No values in this dataset");
                return;
            }
            if ui.small_button("Clear").clicked() {
                selected.clear();
            }
            for option in options {
                let mut checked = selected.contains(option);
                if ui.checkbox(&mut checked, option.as_str()).changed() {
                    if checked {
                        selected.insert(option.clone());
                    } else {
                        selected.remove(option);
                    }
                }
            }
        });
}

fn sort_selector(ui: &mut Ui, criteria: &mut FilterCriteria) {
    ui.strong("📌 Sort by");
    let current = SortPreset::find(criteria.sort_key, criteria.sort_ascending)
        .map(|p| p.label)
        .unwrap_or_default();

    egui::ComboBox::from_id_salt("sort_by")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            for preset in &SORT_PRESETS {
                let is_current =
                    preset.key == criteria.sort_key && preset.ascending == criteria.sort_ascending;
                if ui.selectable_label(is_current, preset.label).clicked() {
                    criteria.sort_key = preset.key;
                    criteria.sort_ascending = preset.ascending;
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Central panel – search and metrics
// ---------------------------------------------------------------------------

/// Free-text search, active even when filters are bypassed.
pub fn search_bar(ui: &mut Ui, state: &mut AppState) {
    ui.add(
        egui::TextEdit::singleline(&mut state.criteria.search_query)
            .hint_text("🔎 Search title, description or comment…")
            .desired_width(f32::INFINITY),
    );
}

pub fn metrics(ui: &mut Ui, state: &AppState) {
    let summary = &state.output.summary;
    ui.vertical(|ui: &mut Ui| {
        ui.set_min_width(180.0);
        ui.label("Total listings");
        ui.label(RichText::new(summary.count.to_string()).size(28.0).strong());
        ui.add_space(8.0);
        ui.label("Average note");
        ui.label(RichText::new(summary.mean_note_label()).size(28.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if state.loading() {
            ui.spinner();
            ui.label("Loading…");
        } else if let Some(catalog) = &state.catalog {
            ui.label(format!(
                "{} listings loaded, {} shown",
                catalog.len(),
                state.output.listings.len()
            ));
        }

        ui.separator();
        ui.weak(state.source_name());

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening listings file {}", path.display());
        state.set_source(Box::new(FileSource::new(path)));
    }
}
