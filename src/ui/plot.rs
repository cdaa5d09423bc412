use std::collections::BTreeMap;

use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::note_color;
use crate::state::AppState;

const BAR_WIDTH: f64 = 0.7;

// ---------------------------------------------------------------------------
// Note distribution chart
// ---------------------------------------------------------------------------

/// Bar chart of the note histogram of the current result, red → green.
/// Clicking a bar narrows the list to that note.
pub fn note_chart(ui: &mut Ui, state: &mut AppState) {
    ui.vertical(|ui: &mut Ui| {
        if let Some(note) = state.note_focus() {
            ui.horizontal(|ui: &mut Ui| {
                ui.label(RichText::new(format!("Listings rated {note}/5")).strong());
                if ui.button("Show all notes").clicked() {
                    state.clear_note_focus();
                }
            });
        }

        let summary = &state.output.summary;
        if summary.note_histogram.is_empty() {
            ui.label("No notes to chart.");
            return;
        }

        let bars: Vec<Bar> = summary
            .note_histogram
            .iter()
            .map(|(&note, &count)| {
                let share = summary.share(note).unwrap_or(0.0);
                Bar::new(note as f64, count as f64)
                    .name(format!("Note {note}/5: {count} listings ({share:.2}%)"))
                    .fill(note_color(note))
                    .width(BAR_WIDTH)
            })
            .collect();

        let clicked = Plot::new("note_histogram")
            .height(200.0)
            .x_axis_label("Note")
            .y_axis_label("Listings")
            .allow_boxed_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Note distribution"));
                if !plot_ui.response().clicked() {
                    return None;
                }
                let pointer = plot_ui.pointer_coordinate()?;
                bar_at(pointer.x, &summary.note_histogram)
            })
            .inner;

        if let Some(note) = clicked {
            log::debug!("Narrowing listings to note {note}");
            state.focus_note(note);
        }
    });
}

/// The note whose bar spans plot coordinate `x`.
fn bar_at(x: f64, histogram: &BTreeMap<i64, usize>) -> Option<i64> {
    let note = x.round();
    if (x - note).abs() > BAR_WIDTH / 2.0 {
        return None;
    }
    let note = note as i64;
    histogram.contains_key(&note).then_some(note)
}
