use eframe::egui::{self, Align, Layout, RichText, ScrollArea, TextStyle, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{ListingCollection, NormalizedListing};
use crate::state::{AppState, ListingView};

// ---------------------------------------------------------------------------
// Listing results (central panel, below the metrics)
// ---------------------------------------------------------------------------

pub fn listing_area(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("📋 Listings");
        ui.with_layout(Layout::right_to_left(Align::Center), |ui: &mut Ui| {
            ui.selectable_value(&mut state.view, ListingView::Table, "Table");
            ui.selectable_value(&mut state.view, ListingView::Cards, "Cards");
        });
    });

    if state.catalog.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Waiting for listings  (File → Open… for a local file)");
        });
        return;
    }

    let listings = &state.output.listings;
    if listings.is_empty() {
        ui.label("No listings match the current filters.");
        return;
    }

    match state.view {
        ListingView::Cards => cards(ui, listings),
        ListingView::Table => table(ui, listings),
    }
}

fn cards(ui: &mut Ui, listings: &ListingCollection) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for listing in listings {
                card(ui, listing);
                ui.add_space(8.0);
            }
        });
}

fn card(ui: &mut Ui, listing: &NormalizedListing) {
    let raw = &listing.raw;
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        title_link(ui, listing, RichText::new(title_text(listing)).heading());

        meta_line(ui, "💰 Price:", &raw.price);
        let note = raw
            .ai_note
            .map(|n| format!("{n}/5"))
            .unwrap_or_else(|| "not available".to_string());
        meta_line(ui, "⭐ Note:", &note);
        meta_line(ui, "📅 Year:", &raw.year);
        meta_line(ui, "📍 City:", &raw.city);
        meta_line(ui, "🛣 Mileage:", &raw.mileage);
        meta_line(ui, "⛽ Fuel:", &raw.fuel_type);
        meta_line(ui, "⚙ Transmission:", &raw.transmission);
        meta_line(ui, "🚗 Body type:", &raw.body_type);

        if let Some(comment) = displayable(&raw.ai_comment) {
            ui.add_space(4.0);
            ui.label(format!("📝 {comment}"));
        }
    });
}

fn table(ui: &mut Ui, listings: &ListingCollection) {
    let row_height = TextStyle::Body.resolve(ui.style()).size + 6.0;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::initial(260.0).at_least(120.0).clip(true))
        .columns(Column::auto(), 6)
        .column(Column::remainder())
        .header(22.0, |mut header| {
            for name in ["Title", "Price", "Note", "Year", "Mileage", "Fuel", "Transmission", "City"] {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(row_height, listings.len(), |mut row| {
                let listing = &listings.as_slice()[row.index()];
                let raw = &listing.raw;
                row.col(|ui| {
                    title_link(ui, listing, RichText::new(title_text(listing)));
                });
                for value in [
                    raw.price.clone(),
                    raw.ai_note.map(|n| n.to_string()).unwrap_or_default(),
                    raw.year.clone(),
                    raw.mileage.clone(),
                    raw.fuel_type.clone(),
                    raw.transmission.clone(),
                    raw.city.clone(),
                ] {
                    row.col(|ui| {
                        ui.label(displayable(&value).unwrap_or(""));
                    });
                }
            });
        });
}

fn title_text(listing: &NormalizedListing) -> &str {
    displayable(&listing.raw.title).unwrap_or("Untitled listing")
}

fn title_link(ui: &mut Ui, listing: &NormalizedListing, text: RichText) {
    let url = listing.raw.url.trim();
    if url.is_empty() {
        ui.label(text);
    } else {
        ui.hyperlink_to(text, url);
    }
}

/// One `label value` row, skipped when the value is empty or "N/A".
fn meta_line(ui: &mut Ui, label: &str, value: &str) {
    if let Some(value) = displayable(value) {
        ui.horizontal(|ui: &mut Ui| {
            ui.strong(label);
            ui.label(value);
        });
    }
}

/// `None` for blank values and the feed's "N/A" placeholder.
fn displayable(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty() && !value.eq_ignore_ascii_case("n/a")).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_not_displayed() {
        assert_eq!(displayable("  "), None);
        assert_eq!(displayable("N/A"), None);
        assert_eq!(displayable("n/a"), None);
        assert_eq!(displayable(" Diesel "), Some("Diesel"));
    }
}
