use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::bounds::NOTE_DOMAIN;

// ---------------------------------------------------------------------------
// Note colour scale: red (worst) → green (best)
// ---------------------------------------------------------------------------

const WORST_HUE: f32 = 0.0;
const BEST_HUE: f32 = 120.0;

/// Colour for a rating, on an evenly spaced hue ramp over [`NOTE_DOMAIN`].
/// Out-of-domain notes are clamped.
pub fn note_color(note: i64) -> Color32 {
    let (lo, hi) = NOTE_DOMAIN;
    let t = (note.clamp(lo, hi) - lo) as f32 / (hi - lo) as f32;
    hue_to_color32(WORST_HUE + t * (BEST_HUE - WORST_HUE))
}

fn hue_to_color32(hue: f32) -> Color32 {
    let hsl = Hsl::new(hue, 0.75, 0.55);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_note_is_red_best_is_green() {
        let worst = note_color(1);
        let best = note_color(5);
        assert!(worst.r() > worst.g());
        assert!(best.g() > best.r());
    }

    #[test]
    fn notes_outside_domain_are_clamped() {
        assert_eq!(note_color(0), note_color(1));
        assert_eq!(note_color(9), note_color(5));
    }
}
