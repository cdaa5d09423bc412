use std::collections::BTreeMap;

use super::model::ListingCollection;

/// Headline figures for a listing collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub count: usize,
    /// `None` when no listing carries a note.
    pub mean_note: Option<f64>,
    /// Occurrences per note value, ascending by note.
    pub note_histogram: BTreeMap<i64, usize>,
}

impl Summary {
    /// Percentage of noted listings that fall in the `note` bucket.
    pub fn share(&self, note: i64) -> Option<f64> {
        let total: usize = self.note_histogram.values().sum();
        if total == 0 {
            return None;
        }
        let n = self.note_histogram.get(&note).copied().unwrap_or(0);
        Some(n as f64 / total as f64 * 100.0)
    }

    /// `"3.50 / 5"`, or a dash when the mean is undefined.
    pub fn mean_note_label(&self) -> String {
        match self.mean_note {
            Some(mean) => format!("{mean:.2} / 5"),
            None => "–".to_string(),
        }
    }
}

pub fn summarize(listings: &ListingCollection) -> Summary {
    let mut note_histogram = BTreeMap::new();
    let mut sum = 0.0f64;
    let mut noted = 0usize;

    for note in listings.iter().filter_map(|l| l.ai_note()) {
        *note_histogram.entry(note).or_insert(0) += 1;
        sum += note as f64;
        noted += 1;
    }

    Summary {
        count: listings.len(),
        mean_note: (noted > 0).then(|| sum / noted as f64),
        note_histogram,
    }
}
