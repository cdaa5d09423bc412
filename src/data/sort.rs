use std::cmp::Ordering;
use std::sync::Arc;

use super::model::{ListingCollection, NormalizedListing, SortKey};

/// One entry of the "Sort by" menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortPreset {
    pub label: &'static str,
    pub key: SortKey,
    pub ascending: bool,
}

pub const SORT_PRESETS: [SortPreset; 8] = [
    SortPreset { label: "Price: low to high", key: SortKey::Price, ascending: true },
    SortPreset { label: "Price: high to low", key: SortKey::Price, ascending: false },
    SortPreset { label: "Note: low to high", key: SortKey::Note, ascending: true },
    SortPreset { label: "Note: high to low", key: SortKey::Note, ascending: false },
    SortPreset { label: "Year: newest first", key: SortKey::Year, ascending: false },
    SortPreset { label: "Year: oldest first", key: SortKey::Year, ascending: true },
    SortPreset { label: "Mileage: low to high", key: SortKey::Mileage, ascending: true },
    SortPreset { label: "Mileage: high to low", key: SortKey::Mileage, ascending: false },
];

impl SortPreset {
    /// The preset matching a key/direction pair, if any.
    pub fn find(key: SortKey, ascending: bool) -> Option<&'static SortPreset> {
        SORT_PRESETS
            .iter()
            .find(|p| p.key == key && p.ascending == ascending)
    }
}

/// Stable sort on `key`. Listings without a value for `key` go last,
/// whichever the direction.
pub fn apply(listings: &ListingCollection, key: SortKey, ascending: bool) -> ListingCollection {
    let mut sorted: Vec<Arc<NormalizedListing>> = listings.as_slice().to_vec();
    sorted.sort_by(|a, b| compare(key.value_of(a), key.value_of(b), ascending));
    sorted.into()
}

fn compare(a: Option<i64>, b: Option<i64>, ascending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if ascending => a.cmp(&b),
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
