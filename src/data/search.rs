use super::model::{ListingCollection, NormalizedListing};

/// Narrow `listings` to those whose title, description or AI comment
/// contains `query`, case-insensitively. A blank query keeps everything.
pub fn apply(listings: &ListingCollection, query: &str) -> ListingCollection {
    // Whitespace-only queries count as blank rather than matching spaces.
    if query.trim().is_empty() {
        return listings.clone();
    }
    let needle = query.to_lowercase();
    listings.retain_where(|l| matches(l, &needle))
}

/// `needle` must already be lower-cased.
fn matches(listing: &NormalizedListing, needle: &str) -> bool {
    let raw = &listing.raw;
    [&raw.title, &raw.description, &raw.ai_comment]
        .iter()
        .any(|text| text.to_lowercase().contains(needle))
}
