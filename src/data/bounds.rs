use std::collections::BTreeSet;

use super::model::{ListingCollection, NormalizedListing, RawListing};

/// Upper price bound used when no listing has a parseable price.
pub const PRICE_FALLBACK_MAX: i64 = 60_000;

/// Domain of the `ai_note` rating.
pub const NOTE_DOMAIN: (i64, i64) = (1, 5);

// ---------------------------------------------------------------------------
// Range bounds
// ---------------------------------------------------------------------------

/// `(min, max)` over the present values returned by `accessor`,
/// or `None` when every value is absent.
pub fn numeric_bounds<T, F>(listings: &ListingCollection, accessor: F) -> Option<(T, T)>
where
    T: Ord + Copy,
    F: Fn(&NormalizedListing) -> Option<T>,
{
    listings
        .iter()
        .filter_map(|l| accessor(l))
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Default widget domains for one dataset snapshot.
///
/// `year` and `mileage` are `None` when the dataset has no usable value;
/// the corresponding filter is then inactive instead of wide open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetBounds {
    /// Always starts at 0; the maximum falls back to [`PRICE_FALLBACK_MAX`].
    pub price: (i64, i64),
    pub year: Option<(i32, i32)>,
    pub mileage: Option<(i64, i64)>,
    /// Sorted distinct non-empty values, one list per categorical field.
    pub fuel_types: Vec<String>,
    pub transmissions: Vec<String>,
    pub body_types: Vec<String>,
}

impl Default for DatasetBounds {
    fn default() -> Self {
        Self {
            price: (0, PRICE_FALLBACK_MAX),
            year: None,
            mileage: None,
            fuel_types: Vec::new(),
            transmissions: Vec::new(),
            body_types: Vec::new(),
        }
    }
}

impl DatasetBounds {
    pub fn compute(listings: &ListingCollection) -> Self {
        let price_max = numeric_bounds(listings, |l| l.price_num)
            .map(|(_, hi)| hi)
            .unwrap_or(PRICE_FALLBACK_MAX);

        Self {
            price: (0, price_max),
            year: numeric_bounds(listings, |l| l.year_num),
            mileage: numeric_bounds(listings, |l| l.mileage_num),
            fuel_types: distinct_values(listings, |r| &r.fuel_type),
            transmissions: distinct_values(listings, |r| &r.transmission),
            body_types: distinct_values(listings, |r| &r.body_type),
        }
    }
}

fn distinct_values<F>(listings: &ListingCollection, field: F) -> Vec<String>
where
    F: Fn(&RawListing) -> &String,
{
    listings
        .iter()
        .map(|l| field(&l.raw))
        .filter(|v| !v.is_empty())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(price: &str, year: &str, mileage: &str, fuel: &str) -> RawListing {
        RawListing {
            title: "car".into(),
            price: price.into(),
            year: year.into(),
            mileage: mileage.into(),
            fuel_type: fuel.into(),
            ai_note: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn bounds_cover_present_values_only() {
        let listings = ListingCollection::from_raw(vec![
            listing("5 000 €", "2015", "n/a", "diesel"),
            listing("n/a", "N/A", "90 000 km", "petrol"),
            listing("18 000 €", "2022", "12 000 km", "diesel"),
        ]);
        let bounds = DatasetBounds::compute(&listings);
        assert_eq!(bounds.price, (0, 18000));
        assert_eq!(bounds.year, Some((2015, 2022)));
        assert_eq!(bounds.mileage, Some((12000, 90000)));
        assert_eq!(bounds.fuel_types, vec!["diesel", "petrol"]);
        assert!(bounds.transmissions.is_empty());
    }

    #[test]
    fn unparseable_fields_fall_back_or_disappear() {
        let listings = ListingCollection::from_raw(vec![listing("on request", "N/A", "", "")]);
        let bounds = DatasetBounds::compute(&listings);
        assert_eq!(bounds.price, (0, PRICE_FALLBACK_MAX));
        assert_eq!(bounds.year, None);
        assert_eq!(bounds.mileage, None);
    }

    #[test]
    fn empty_collection_has_no_numeric_bounds() {
        let empty = ListingCollection::default();
        assert_eq!(numeric_bounds(&empty, |l| l.price_num), None);
        assert_eq!(DatasetBounds::compute(&empty), DatasetBounds::default());
    }
}
