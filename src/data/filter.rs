use std::collections::BTreeSet;

use super::bounds::{DatasetBounds, NOTE_DOMAIN, PRICE_FALLBACK_MAX};
use super::model::{ListingCollection, NormalizedListing, SortKey};

// ---------------------------------------------------------------------------
// Filter criteria: one immutable snapshot of the user's selections
// ---------------------------------------------------------------------------

/// Every constraint for one pipeline run. Built from the current widget
/// selections and passed by reference; never read from ambient state.
///
/// Ranges are inclusive `(min, max)` pairs. An empty categorical set means
/// "no restriction".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Skip every range and categorical predicate. Search still applies.
    pub bypass: bool,
    pub price_range: (i64, i64),
    pub note_range: (i64, i64),
    /// `None` when the dataset has no parseable year.
    pub year_range: Option<(i32, i32)>,
    /// `None` when the dataset has no parseable mileage.
    pub mileage_range: Option<(i64, i64)>,
    pub fuel_types: BTreeSet<String>,
    pub transmissions: BTreeSet<String>,
    pub body_types: BTreeSet<String>,
    pub search_query: String,
    pub sort_key: SortKey,
    pub sort_ascending: bool,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            bypass: false,
            price_range: (0, PRICE_FALLBACK_MAX),
            note_range: NOTE_DOMAIN,
            year_range: None,
            mileage_range: None,
            fuel_types: BTreeSet::new(),
            transmissions: BTreeSet::new(),
            body_types: BTreeSet::new(),
            search_query: String::new(),
            sort_key: SortKey::Price,
            sort_ascending: true,
        }
    }
}

impl FilterCriteria {
    /// Wide-open criteria spanning the whole dataset.
    pub fn from_bounds(bounds: &DatasetBounds) -> Self {
        Self {
            price_range: bounds.price,
            year_range: bounds.year,
            mileage_range: bounds.mileage,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Listings passing every active predicate, in input order.
/// With `bypass` set the input is returned as is.
pub fn apply(listings: &ListingCollection, criteria: &FilterCriteria) -> ListingCollection {
    if criteria.bypass {
        return listings.clone();
    }
    listings.retain_where(|l| matches(l, criteria))
}

/// A listing passes when:
/// * `price_num` is present and inside `price_range`
/// * `ai_note` is present and inside `note_range`
/// * `year_range` is unset, or the year parses and lies inside it
/// * `mileage_range` is unset, or `mileage_num` is present and inside it
/// * each non-empty categorical set contains the listing's value
pub fn matches(listing: &NormalizedListing, criteria: &FilterCriteria) -> bool {
    if !listing
        .price_num
        .is_some_and(|p| within(p, criteria.price_range))
    {
        return false;
    }
    if !listing
        .ai_note()
        .is_some_and(|n| within(n, criteria.note_range))
    {
        return false;
    }
    if let Some(range) = criteria.year_range {
        if !listing.year_num.is_some_and(|y| within(y, range)) {
            return false;
        }
    }
    if let Some(range) = criteria.mileage_range {
        if !listing.mileage_num.is_some_and(|m| within(m, range)) {
            return false;
        }
    }

    let raw = &listing.raw;
    allows(&criteria.fuel_types, &raw.fuel_type)
        && allows(&criteria.transmissions, &raw.transmission)
        && allows(&criteria.body_types, &raw.body_type)
}

fn within<T: PartialOrd>(value: T, (min, max): (T, T)) -> bool {
    min <= value && value <= max
}

fn allows(selected: &BTreeSet<String>, value: &str) -> bool {
    selected.is_empty() || selected.contains(value)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::model::RawListing;

    fn car(title: &str, price: &str, note: i64, year: &str, fuel: &str) -> RawListing {
        RawListing {
            title: title.into(),
            price: price.into(),
            ai_note: Some(note),
            year: year.into(),
            fuel_type: fuel.into(),
            ..Default::default()
        }
    }

    fn titles(listings: &ListingCollection) -> Vec<&str> {
        listings.iter().map(|l| l.raw.title.as_str()).collect()
    }

    fn fleet() -> ListingCollection {
        ListingCollection::from_raw(vec![
            car("clio", "10 000€", 4, "2019", "diesel"),
            car("zoe", "50 000€", 2, "2021", "electric"),
            car("golf", "n/a", 5, "2018", "petrol"),
            car("polo", "8 000€", 3, "N/A", "petrol"),
            RawListing {
                title: "twingo".into(),
                price: "6 000€".into(),
                ai_note: None,
                year: "2016".into(),
                ..Default::default()
            },
        ])
    }

    fn open_criteria() -> FilterCriteria {
        FilterCriteria {
            price_range: (0, 1_000_000),
            ..FilterCriteria::default()
        }
    }

    #[test]
    fn end_to_end_example_keeps_only_cheap_listing() {
        let listings = ListingCollection::from_raw(vec![
            car("first", "10 000€", 4, "2019", "diesel"),
            car("second", "50 000€", 2, "2021", "electric"),
        ]);
        let criteria = FilterCriteria {
            price_range: (0, 20000),
            note_range: (1, 5),
            ..FilterCriteria::default()
        };
        assert_eq!(titles(&apply(&listings, &criteria)), vec!["first"]);
    }

    #[test]
    fn absent_price_or_note_is_excluded() {
        let kept = apply(&fleet(), &open_criteria());
        assert_eq!(titles(&kept), vec!["clio", "zoe", "polo"]);
    }

    #[test]
    fn result_is_subset_in_input_order() {
        let all = fleet();
        let kept = apply(&all, &open_criteria());
        let mut cursor = all.iter();
        for listing in &kept {
            assert!(cursor.any(|l| Arc::ptr_eq(l, listing)));
        }
    }

    #[test]
    fn active_year_filter_drops_unparseable_years() {
        let criteria = FilterCriteria {
            year_range: Some((2000, 2030)),
            ..open_criteria()
        };
        assert_eq!(titles(&apply(&fleet(), &criteria)), vec!["clio", "zoe"]);
    }

    #[test]
    fn mileage_filter_needs_a_mileage() {
        let mut raw = car("clio", "10 000€", 4, "2019", "diesel");
        raw.mileage = "45 000 km".into();
        let listings = ListingCollection::from_raw(vec![raw, car("zoe", "9 000€", 3, "2021", "electric")]);
        let criteria = FilterCriteria {
            mileage_range: Some((0, 50_000)),
            ..open_criteria()
        };
        assert_eq!(titles(&apply(&listings, &criteria)), vec!["clio"]);
    }

    #[test]
    fn empty_category_set_is_unrestricted() {
        let with_empty = apply(&fleet(), &open_criteria());
        let petrol = FilterCriteria {
            fuel_types: BTreeSet::from(["petrol".to_string()]),
            ..open_criteria()
        };
        assert_eq!(with_empty.len(), 3);
        assert_eq!(titles(&apply(&fleet(), &petrol)), vec!["polo"]);
    }

    #[test]
    fn combined_filters_intersect_single_filters() {
        let all = fleet();
        let by_price = FilterCriteria {
            price_range: (0, 20_000),
            note_range: (1, 5),
            ..open_criteria()
        };
        let by_fuel = FilterCriteria {
            fuel_types: BTreeSet::from(["diesel".to_string(), "petrol".to_string()]),
            ..open_criteria()
        };
        let both = FilterCriteria {
            fuel_types: by_fuel.fuel_types.clone(),
            ..by_price.clone()
        };

        let price_only = apply(&all, &by_price);
        let fuel_only = apply(&all, &by_fuel);
        let intersection: Vec<&str> = titles(&price_only)
            .into_iter()
            .filter(|t| titles(&fuel_only).contains(t))
            .collect();
        assert_eq!(titles(&apply(&all, &both)), intersection);
    }

    #[test]
    fn bypass_returns_everything() {
        let criteria = FilterCriteria {
            bypass: true,
            price_range: (0, 1),
            fuel_types: BTreeSet::from(["hydrogen".to_string()]),
            ..FilterCriteria::default()
        };
        assert_eq!(apply(&fleet(), &criteria), fleet());
    }

    #[test]
    fn criteria_from_bounds_is_wide_open() {
        let all = fleet();
        let criteria = FilterCriteria::from_bounds(&DatasetBounds::compute(&all));
        assert_eq!(criteria.price_range, (0, 50000));
        assert_eq!(criteria.year_range, Some((2016, 2021)));
        assert_eq!(criteria.mileage_range, None);
        // golf lacks a price, polo a year, twingo a note
        assert_eq!(titles(&apply(&all, &criteria)), vec!["clio", "zoe"]);
    }
}
