use std::fmt;
use std::sync::Arc;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use super::bounds::{DatasetBounds, NOTE_DOMAIN};
use super::normalize::normalize_listing;

// ---------------------------------------------------------------------------
// RawListing – one record as received from the dataset source
// ---------------------------------------------------------------------------

/// A classified-ad record exactly as published by the source.
///
/// `title`, `price` and `ai_note` must be present; every other key falls back
/// to an empty string. String fields also accept JSON numbers and `null`,
/// since the scraped feed is not consistent about `year` in particular.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    /// Human-formatted, e.g. `"12 345 €"`.
    #[serde(deserialize_with = "lenient_string")]
    pub price: String,
    /// Human-formatted, e.g. `"123 456 km"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub mileage: String,
    /// Usually a four-digit year, sometimes `"N/A"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuel_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transmission: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub body_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ai_comment: String,
    /// Rating from 1 to 5. Absent when the source has `null`, a non-integral
    /// value or a value outside [`NOTE_DOMAIN`].
    #[serde(deserialize_with = "lenient_note")]
    pub ai_note: Option<i64>,
}

// -- Lenient field decoding --

struct LenientString;

impl<'de> Visitor<'de> for LenientString {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, a number or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(float_text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(self)
    }
}

/// Text form of a float cell. Integral values drop the fraction so that
/// 2019.0 stays a parseable year; others keep two truncated decimals, which
/// never look like a thousands group.
pub(crate) fn float_text(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    if v.fract() == 0.0 {
        return format!("{v:.0}");
    }
    let cents = (v.fract().abs() * 100.0).trunc();
    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}{:.0}.{cents:02.0}", v.trunc().abs())
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(LenientString)
}

struct LenientNote;

impl<'de> Visitor<'de> for LenientNote {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer note, a numeric string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Option<i64>, E> {
        Ok(in_note_domain(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Option<i64>, E> {
        Ok(i64::try_from(v).ok().and_then(in_note_domain))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Option<i64>, E> {
        Ok(whole_number(v).and_then(in_note_domain))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Option<i64>, E> {
        Ok(parse_note(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Option<i64>, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Option<i64>, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Option<i64>, D::Error> {
        deserializer.deserialize_any(self)
    }
}

/// Note from its text form: `"4"`, `" 4 "` and `"4.0"` all read as 4.
pub(crate) fn parse_note(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(whole_number))
        .and_then(in_note_domain)
}

fn whole_number(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

fn in_note_domain(note: i64) -> Option<i64> {
    let (lo, hi) = NOTE_DOMAIN;
    (lo..=hi).contains(&note).then_some(note)
}

fn lenient_note<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    deserializer.deserialize_any(LenientNote)
}

// ---------------------------------------------------------------------------
// NormalizedListing – raw record plus derived numbers
// ---------------------------------------------------------------------------

/// A listing with its numeric fields extracted once at load time.
/// The raw strings are kept untouched for display.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedListing {
    pub raw: RawListing,
    /// First digit run of `price`, if any.
    pub price_num: Option<i64>,
    /// First digit run of `mileage`, if any.
    pub mileage_num: Option<i64>,
    /// `year` when it is a plain integer string.
    pub year_num: Option<i32>,
}

impl NormalizedListing {
    pub fn ai_note(&self) -> Option<i64> {
        self.raw.ai_note
    }
}

// ---------------------------------------------------------------------------
// ListingCollection – an ordered, immutable stage result
// ---------------------------------------------------------------------------

/// Ordered listings. Stages never mutate a collection; they build a new one
/// sharing the same `Arc`ed listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingCollection {
    listings: Vec<Arc<NormalizedListing>>,
}

impl ListingCollection {
    /// Normalize raw records, preserving source order.
    pub fn from_raw(raw: impl IntoIterator<Item = RawListing>) -> Self {
        raw.into_iter()
            .map(|r| Arc::new(normalize_listing(r)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<NormalizedListing>> {
        self.listings.iter()
    }

    pub fn as_slice(&self) -> &[Arc<NormalizedListing>] {
        &self.listings
    }

    /// New collection holding the listings that satisfy `keep`, in order.
    pub fn retain_where(&self, keep: impl Fn(&NormalizedListing) -> bool) -> Self {
        self.listings
            .iter()
            .filter(|l| keep(l))
            .cloned()
            .collect()
    }
}

impl From<Vec<Arc<NormalizedListing>>> for ListingCollection {
    fn from(listings: Vec<Arc<NormalizedListing>>) -> Self {
        Self { listings }
    }
}

impl FromIterator<Arc<NormalizedListing>> for ListingCollection {
    fn from_iter<I: IntoIterator<Item = Arc<NormalizedListing>>>(iter: I) -> Self {
        Self {
            listings: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ListingCollection {
    type Item = &'a Arc<NormalizedListing>;
    type IntoIter = std::slice::Iter<'a, Arc<NormalizedListing>>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.iter()
    }
}

// ---------------------------------------------------------------------------
// SortKey
// ---------------------------------------------------------------------------

/// Numeric field a collection can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    Price,
    Note,
    Year,
    Mileage,
}

impl SortKey {
    /// The listing's value for this key, `None` when absent or unparseable.
    pub fn value_of(self, listing: &NormalizedListing) -> Option<i64> {
        match self {
            SortKey::Price => listing.price_num,
            SortKey::Note => listing.ai_note(),
            SortKey::Year => listing.year_num.map(i64::from),
            SortKey::Mileage => listing.mileage_num,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::Price => "price_num",
            SortKey::Note => "ai_note",
            SortKey::Year => "year",
            SortKey::Mileage => "mileage_num",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Catalog – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The normalized dataset with pre-computed filter bounds.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// All listings in source order.
    pub listings: ListingCollection,
    /// Slider domains and categorical options derived from `listings`.
    pub bounds: DatasetBounds,
}

impl Catalog {
    /// Normalize the raw records and compute their bounds.
    pub fn from_raw(raw: Vec<RawListing>) -> Self {
        let listings = ListingCollection::from_raw(raw);
        let bounds = DatasetBounds::compute(&listings);
        Catalog { listings, bounds }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_numbers_and_nulls_into_strings() {
        let raw: RawListing = serde_json::from_str(
            r#"{"title": "Clio", "price": 9500, "year": 2019.0, "mileage": null, "ai_note": 4}"#,
        )
        .unwrap();
        assert_eq!(raw.price, "9500");
        assert_eq!(raw.year, "2019");
        assert_eq!(raw.mileage, "");
        assert_eq!(raw.city, "");
        assert_eq!(raw.ai_note, Some(4));
    }

    #[test]
    fn note_accepts_strings_and_rejects_fractions() {
        let parse = |note: &str| {
            let json = format!(r#"{{"title": "t", "price": "1", "ai_note": {note}}}"#);
            serde_json::from_str::<RawListing>(&json).unwrap().ai_note
        };
        assert_eq!(parse("\"3\""), Some(3));
        assert_eq!(parse("5.0"), Some(5));
        assert_eq!(parse("3.5"), None);
        assert_eq!(parse("null"), None);
        assert_eq!(parse("\"\""), None);
    }

    #[test]
    fn notes_outside_the_rating_domain_are_absent() {
        let listings = crate::data::loader::parse_json(
            r#"[
                {"title": "a", "price": "1", "ai_note": 9223372036854775807},
                {"title": "b", "price": "1", "ai_note": 0},
                {"title": "c", "price": "1", "ai_note": "6"},
                {"title": "d", "price": "1", "ai_note": 1}
            ]"#,
        )
        .unwrap();
        let notes: Vec<Option<i64>> = listings.iter().map(|l| l.ai_note).collect();
        assert_eq!(notes, vec![None, None, None, Some(1)]);
    }

    #[test]
    fn parse_note_shares_decoding_rules() {
        assert_eq!(parse_note(" 4 "), Some(4));
        assert_eq!(parse_note("4.0"), Some(4));
        assert_eq!(parse_note("4.5"), None);
        assert_eq!(parse_note("N/A"), None);
        assert_eq!(parse_note("12"), None);
    }

    #[test]
    fn fractional_numbers_keep_their_integer_part() {
        let raw: RawListing =
            serde_json::from_str(r#"{"title": "t", "price": 9500.5, "mileage": 1234.567, "ai_note": 3}"#)
                .unwrap();
        assert_eq!(raw.price, "9500.50");
        assert_eq!(raw.mileage, "1234.56");

        let listing = normalize_listing(raw);
        assert_eq!(listing.price_num, Some(9500));
        assert_eq!(listing.mileage_num, Some(1234));
    }

    #[test]
    fn float_text_never_gains_digits() {
        assert_eq!(float_text(2019.0), "2019");
        assert_eq!(float_text(9999.999), "9999.99");
        assert_eq!(float_text(-0.5), "-0.50");
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let err = serde_json::from_str::<RawListing>(r#"{"title": "t", "ai_note": 2}"#).unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn sort_key_reads_parsed_values() {
        let listings = ListingCollection::from_raw(vec![RawListing {
            title: "a".into(),
            price: "7 000 €".into(),
            year: "N/A".into(),
            mileage: "80 000 km".into(),
            ai_note: Some(2),
            ..Default::default()
        }]);
        let l = &listings.as_slice()[0];
        assert_eq!(SortKey::Price.value_of(l), Some(7000));
        assert_eq!(SortKey::Note.value_of(l), Some(2));
        assert_eq!(SortKey::Year.value_of(l), None);
        assert_eq!(SortKey::Mileage.value_of(l), Some(80000));
    }

    #[test]
    fn retain_where_leaves_input_untouched() {
        let all = ListingCollection::from_raw(vec![
            RawListing { title: "a".into(), ai_note: Some(1), ..Default::default() },
            RawListing { title: "b".into(), ai_note: Some(5), ..Default::default() },
        ]);
        let high = all.retain_where(|l| l.ai_note() == Some(5));
        assert_eq!(all.len(), 2);
        assert_eq!(high.len(), 1);
        assert_eq!(high.as_slice()[0].raw.title, "b");
    }
}
