use super::model::{NormalizedListing, RawListing};

/// Removed from `price` before extracting digits: currency sign and
/// space-like thousands separators (space, NBSP, narrow NBSP).
pub const PRICE_SYMBOLS: &[&str] = &["€", " ", "\u{a0}", "\u{202f}"];

/// Removed from `mileage` before extracting digits.
pub const MILEAGE_SYMBOLS: &[&str] = &["km", " ", "\u{a0}", "\u{202f}"];

/// Extract the integer from a human-formatted string such as `"12 345 €"`.
///
/// Every symbol in `strip_symbols` is removed first, then `.` and `,` are
/// dropped where they group thousands (between a digit and exactly three
/// digits), then the first run of ASCII digits is parsed. Any other `.` or
/// `,` ends the run, so `"9999.99 €"` reads as 9999. Returns `None` when the
/// cleaned string has no digit or the run does not fit in an `i64`.
pub fn normalize_numeric(raw: &str, strip_symbols: &[&str]) -> Option<i64> {
    let stripped = strip_symbols
        .iter()
        .filter(|sym| !sym.is_empty())
        .fold(raw.to_owned(), |acc, sym| acc.replace(sym, ""));
    let cleaned = drop_group_separators(&stripped);

    let start = cleaned.find(|c: char| c.is_ascii_digit())?;
    let run = &cleaned[start..];
    let end = run
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(run.len());

    match run[..end].parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => {
            log::debug!("Ignoring numeric value in {raw:?}: {e}");
            None
        }
    }
}

/// Remove `.`/`,` preceded by a digit and followed by exactly three digits.
fn drop_group_separators(s: &str) -> String {
    let bytes = s.as_bytes();
    let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);

    s.char_indices()
        .filter(|&(i, c)| {
            let grouping = matches!(c, '.' | ',')
                && i > 0
                && digit_at(i - 1)
                && (1..=3).all(|k| digit_at(i + k))
                && !digit_at(i + 4);
            !grouping
        })
        .map(|(_, c)| c)
        .collect()
}

/// A year is usable only when the whole string is digits (`"2019"`, not
/// `" 2019"`, `"2019.5"` or `"N/A"`).
pub fn parse_year(raw: &str) -> Option<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Derive the numeric fields of a raw record.
pub fn normalize_listing(raw: RawListing) -> NormalizedListing {
    NormalizedListing {
        price_num: normalize_numeric(&raw.price, PRICE_SYMBOLS),
        mileage_num: normalize_numeric(&raw.mileage, MILEAGE_SYMBOLS),
        year_num: parse_year(&raw.year),
        raw,
    }
}
