//! Lenient parsers for rating text, review counts and map coordinates.
//!
//! None of these fail loudly: unusable input yields `None`.

use std::sync::LazyLock;

use regex::Regex;

/// Marker that introduces the `@lat,lon,zoom` segment of a maps location.
pub const COORDINATE_MARKER: &str = "/@";

static RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:[.,][0-9]+)?").expect("valid regex"));

/// Parses the first integer-or-decimal token of a rating label.
///
/// Accepts `.` or `,` as the decimal separator: `"4.3-звездочные"` and
/// `"4,5 из 5"` both parse; `"нет данных"` does not.
#[must_use]
pub fn parse_rating(text: &str) -> Option<f64> {
    let token = RATING_RE.find(text)?.as_str().replace(',', ".");
    token.parse::<f64>().ok()
}

/// Parses a review count by concatenating every ASCII digit in `text`.
///
/// `"123 отзыва"` gives 123 and `"1,234 reviews"` gives 1234. Unrelated
/// digit groups are glued together as well (`"12 из 34"` gives 1234); the
/// count labels this reads normally carry a single number. Returns `None`
/// when there are no digits or the result overflows `u64`.
#[must_use]
pub fn parse_reviews_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok()
}

/// Extracts `(latitude, longitude)` from a maps location such as
/// `https://www.google.com/maps/place/.../@51.16,71.47,17z/...`.
///
/// Uses the segment after the last [`COORDINATE_MARKER`]. Any failure
/// (no marker, fewer than two components, non-numeric or non-finite
/// values) yields `None` for the pair as a whole.
#[must_use]
pub fn extract_coordinates_from_url(url: &str) -> Option<(f64, f64)> {
    let (_, after_marker) = url.rsplit_once(COORDINATE_MARKER)?;
    let segment = after_marker.split('/').next().unwrap_or(after_marker);
    let mut parts = segment.split(',');
    let lat = parse_coordinate(parts.next()?)?;
    let lon = parse_coordinate(parts.next()?)?;
    Some((lat, lon))
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
