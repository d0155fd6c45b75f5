//! Regex heuristics over a page's visible text

use crate::listing::Range;
use once_cell::sync::Lazy;
use regex::Regex;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("valid phone pattern"));

static RENT_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$\s*([\d,]+(?:\.\d+)?)\s*[–—-]\s*\$\s*([\d,]+(?:\.\d+)?)\s*(?:/\s*mo|per month|monthly)?")
        .expect("valid rent range pattern")
});

static RENT_SINGLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$?\s*([\d,]+(?:\.\d+)?)\s*(?:/\s*mo|per month|monthly)")
        .expect("valid rent pattern")
});

static BEDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*beds?").expect("valid beds pattern"));

static BATHS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*baths?").expect("valid baths pattern"));

static SQFT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([\d,]+)\s*(?:sq\.?\s*ft|square\s*feet)").expect("valid square feet pattern")
});

/// First North-American style phone number in the text
pub fn phone_number(text: &str) -> Option<String> {
    PHONE_RE.find(text).map(|m| m.as_str().to_string())
}

/// Monthly rent range
///
/// A `$min – $max` range wins; otherwise a single amount followed by a monthly marker is
/// used for both ends.
pub fn rent_range(text: &str) -> Option<Range> {
    if let Some(caps) = RENT_RANGE_RE.captures(text) {
        let min = parse_amount(&caps[1]);
        let max = parse_amount(&caps[2]);
        return Some(Range { min, max });
    }

    RENT_SINGLE_RE
        .captures(text)
        .and_then(|caps| parse_amount(&caps[1]))
        .map(Range::single)
}

/// Bedroom count, used for both ends of the range
pub fn bedrooms(text: &str) -> Option<Range> {
    first_capture(&BEDS_RE, text).map(Range::single)
}

/// Bathroom count, used for both ends of the range
pub fn bathrooms(text: &str) -> Option<Range> {
    first_capture(&BATHS_RE, text).map(Range::single)
}

/// Square footage, used for both ends of the range
pub fn square_feet(text: &str) -> Option<Range> {
    first_capture(&SQFT_RE, text).map(Range::single)
}

/// Parses an amount like "1,250" or "1,250.50"; thousands separators are dropped
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    match cleaned.parse::<f64>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Unparseable amount {:?}: {}", raw, e);
            None
        }
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text).and_then(|caps| parse_amount(&caps[1]))
}
