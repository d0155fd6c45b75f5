//! Structured metadata (JSON-LD) extraction
//!
//! Every `ld+json` script on a page is parsed and walked. Objects whose `@type` is one of
//! the recognized real-estate or organization types are merged key by key into a single
//! flat map, later objects overriding earlier ones.

use crate::listing::Location;
use scraper::{Html, Selector};
use serde_json::{Map, Value};

/// Types whose properties describe the listing itself
const RECOGNIZED_TYPES: &[&str] = &[
    "Apartment",
    "ApartmentComplex",
    "Place",
    "Residence",
    "SingleFamilyResidence",
    "House",
    "Organization",
];

/// Nodes nested deeper than this are not visited
const MAX_WALK_DEPTH: usize = 64;

const DEFAULT_COUNTRY: &str = "US";

/// Flat key/value view of the recognized structured-metadata objects on a page
pub type Metadata = Map<String, Value>;

/// Address parts taken from structured metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalAddress {
    pub full: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

/// Parses every JSON-LD block in the document and merges the recognized objects
///
/// Blocks that fail to parse are skipped.
pub fn collect_metadata(document: &Html) -> Metadata {
    let mut merged = Metadata::new();

    let Ok(selector) = Selector::parse(r#"script[type*="ld+json"]"#) else {
        return merged;
    };

    for script in document.select(&selector) {
        let text: String = script.text().collect();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(text) {
            Ok(tree) => merge_recognized(&tree, &mut merged),
            Err(e) => tracing::debug!("Skipping malformed JSON-LD block: {}", e),
        }
    }

    merged
}

/// Walks a parsed tree depth-first and merges recognized objects into `out`
///
/// Objects are visited in document order (parents before children), so a nested object
/// overrides the fields of the object that contains it.
pub fn merge_recognized(tree: &Value, out: &mut Metadata) {
    let mut stack: Vec<(&Value, usize)> = vec![(tree, 0)];

    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_WALK_DEPTH {
            continue;
        }

        match node {
            Value::Object(map) => {
                if has_recognized_type(map) {
                    for (key, value) in map {
                        out.insert(key.clone(), value.clone());
                    }
                }
                // Reversed so the first child is popped first
                for child in map.values().rev() {
                    stack.push((child, depth + 1));
                }
            }
            Value::Array(items) => {
                for child in items.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
            _ => {}
        }
    }
}

fn has_recognized_type(map: &Map<String, Value>) -> bool {
    match map.get("@type") {
        Some(Value::String(t)) => RECOGNIZED_TYPES.contains(&t.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| RECOGNIZED_TYPES.contains(&t)),
        _ => false,
    }
}

/// Builds the postal address from the merged metadata
///
/// Returns `None` when the metadata has no address. A missing country defaults to "US".
pub fn address(metadata: &Metadata) -> Option<PostalAddress> {
    match metadata.get("address")? {
        Value::Object(adr) => {
            let street = adr.get("streetAddress").and_then(scalar_text);
            let city = adr.get("addressLocality").and_then(scalar_text);
            let state = adr.get("addressRegion").and_then(scalar_text);
            let zip = adr.get("postalCode").and_then(scalar_text);
            let country = adr
                .get("addressCountry")
                .and_then(country_text)
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

            let full = [&street, &city, &state, &zip]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .chain(std::iter::once(country.as_str()))
                .collect::<Vec<_>>()
                .join(" ");

            Some(PostalAddress {
                full: Some(full),
                city,
                state,
                zip,
                country: Some(country),
            })
        }
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| PostalAddress {
                full: Some(text.to_string()),
                ..PostalAddress::default()
            })
        }
        _ => None,
    }
}

/// Reads `geo.latitude` / `geo.longitude`; each coordinate is absent if it fails to parse
pub fn geo(metadata: &Metadata) -> Option<Location> {
    let Value::Object(geo) = metadata.get("geo")? else {
        return None;
    };

    Some(Location {
        latitude: geo.get("latitude").and_then(coordinate),
        longitude: geo.get("longitude").and_then(coordinate),
    })
}

/// The declared `@type` of the merged metadata
pub fn property_type(metadata: &Metadata) -> Option<String> {
    match metadata.get("@type")? {
        Value::String(t) => Some(t.clone()),
        Value::Array(types) => types.iter().find_map(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn country_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(country) => country.get("name").and_then(scalar_text),
        other => scalar_text(other),
    }
}

fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!("Unparseable coordinate {:?}: {}", s, e);
                None
            }
        },
        _ => None,
    }
}
