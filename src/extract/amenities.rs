use crate::extract::element_text;
use crate::listing::AmenityGroup;
use scraper::{Html, Selector};
use std::collections::BTreeSet;

/// List items at least this long are descriptions, not amenities
const MAX_AMENITY_LEN: usize = 120;

const FALLBACK_TITLE: &str = "Amenities";

/// Extracts amenities grouped under their section headings
///
/// Each `section`/`div` whose first `h2`/`h3` mentions "amenit" contributes its list items
/// as one group (deduplicated and sorted). If no heading matches anywhere, loose amenity
/// pills are collected into a single "Amenities" group.
pub fn extract_amenities(document: &Html) -> Vec<AmenityGroup> {
    let mut groups: Vec<AmenityGroup> = Vec::new();

    if let (Ok(containers), Ok(headings), Ok(items)) = (
        Selector::parse("section, div"),
        Selector::parse("h2, h3"),
        Selector::parse("li"),
    ) {
        for container in document.select(&containers) {
            let Some(heading) = container.select(&headings).next() else {
                continue;
            };

            let title = element_text(heading);
            if title.is_empty() || !title.to_lowercase().contains("amenit") {
                continue;
            }

            let values: BTreeSet<String> = container
                .select(&items)
                .map(element_text)
                .filter(|t| !t.is_empty() && t.chars().count() < MAX_AMENITY_LEN)
                .collect();

            if values.is_empty() {
                continue;
            }

            // Nested containers can see the same heading and list
            let group = AmenityGroup {
                title,
                value: values.into_iter().collect(),
            };
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
    }

    if groups.is_empty() {
        if let Some(group) = amenity_pills(document) {
            groups.push(group);
        }
    }

    groups
}

fn amenity_pills(document: &Html) -> Option<AmenityGroup> {
    let selector = Selector::parse(".amenity, .amenities li, .amenities .pill").ok()?;

    let pills: BTreeSet<String> = document
        .select(&selector)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();

    (!pills.is_empty()).then(|| AmenityGroup {
        title: FALLBACK_TITLE.to_string(),
        value: pills.into_iter().collect(),
    })
}
