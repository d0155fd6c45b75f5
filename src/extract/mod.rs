//! Listing detail extraction
//!
//! This module turns one detail page into a [`ListingDraft`]. Sources are consulted in a
//! fixed order:
//! - Structured metadata (JSON-LD) for address, coordinates and property type
//! - The page heading or `og:title` when no structured address exists
//! - `tel:` links, then phone-shaped text
//! - Regex heuristics over the page text for rent, beds, baths and square footage
//! - DOM scans for amenities, media and the unit table
//! - The URL itself for the listing id
//!
//! Every step is best-effort: a failure leaves its fields unset and never aborts the rest.

mod amenities;
mod media;
mod rentals;
pub mod structured;
mod text;

pub use amenities::extract_amenities;
pub use media::{extract_media, MediaSummary, MAX_CAROUSEL_IMAGES};
pub use rentals::extract_rentals;
pub use text::parse_amount;

use crate::listing::ListingDraft;
use crate::url::listing_id_from_url;
use scraper::{ElementRef, Html, Selector};

/// Elements whose text never renders on the page
const NON_VISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracts a draft listing record from a detail page
///
/// # Arguments
///
/// * `url` - The URL the page was requested from
/// * `html` - The page body
///
/// # Example
///
/// ```
/// use listing_harvester::extract::extract_listing;
///
/// let html = r#"<html><body><h1>The Lofts</h1><p>2 beds 1 bath $1,200/mo</p></body></html>"#;
/// let draft = extract_listing("https://www.apartments.com/the-lofts/abc123/", html);
/// assert_eq!(draft.full_address.as_deref(), Some("The Lofts"));
/// assert_eq!(draft.listing_id.as_deref(), Some("abc123"));
/// ```
pub fn extract_listing(url: &str, html: &str) -> ListingDraft {
    let document = Html::parse_document(html);
    let page_text = visible_text(&document);
    let metadata = structured::collect_metadata(&document);

    let mut draft = ListingDraft::new(url);

    match structured::address(&metadata) {
        Some(address) => {
            draft.full_address = address.full;
            draft.listing_city = address.city;
            draft.listing_state = address.state;
            draft.listing_zip = address.zip;
            draft.listing_country = address.country;
        }
        None => draft.full_address = heading_title(&document),
    }

    draft.location = structured::geo(&metadata);
    draft.property_type = structured::property_type(&metadata);

    draft.phone_number = tel_link(&document).or_else(|| text::phone_number(&page_text));

    if let Some(rent) = text::rent_range(&page_text) {
        draft.listing_min_rent = rent.min;
        draft.listing_max_rent = rent.max;
        draft.monthly_rent = Some(rent);
    }
    draft.bedrooms = text::bedrooms(&page_text);
    draft.bathrooms = text::bathrooms(&page_text);
    draft.square_feet = text::square_feet(&page_text);

    draft.listing_id = listing_id_from_url(url);

    draft.amenities = Some(extract_amenities(&document));

    let media = extract_media(&document);
    draft.image_count = media.image_count;
    draft.photo_count = media.photo_count;
    draft.video_count = media.video_count;
    draft.has_3d_tour = Some(media.has_3d_tour);
    draft.has_video = Some(media.has_video);
    draft.carousel_collection = Some(media.carousel);

    draft.rentals = Some(extract_rentals(&document));

    draft
}

/// All text nodes of an element, trimmed and joined by single spaces
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The document's rendered text, as [`element_text`] joins it
///
/// Text inside `script`, `style`, `noscript` and `template` elements is left out.
pub fn visible_text(document: &Html) -> String {
    document
        .root_element()
        .descendants()
        .filter(|node| {
            !node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|element| NON_VISIBLE_ELEMENTS.contains(&element.value().name()))
        })
        .filter_map(|node| node.value().as_text())
        .flat_map(|text| text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Primary heading text, falling back to the `og:title` meta tag
fn heading_title(document: &Html) -> Option<String> {
    let heading = Selector::parse("h1").ok().and_then(|selector| {
        document
            .select(&selector)
            .map(element_text)
            .find(|t| !t.is_empty())
    });

    heading.or_else(|| {
        let selector = Selector::parse(r#"meta[property="og:title"]"#).ok()?;
        document
            .select(&selector)
            .filter_map(|meta| meta.value().attr("content"))
            .map(|content| content.split_whitespace().collect::<Vec<_>>().join(" "))
            .find(|t| !t.is_empty())
    })
}

/// Target of the first non-empty `tel:` link
fn tel_link(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"a[href^="tel:"]"#).ok()?;
    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim_start_matches("tel:").trim().to_string())
        .find(|phone| !phone.is_empty())
}
