//! Listing records and schema normalization
//!
//! Extraction produces a [`ListingDraft`] whose fields are all optional. [`normalize`]
//! turns it into a [`ListingRecord`] that carries every key of the output schema.

mod normalize;
mod record;

pub use normalize::normalize;
pub use record::{
    AmenityGroup, CarouselImage, ListingDraft, ListingRecord, Location, Range, Rental, Scores,
    SCHEMA_FIELDS,
};
