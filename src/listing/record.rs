use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys every normalized record exposes, in output order
pub const SCHEMA_FIELDS: &[&str] = &[
    "url",
    "fullAddress",
    "monthlyRent",
    "bedrooms",
    "bathrooms",
    "squareFeet",
    "propertyInformation",
    "scores",
    "fees",
    "petFees",
    "parkingFees",
    "amenities",
    "models",
    "listingId",
    "phoneNumber",
    "listingCity",
    "listingState",
    "listingZip",
    "listingCountry",
    "listingNeighborhood",
    "listingCounty",
    "listingDMA",
    "listingMinRent",
    "listingMaxRent",
    "location",
    "rentals",
    "carouselCollection",
    "imageCount",
    "photoCount",
    "videoCount",
    "has3DTour",
    "hasVideo",
    "virtualTourCount",
    "profileType",
    "propertyType",
];

/// A `{min, max}` pair; both ends are null when unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// A range whose min and max are the same value
    pub fn single(value: f64) -> Self {
        Self::new(value, value)
    }
}

/// Geographic coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Neighborhood scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub walk_score: Option<f64>,
    pub transit_score: Option<f64>,
    pub bike_score: Option<f64>,
    pub sound_score: Option<f64>,
}

/// A titled group of amenities, e.g. "Community Amenities"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmenityGroup {
    pub title: String,
    pub value: Vec<String>,
}

/// One image from the listing's carousel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselImage {
    pub src: String,
    pub alt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// One row of a listing's unit table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Rental {
    pub beds: Option<f64>,
    pub baths: Option<f64>,
    pub rent: Option<f64>,
    pub deposit: Option<f64>,
    pub square_feet: Option<f64>,
    pub unit_number: Option<String>,
    pub available_date_text: Option<String>,
    pub min_lease_term: Option<String>,
    pub max_lease_term: Option<String>,
}

/// Extraction output before normalization
///
/// `None` means the extractor never populated the field. A present value is kept as-is by
/// [`normalize`](crate::listing::normalize), including zeros, `false` and empty lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingDraft {
    pub url: String,
    pub full_address: Option<String>,
    pub monthly_rent: Option<Range>,
    pub bedrooms: Option<Range>,
    pub bathrooms: Option<Range>,
    pub square_feet: Option<Range>,
    pub property_information: Option<Vec<Value>>,
    pub scores: Option<Scores>,
    pub fees: Option<Vec<Value>>,
    pub pet_fees: Option<Vec<Value>>,
    pub parking_fees: Option<Vec<Value>>,
    pub amenities: Option<Vec<AmenityGroup>>,
    pub models: Option<Vec<Value>>,
    pub listing_id: Option<String>,
    pub phone_number: Option<String>,
    pub listing_city: Option<String>,
    pub listing_state: Option<String>,
    pub listing_zip: Option<String>,
    pub listing_country: Option<String>,
    pub listing_neighborhood: Option<String>,
    pub listing_county: Option<String>,
    pub listing_dma: Option<String>,
    pub listing_min_rent: Option<f64>,
    pub listing_max_rent: Option<f64>,
    pub location: Option<Location>,
    pub rentals: Option<Vec<Rental>>,
    pub carousel_collection: Option<Vec<CarouselImage>>,
    pub image_count: Option<u32>,
    pub photo_count: Option<u32>,
    pub video_count: Option<u32>,
    pub has_3d_tour: Option<bool>,
    pub has_video: Option<bool>,
    pub virtual_tour_count: Option<u32>,
    pub profile_type: Option<String>,
    pub property_type: Option<String>,
    pub error: Option<String>,
}

impl ListingDraft {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// A schema-complete listing record
///
/// Serializes with every key in [`SCHEMA_FIELDS`]. Records for pages that could not be
/// fetched carry an extra `_error` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub url: String,
    pub full_address: Option<String>,
    pub monthly_rent: Range,
    pub bedrooms: Range,
    pub bathrooms: Range,
    pub square_feet: Range,
    pub property_information: Vec<Value>,
    pub scores: Scores,
    pub fees: Vec<Value>,
    pub pet_fees: Vec<Value>,
    pub parking_fees: Vec<Value>,
    pub amenities: Vec<AmenityGroup>,
    pub models: Vec<Value>,
    pub listing_id: Option<String>,
    pub phone_number: Option<String>,
    pub listing_city: Option<String>,
    pub listing_state: Option<String>,
    pub listing_zip: Option<String>,
    pub listing_country: Option<String>,
    pub listing_neighborhood: Option<String>,
    pub listing_county: Option<String>,
    #[serde(rename = "listingDMA")]
    pub listing_dma: Option<String>,
    pub listing_min_rent: Option<f64>,
    pub listing_max_rent: Option<f64>,
    pub location: Location,
    pub rentals: Vec<Rental>,
    pub carousel_collection: Vec<CarouselImage>,
    pub image_count: Option<u32>,
    pub photo_count: Option<u32>,
    pub video_count: Option<u32>,
    #[serde(rename = "has3DTour")]
    pub has_3d_tour: bool,
    pub has_video: bool,
    pub virtual_tour_count: Option<u32>,
    pub profile_type: Option<String>,
    pub property_type: Option<String>,
    #[serde(rename = "_error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ListingRecord {
    /// A record for a URL whose page could not be fetched or was not allowed
    pub fn degraded(url: impl Into<String>, error: impl Into<String>) -> Self {
        crate::listing::normalize(ListingDraft {
            error: Some(error.into()),
            ..ListingDraft::new(url)
        })
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

impl From<ListingRecord> for ListingDraft {
    fn from(record: ListingRecord) -> Self {
        Self {
            url: record.url,
            full_address: record.full_address,
            monthly_rent: Some(record.monthly_rent),
            bedrooms: Some(record.bedrooms),
            bathrooms: Some(record.bathrooms),
            square_feet: Some(record.square_feet),
            property_information: Some(record.property_information),
            scores: Some(record.scores),
            fees: Some(record.fees),
            pet_fees: Some(record.pet_fees),
            parking_fees: Some(record.parking_fees),
            amenities: Some(record.amenities),
            models: Some(record.models),
            listing_id: record.listing_id,
            phone_number: record.phone_number,
            listing_city: record.listing_city,
            listing_state: record.listing_state,
            listing_zip: record.listing_zip,
            listing_country: record.listing_country,
            listing_neighborhood: record.listing_neighborhood,
            listing_county: record.listing_county,
            listing_dma: record.listing_dma,
            listing_min_rent: record.listing_min_rent,
            listing_max_rent: record.listing_max_rent,
            location: Some(record.location),
            rentals: Some(record.rentals),
            carousel_collection: Some(record.carousel_collection),
            image_count: record.image_count,
            photo_count: record.photo_count,
            video_count: record.video_count,
            has_3d_tour: Some(record.has_3d_tour),
            has_video: Some(record.has_video),
            virtual_tour_count: record.virtual_tour_count,
            profile_type: record.profile_type,
            property_type: record.property_type,
            error: record.error,
        }
    }
}
