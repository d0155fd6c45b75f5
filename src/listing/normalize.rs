use crate::listing::record::{ListingDraft, ListingRecord};

/// Fills a draft to the fixed output schema
///
/// Fields the draft left unset get their default: null scalars, empty lists, `{min: null,
/// max: null}` ranges and null coordinates. Fields the draft set are copied unchanged, so a
/// count of 0 or an explicit `false` survives. Normalizing an already-normalized record
/// (converted back with `ListingDraft::from`) yields the same record.
pub fn normalize(draft: ListingDraft) -> ListingRecord {
    ListingRecord {
        url: draft.url,
        full_address: draft.full_address,
        monthly_rent: draft.monthly_rent.unwrap_or_default(),
        bedrooms: draft.bedrooms.unwrap_or_default(),
        bathrooms: draft.bathrooms.unwrap_or_default(),
        square_feet: draft.square_feet.unwrap_or_default(),
        property_information: draft.property_information.unwrap_or_default(),
        scores: draft.scores.unwrap_or_default(),
        fees: draft.fees.unwrap_or_default(),
        pet_fees: draft.pet_fees.unwrap_or_default(),
        parking_fees: draft.parking_fees.unwrap_or_default(),
        amenities: draft.amenities.unwrap_or_default(),
        models: draft.models.unwrap_or_default(),
        listing_id: draft.listing_id,
        phone_number: draft.phone_number,
        listing_city: draft.listing_city,
        listing_state: draft.listing_state,
        listing_zip: draft.listing_zip,
        listing_country: draft.listing_country,
        listing_neighborhood: draft.listing_neighborhood,
        listing_county: draft.listing_county,
        listing_dma: draft.listing_dma,
        listing_min_rent: draft.listing_min_rent,
        listing_max_rent: draft.listing_max_rent,
        location: draft.location.unwrap_or_default(),
        rentals: draft.rentals.unwrap_or_default(),
        carousel_collection: draft.carousel_collection.unwrap_or_default(),
        image_count: draft.image_count,
        photo_count: draft.photo_count,
        video_count: draft.video_count,
        has_3d_tour: draft.has_3d_tour.unwrap_or(false),
        has_video: draft.has_video.unwrap_or(false),
        virtual_tour_count: draft.virtual_tour_count,
        profile_type: draft.profile_type,
        property_type: draft.property_type,
        error: draft.error,
    }
}
