use crate::listing::CarouselImage;
use scraper::{Html, Selector};

/// Carousel entries kept per listing
pub const MAX_CAROUSEL_IMAGES: usize = 50;

/// Media found on a detail page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaSummary {
    pub carousel: Vec<CarouselImage>,
    pub image_count: Option<u32>,
    pub photo_count: Option<u32>,
    pub video_count: Option<u32>,
    pub has_3d_tour: bool,
    pub has_video: bool,
}

/// Collects images and video/3D-tour indicators
///
/// Counts are taken from the capped carousel, so a page with more than
/// [`MAX_CAROUSEL_IMAGES`] images reports the cap.
pub fn extract_media(document: &Html) -> MediaSummary {
    let mut carousel = images(document);
    carousel.truncate(MAX_CAROUSEL_IMAGES);

    let image_count = (!carousel.is_empty()).then(|| carousel.len() as u32);

    let video_count = Selector::parse("video, source[type*='video']")
        .map(|selector| document.select(&selector).count() as u32)
        .unwrap_or(0);
    let video_count = (video_count > 0).then_some(video_count);

    let has_3d_tour = document.root_element().text().any(|t| t.contains("3D"));

    MediaSummary {
        carousel,
        image_count,
        photo_count: image_count,
        video_count,
        has_3d_tour,
        has_video: video_count.is_some(),
    }
}

fn images(document: &Html) -> Vec<CarouselImage> {
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|img| {
            let element = img.value();
            // Lazy-loaded images keep the real source in data-src
            let src = [element.attr("data-src"), element.attr("src")]
                .into_iter()
                .flatten()
                .map(str::trim)
                .find(|s| !s.is_empty())?;

            let alt = element
                .attr("alt")
                .filter(|a| !a.is_empty())
                .map(str::to_string);

            let (width, height) = dimensions(element.attr("width"), element.attr("height"));

            Some(CarouselImage {
                src: src.to_string(),
                alt,
                width,
                height,
            })
        })
        .collect()
}

/// Both dimensions are dropped if either one is present but not an integer
fn dimensions(width: Option<&str>, height: Option<&str>) -> (Option<u32>, Option<u32>) {
    let parse = |raw: Option<&str>| -> Result<Option<u32>, std::num::ParseIntError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s.parse::<u32>().map(Some),
            None => Ok(None),
        }
    };

    match (parse(width), parse(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => (None, None),
    }
}
