use crate::extract::element_text;
use crate::listing::Rental;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::num::ParseFloatError;

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid number pattern"));

/// Extracts unit rows from the page's tables
///
/// A row counts as a unit when it has at least three cells, one of which mentions "bed"
/// and one of which contains a `$`. Rows whose numbers fail to parse are dropped.
pub fn extract_rentals(document: &Html) -> Vec<Rental> {
    let (Ok(rows), Ok(cells)) = (Selector::parse("table tr"), Selector::parse("td, th")) else {
        return Vec::new();
    };

    document
        .select(&rows)
        .filter_map(|row| {
            let texts: Vec<String> = row.select(&cells).map(element_text).collect();
            if !is_unit_row(&texts) {
                return None;
            }

            match parse_unit_row(&texts) {
                Ok(rental) => Some(rental),
                Err(e) => {
                    tracing::debug!("Dropping unit row {:?}: {}", texts, e);
                    None
                }
            }
        })
        .collect()
}

fn is_unit_row(cells: &[String]) -> bool {
    cells.len() >= 3
        && cells.iter().any(|c| c.to_lowercase().contains("bed"))
        && cells.iter().any(|c| c.contains('$'))
}

fn parse_unit_row(cells: &[String]) -> Result<Rental, ParseFloatError> {
    let matching = |pred: &dyn Fn(&str) -> bool| -> String {
        cells
            .iter()
            .filter(|c| pred(c.as_str()))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    };

    Ok(Rental {
        beds: first_number(&matching(&|c: &str| c.to_lowercase().contains("bed")))?,
        baths: first_number(&matching(&|c: &str| c.to_lowercase().contains("bath")))?,
        rent: first_number(&matching(&|c: &str| c.contains('$')))?,
        square_feet: first_number(&matching(&|c: &str| c.to_lowercase().contains("sq")))?,
        ..Rental::default()
    })
}

/// The first numeric token in the text; `Ok(None)` when there is none
fn first_number(text: &str) -> Result<Option<f64>, ParseFloatError> {
    match NUMBER_RE.find(text) {
        Some(m) => m.as_str().replace(',', "").parse::<f64>().map(Some),
        None => Ok(None),
    }
}
