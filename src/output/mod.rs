//! Output module for exporting listing records and reporting run statistics
//!
//! This module handles:
//! - Writing records as a JSON array
//! - Writing records as flattened CSV
//! - Recording and printing crawl statistics

mod csv_export;
mod json_export;
pub mod stats;

pub use csv_export::{flatten_record, write_csv};
pub use json_export::write_json;
pub use stats::{print_statistics, CrawlStatistics};

use crate::listing::ListingRecord;
use crate::Result;
use std::fs;
use std::path::Path;

/// Export file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    /// CSV when the path ends in `.csv` (any case), JSON otherwise
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => OutputFormat::Csv,
            _ => OutputFormat::Json,
        }
    }
}

/// Writes records to `path` in the format its extension selects
///
/// Missing parent directories are created.
///
/// # Returns
///
/// * `Ok(OutputFormat)` - The format that was written
/// * `Err(ScrapeError)` - The file could not be created or serialized
pub fn export_records(records: &[ListingRecord], path: &Path) -> Result<OutputFormat> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let format = OutputFormat::from_path(path);
    match format {
        OutputFormat::Json => write_json(records, path)?,
        OutputFormat::Csv => write_csv(records, path)?,
    }

    tracing::info!("Exported {} records to {} as {:?}", records.len(), path.display(), format);
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out.csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("OUT.CSV")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("out.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out.csv.bak")), OutputFormat::Json);
    }

    #[test]
    fn test_export_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("listings.csv");

        let records = vec![ListingRecord::degraded("https://www.apartments.com/a/abc123/", "timeout")];
        let format = export_records(&records, &path).unwrap();

        assert_eq!(format, OutputFormat::Csv);
        assert!(path.exists());
    }
}
