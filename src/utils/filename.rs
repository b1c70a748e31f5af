use chrono::{Datelike, Local};
use std::path::PathBuf;

use crate::models::Location;
use crate::utils::constants::DEFAULT_OUTPUT_DIR;

/// Generate default CSV filename with format: openmeteo-{lat}_{lon}-{YYMMDD}.csv
pub fn generate_default_csv_filename(location: &Location) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!(
        "openmeteo-{:.3}_{:.3}-{:02}{:02}{:02}.csv",
        location.latitude, location.longitude, year, month, day
    );
    PathBuf::from(DEFAULT_OUTPUT_DIR).join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_csv_filename() {
        let location = Location::new(33.625, -72.998).unwrap();
        let filename = generate_default_csv_filename(&location);
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.starts_with("output/"));
        assert!(filename_str.ends_with(".csv"));

        let parts: Vec<&str> = filename_str.split('/').collect();
        assert_eq!(parts.len(), 2);

        let file_part = parts[1];
        assert!(file_part.starts_with("openmeteo-33.625_-72.998-"));
        // openmeteo-33.625_-72.998-YYMMDD.csv
        assert_eq!(file_part.len(), "openmeteo-33.625_-72.998-".len() + 6 + 4);
    }
}
