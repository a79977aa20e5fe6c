//! CSV listing loader.
//!
//! Reads one listings file per city. Only the columns in
//! [`REQUIRED_COLUMNS`] are used; anything else in the file is ignored.

use crate::config::CityConfig;
use crate::errors::DataError;
use crate::models::{CityDataset, Listing};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns every listings file must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = ["neighbourhood", "room_type", "price", "latitude", "longitude"];

/// Raw CSV row, before validation.
#[derive(Debug, Deserialize)]
struct RawListing {
    neighbourhood: String,
    room_type: String,
    price: String,
    latitude: String,
    longitude: String,
}

/// Load the dataset configured for a city.
pub fn load_city(city: &CityConfig) -> Result<CityDataset, DataError> {
    info!("Loading {} listings from {}", city.name, city.path.display());

    let file = File::open(&city.path).map_err(|source| DataError::Io {
        path: city.path.clone(),
        source,
    })?;

    let dataset = read_listings(file, &city.path, &city.name, &city.currency)?
        .with_example_questions(city.example_questions());
    info!("Loaded {} listings for {}", dataset.len(), city.name);
    Ok(dataset)
}

/// Parse listings from any CSV source. `path` is only used in error messages.
pub fn read_listings<R: Read>(
    reader: R,
    path: &Path,
    city: &str,
    currency: &str,
) -> Result<CityDataset, DataError> {
    let csv_err = |source: csv::Error| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut listings = Vec::new();
    let mut skipped = 0usize;

    for record in rdr.deserialize::<RawListing>() {
        let raw = record.map_err(csv_err)?;
        match validate(raw) {
            Some(listing) => listings.push(listing),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(
            "Skipped {} rows in {} without a neighbourhood, room type or usable price",
            skipped,
            path.display()
        );
    }
    debug!("Parsed {} listings from {}", listings.len(), path.display());

    Ok(CityDataset::new(city, currency, listings))
}

fn validate(raw: RawListing) -> Option<Listing> {
    if raw.neighbourhood.is_empty() || raw.room_type.is_empty() {
        return None;
    }

    Some(Listing {
        neighbourhood: raw.neighbourhood,
        room_type: raw.room_type,
        price: parse_price(&raw.price)?,
        latitude: parse_coordinate(&raw.latitude),
        longitude: parse_coordinate(&raw.longitude),
    })
}

/// Parse a price such as `120`, `85.5` or `"$1,200.00"`.
///
/// Returns `None` for empty, non-numeric, non-finite or non-positive
/// values. Commas are thousands separators; a comma after the decimal
/// point (`"1.200,50"`) makes the value unparseable.
pub fn parse_price(value: &str) -> Option<f64> {
    let number = value
        .trim()
        .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '-' && c != '.');

    if let Some(dot) = number.rfind('.') {
        if number[dot..].contains(',') {
            return None;
        }
    }

    let cleaned: String = number.chars().filter(|c| *c != ',').collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
}

fn parse_coordinate(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|c| c.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DataError;
    use std::path::PathBuf;

    fn read(csv: &str) -> Result<CityDataset, DataError> {
        read_listings(csv.as_bytes(), Path::new("test.csv"), "London", "£")
    }

    #[test]
    fn test_reads_required_columns_and_ignores_extras() {
        let csv = "\
id,name,neighbourhood,room_type,price,latitude,longitude,reviews
1,Flat,Soho,Entire home/apt,100,51.51,-0.13,4
2,Room,Camden,Private room,50,51.54,-0.14,10
";
        let dataset = read(csv).unwrap();

        assert_eq!(dataset.name, "London");
        assert_eq!(dataset.currency, "£");
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.listings[0].neighbourhood, "Soho");
        assert_eq!(dataset.listings[0].room_type, "Entire home/apt");
        assert_eq!(dataset.listings[0].price, 100.0);
        assert_eq!(dataset.listings[1].latitude, Some(51.54));
    }

    #[test]
    fn test_missing_columns() {
        let csv = "neighbourhood,room_type,latitude\nSoho,Entire home,51.5\n";
        match read(csv) {
            Err(DataError::MissingColumns { path, missing }) => {
                assert_eq!(path, PathBuf::from("test.csv"));
                assert_eq!(missing, vec!["price", "longitude"]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_skips_rows_without_usable_price_or_keys() {
        let csv = "\
neighbourhood,room_type,price,latitude,longitude
Soho,Entire home,,51.5,-0.1
Soho,Entire home,n/a,51.5,-0.1
Soho,Entire home,NaN,51.5,-0.1
,Private room,40,51.5,-0.1
Camden,,40,51.5,-0.1
Camden,Private room,45,,
";
        let dataset = read(csv).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.listings[0].price, 45.0);
        assert_eq!(dataset.listings[0].latitude, None);
        assert_eq!(dataset.listings[0].longitude, None);
    }

    #[test]
    fn test_header_only_file_is_empty_dataset() {
        let dataset = read("neighbourhood,room_type,price,latitude,longitude\n").unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_parse_price_formats() {
        assert_eq!(parse_price("120"), Some(120.0));
        assert_eq!(parse_price(" 85.5 "), Some(85.5));
        assert_eq!(parse_price("$1,200.00"), Some(1200.0));
        assert_eq!(parse_price("£99"), Some(99.0));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("free"), None);
        assert_eq!(parse_price("inf"), None);
    }

    #[test]
    fn test_parse_price_rejects_non_positive_and_decimal_commas() {
        assert_eq!(parse_price("-20"), None);
        assert_eq!(parse_price("0"), None);
        assert_eq!(parse_price("0.00"), None);
        assert_eq!(parse_price("€1.200,50"), None);
        assert_eq!(parse_price("12.5,0"), None);
        assert_eq!(parse_price("1,200"), Some(1200.0));
    }

    #[test]
    fn test_skips_negative_and_decimal_comma_prices() {
        let csv = "\
neighbourhood,room_type,price,latitude,longitude
Soho,Entire home,-20,51.5,-0.1
Soho,Entire home,\"€1.200,50\",51.5,-0.1
Soho,Entire home,90,51.5,-0.1
";
        let dataset = read(csv).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.listings[0].price, 90.0);
    }

    #[test]
    fn test_load_city_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paris.csv");
        std::fs::write(
            &path,
            "neighbourhood,room_type,price,latitude,longitude\nMarais,Entire home/apt,150,48.85,2.36\n",
        )
        .unwrap();

        let city = CityConfig {
            name: "Paris".to_string(),
            path,
            currency: "€".to_string(),
            example_questions: Vec::new(),
        };
        let dataset = load_city(&city).unwrap();
        assert_eq!(dataset.currency, "€");
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.example_questions, crate::questions::defaults_for("Paris"));
    }

    #[test]
    fn test_load_city_missing_file() {
        let city = CityConfig {
            name: "Nowhere".to_string(),
            path: PathBuf::from("/definitely/not/here.csv"),
            currency: "£".to_string(),
            example_questions: Vec::new(),
        };
        assert!(matches!(load_city(&city), Err(DataError::Io { .. })));
    }
}
