//! Listing aggregation and price estimates.
//!
//! This module groups a city's listings by neighbourhood and room type,
//! answers single-filter price queries, and prepares map points.

use crate::errors::DataError;
use crate::models::{CityDataset, Listing, MapPoint, PointEstimate, SummaryRow, BOOKED_NIGHTS_PER_MONTH};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Group listings by (neighbourhood, room_type) and compute mean price and count.
///
/// Rows are ordered by neighbourhood, then room type. An empty dataset
/// produces an empty summary.
pub fn summarize(dataset: &CityDataset) -> Vec<SummaryRow> {
    let mut grouped: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();

    for listing in &dataset.listings {
        let entry = grouped
            .entry((listing.neighbourhood.as_str(), listing.room_type.as_str()))
            .or_insert((0.0, 0));
        entry.0 += listing.price;
        entry.1 += 1;
    }

    debug!(
        "Summarized {} listings for {} into {} groups",
        dataset.len(),
        dataset.name,
        grouped.len()
    );

    grouped
        .into_iter()
        .map(|((neighbourhood, room_type), (total, count))| SummaryRow {
            neighbourhood: neighbourhood.to_string(),
            room_type: room_type.to_string(),
            avg_price: total / count as f64,
            listings_count: count,
        })
        .collect()
}

/// Estimate nightly price and monthly revenue for one neighbourhood and room type.
///
/// Uses [`BOOKED_NIGHTS_PER_MONTH`] for the revenue projection.
pub fn estimate(
    dataset: &CityDataset,
    neighbourhood: &str,
    room_type: &str,
) -> Result<PointEstimate, DataError> {
    estimate_with_nights(dataset, neighbourhood, room_type, BOOKED_NIGHTS_PER_MONTH)
}

/// Same as [`estimate`] with an explicit booked-nights assumption.
///
/// Matching is exact and case-sensitive. When nothing matches, the mean
/// price of the whole dataset is used instead and `fallback` is set.
pub fn estimate_with_nights(
    dataset: &CityDataset,
    neighbourhood: &str,
    room_type: &str,
    booked_nights: f64,
) -> Result<PointEstimate, DataError> {
    if dataset.is_empty() {
        return Err(DataError::EmptyDataset {
            city: dataset.name.clone(),
        });
    }

    let matching: Vec<&Listing> = dataset
        .listings
        .iter()
        .filter(|l| l.neighbourhood == neighbourhood && l.room_type == room_type)
        .collect();

    let (avg_price, fallback) = if matching.is_empty() {
        warn!(
            "No {} listings match '{}' / '{}'; using the city-wide average",
            dataset.name, neighbourhood, room_type
        );
        (mean_price(dataset.listings.iter()), true)
    } else {
        (mean_price(matching.iter().copied()), false)
    };

    Ok(PointEstimate {
        neighbourhood: neighbourhood.to_string(),
        room_type: room_type.to_string(),
        avg_price,
        monthly_revenue: avg_price * booked_nights,
        matched_listings: matching.len(),
        fallback,
    })
}

/// Sorted distinct neighbourhoods in the dataset.
pub fn neighbourhoods(dataset: &CityDataset) -> Vec<String> {
    distinct(dataset, |l| &l.neighbourhood)
}

/// Sorted distinct room types in the dataset.
pub fn room_types(dataset: &CityDataset) -> Vec<String> {
    distinct(dataset, |l| &l.room_type)
}

/// Listings with both coordinates present, ready for plotting.
pub fn map_points(dataset: &CityDataset) -> Vec<MapPoint> {
    dataset
        .listings
        .iter()
        .filter_map(|l| match (l.latitude, l.longitude) {
            (Some(latitude), Some(longitude)) => Some(MapPoint {
                neighbourhood: l.neighbourhood.clone(),
                room_type: l.room_type.clone(),
                price: l.price,
                latitude,
                longitude,
            }),
            _ => None,
        })
        .collect()
}

/// Callers guarantee a non-empty iterator.
fn mean_price<'a>(listings: impl Iterator<Item = &'a Listing>) -> f64 {
    let (total, count) = listings.fold((0.0, 0usize), |(sum, n), l| (sum + l.price, n + 1));
    total / count as f64
}

fn distinct<'a>(dataset: &'a CityDataset, field: impl Fn(&'a Listing) -> &'a String) -> Vec<String> {
    dataset
        .listings
        .iter()
        .map(field)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}
