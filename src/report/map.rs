//! GeoJSON export of listing locations.
//!
//! Produces a `FeatureCollection` of points that any map viewer can
//! colour and size by price.

use crate::models::MapPoint;
use serde_json::{json, Value};

pub fn generate_geojson(city: &str, points: &[MapPoint]) -> Value {
    let features: Vec<Value> = points
        .iter()
        .map(|p| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    // GeoJSON positions are [longitude, latitude].
                    "coordinates": [p.longitude, p.latitude],
                },
                "properties": {
                    "neighbourhood": p.neighbourhood,
                    "room_type": p.room_type,
                    "price": p.price,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "name": city,
        "features": features,
    })
}
