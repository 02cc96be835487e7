//! GeoJSON types and the feature builder.
//!
//! Coordinate order is always `[longitude, latitude]` per the GeoJSON
//! convention, regardless of the order a geocoding service reports them in.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GeocodeError;
use crate::records::{AddressRecord, GeocodeResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

/// Descriptive fields attached to a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl Feature {
    /// Builds one point feature from a matched result and its source record.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Validation`] if the result claims a match but
    /// either coordinate is missing, unparseable, or not finite.
    pub fn from_result(
        result: &GeocodeResult,
        record: &AddressRecord,
    ) -> Result<Feature, GeocodeError> {
        let longitude = parse_coordinate(&result.id, "longitude", result.longitude.as_deref())?;
        let latitude = parse_coordinate(&result.id, "latitude", result.latitude.as_deref())?;

        Ok(Feature {
            geometry: Geometry::Point {
                coordinates: [longitude, latitude],
            },
            properties: FeatureProperties {
                name: record.id.clone(),
                address: result.matched_address.clone(),
            },
        })
    }
}

fn parse_coordinate(id: &str, axis: &str, raw: Option<&str>) -> Result<f64, GeocodeError> {
    let raw = raw.ok_or_else(|| {
        GeocodeError::Validation(format!("record '{id}': matched but {axis} is missing"))
    })?;
    let value: f64 = raw.parse().map_err(|_| {
        GeocodeError::Validation(format!("record '{id}': {axis} '{raw}' is not a number"))
    })?;
    if !value.is_finite() {
        return Err(GeocodeError::Validation(format!(
            "record '{id}': {axis} '{raw}' is not finite"
        )));
    }
    Ok(value)
}

/// Joins matched results back onto their source records by id and builds
/// the feature list, preserving result order.
///
/// A result whose id has no source record is logged and skipped; a matched
/// result with a bad coordinate fails the whole build.
pub fn build_features(
    results: &[GeocodeResult],
    records: &[AddressRecord],
) -> Result<Vec<Feature>, GeocodeError> {
    let by_id: HashMap<&str, &AddressRecord> =
        records.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut features = Vec::with_capacity(results.len());
    for result in results {
        match by_id.get(result.id.as_str()) {
            Some(record) => features.push(Feature::from_result(result, record)?),
            None => {
                warn!(id = %result.id, "Geocode result has no source record, skipping");
            }
        }
    }
    Ok(features)
}
