//! Trait and types for single-address geocoding services.

use tracing::{debug, error};

use crate::error::GeocodeError;
use crate::records::{AddressRecord, GeocodeResult};

/// A resolved coordinate pair in the service-provided textual form.
///
/// Longitude and latitude stay as text until the feature builder casts them,
/// so one place owns the numeric validation regardless of which service
/// produced the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodePoint {
    pub longitude: String,
    pub latitude: String,
    /// The service's normalized form of the input address, when it reports one.
    pub matched_address: Option<String>,
}

/// Abstraction over a single-address geocoding service (e.g. Photon, Google).
///
/// One call resolves one address. Implementations block until the service
/// responds; there is no retry policy here, that is the caller's choice.
#[async_trait::async_trait]
pub trait Geocoder {
    /// Resolves a free-text address to a coordinate pair.
    ///
    /// # Errors
    ///
    /// Network trouble, a non-success status, or a response the service
    /// contract does not cover all fail the one address being resolved;
    /// callers decide whether to skip the record or abort.
    async fn resolve(&self, address: &str) -> Result<GeocodePoint, GeocodeError>;
}

/// Resolves a table of records one request at a time, in input order.
///
/// A failed record is logged and skipped; it never aborts the rest of the
/// table. The returned results carry `matched = true` only.
pub async fn resolve_records(
    geocoder: &dyn Geocoder,
    records: &[AddressRecord],
) -> Vec<GeocodeResult> {
    let mut results = Vec::with_capacity(records.len());
    for record in records {
        let address = record.full_address();
        match geocoder.resolve(&address).await {
            Ok(point) => {
                debug!(id = %record.id, longitude = %point.longitude, latitude = %point.latitude, "Address resolved");
                results.push(GeocodeResult::matched(
                    &record.id,
                    point.matched_address,
                    point.longitude,
                    point.latitude,
                ));
            }
            Err(e) => {
                error!(id = %record.id, error = %e, "Geocoding failed, skipping record");
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic service: coordinates derived from the address length.
    struct StubGeocoder;

    #[async_trait::async_trait]
    impl Geocoder for StubGeocoder {
        async fn resolve(&self, address: &str) -> Result<GeocodePoint, GeocodeError> {
            if address.is_empty() {
                return Err(GeocodeError::ResponseFormat("empty address".to_string()));
            }
            Ok(GeocodePoint {
                longitude: format!("-122.{}", address.len()),
                latitude: format!("37.{}", address.len()),
                matched_address: Some(address.to_uppercase()),
            })
        }
    }

    fn record(id: &str, street: &str) -> AddressRecord {
        AddressRecord {
            id: id.to_string(),
            street: street.to_string(),
            city: Some("Oakland".to_string()),
            state: Some("CA".to_string()),
            zip: Some("94605".to_string()),
        }
    }

    #[tokio::test]
    async fn test_every_valid_record_resolves_matched_and_finite() {
        let records = vec![record("1", "409 Main St"), record("2", "310 Main St")];

        let results = resolve_records(&StubGeocoder, &records).await;
        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.matched);
            let lon: f64 = result.longitude.as_deref().unwrap().parse().unwrap();
            let lat: f64 = result.latitude.as_deref().unwrap().parse().unwrap();
            assert!(lon.is_finite());
            assert!(lat.is_finite());
        }
    }

    #[tokio::test]
    async fn test_failed_record_is_skipped_not_fatal() {
        let records = vec![
            AddressRecord {
                id: "bad".to_string(),
                street: String::new(),
                city: None,
                state: None,
                zip: None,
            },
            record("2", "310 Main St"),
        ];

        let results = resolve_records(&StubGeocoder, &records).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "2");
    }
}
