//! Address table loading, geocode results, and the match filter.
//!
//! The input table is headerless CSV with columns `id,street,city,state,zip`.
//! The id is any unique value, including a place name, and becomes the
//! feature's display name downstream.

use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::error::GeocodeError;

/// One row of the input address table.
///
/// A missing component is `None` and still occupies its comma slot when the
/// record is re-serialized for the batch geocoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRecord {
    pub id: String,
    pub street: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl AddressRecord {
    /// Joins the non-empty address components for a single-address query,
    /// e.g. `"1245 Broadway, Oakland, CA, 94612"`.
    pub fn full_address(&self) -> String {
        let mut parts = vec![self.street.as_str()];
        for part in [&self.city, &self.state, &self.zip] {
            if let Some(p) = part
                && !p.is_empty()
            {
                parts.push(p.as_str());
            }
        }
        parts.join(", ")
    }
}

/// Loads the address table from a headerless CSV file.
///
/// # Errors
///
/// Fails on unreadable or malformed rows, and on duplicate record ids:
/// the batch geocoder keys its response lines on the id, so a collision
/// would make results unattributable.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<AddressRecord>, GeocodeError> {
    let mut reader = ReaderBuilder::new().has_headers(false).from_path(path)?;

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    for row in reader.deserialize() {
        let record: AddressRecord = row?;
        if !seen.insert(record.id.clone()) {
            return Err(GeocodeError::Validation(format!(
                "duplicate record id '{}'",
                record.id
            )));
        }
        records.push(record);
    }
    Ok(records)
}

/// Renders the submission body for the Census batch geocoder: one line per
/// record, five comma-separated slots, no header. Empty components keep
/// their slot.
pub fn batch_request_body(records: &[AddressRecord]) -> Result<String, GeocodeError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| GeocodeError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| GeocodeError::BatchSubmission(format!("submission body not UTF-8: {e}")))
}

/// One geocoding verdict, keyed by the source record's id.
///
/// Coordinates are kept in the service-provided textual form; the feature
/// builder owns the cast to `f64`. They are present iff `matched` is true.
#[derive(Debug, Clone)]
pub struct GeocodeResult {
    pub id: String,
    pub matched: bool,
    pub matched_address: Option<String>,
    pub longitude: Option<String>,
    pub latitude: Option<String>,
}

impl GeocodeResult {
    /// A confirmed match with coordinates.
    pub fn matched(
        id: &str,
        matched_address: Option<String>,
        longitude: String,
        latitude: String,
    ) -> Self {
        GeocodeResult {
            id: id.to_string(),
            matched: true,
            matched_address,
            longitude: Some(longitude),
            latitude: Some(latitude),
        }
    }

    /// A `No_Match` or `Tie` verdict.
    pub fn unmatched(id: &str) -> Self {
        GeocodeResult {
            id: id.to_string(),
            matched: false,
            matched_address: None,
            longitude: None,
            latitude: None,
        }
    }
}

/// Keeps only confirmed matches. Pure and idempotent; an empty result is
/// valid and means no addresses resolved.
pub fn filter_matched(results: Vec<GeocodeResult>) -> Vec<GeocodeResult> {
    results.into_iter().filter(|r| r.matched).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_load_records_headerless() {
        let path = temp_path("geocode_mapper_test_load.csv");
        fs::write(
            &path,
            "1,409 Main St,Oakland,CA,94605\n2,310 Main St,,CA,94605\n",
        )
        .unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "1");
        assert_eq!(records[0].city.as_deref(), Some("Oakland"));
        assert_eq!(records[1].city, None);
        assert_eq!(records[1].zip.as_deref(), Some("94605"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_records_rejects_duplicate_id() {
        let path = temp_path("geocode_mapper_test_dup.csv");
        fs::write(
            &path,
            "house 1,409 Main St,Oakland,CA,94605\nhouse 1,310 Main St,,CA,94605\n",
        )
        .unwrap();

        let err = load_records(&path).unwrap_err();
        assert!(matches!(err, GeocodeError::Validation(_)));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_full_address_skips_empty_components() {
        let record = AddressRecord {
            id: "2".to_string(),
            street: "310 Main St".to_string(),
            city: None,
            state: Some("CA".to_string()),
            zip: Some("94605".to_string()),
        };
        assert_eq!(record.full_address(), "310 Main St, CA, 94605");
    }

    #[test]
    fn test_batch_body_preserves_empty_slots() {
        let records = vec![
            AddressRecord {
                id: "1".to_string(),
                street: "409 Main St".to_string(),
                city: Some("Oakland".to_string()),
                state: Some("CA".to_string()),
                zip: Some("94605".to_string()),
            },
            AddressRecord {
                id: "2".to_string(),
                street: "310 Main St".to_string(),
                city: None,
                state: Some("CA".to_string()),
                zip: Some("94605".to_string()),
            },
        ];

        let body = batch_request_body(&records).unwrap();
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(lines[0], "1,409 Main St,Oakland,CA,94605");
        // Missing city still reserves its comma slot
        assert_eq!(lines[1], "2,310 Main St,,CA,94605");
        assert_eq!(lines[1].matches(',').count(), 4);
    }

    #[test]
    fn test_batch_body_builds_for_comma_bearing_fields() {
        let records = vec![AddressRecord {
            id: "house 1".to_string(),
            street: "409 Main St, Apt 2".to_string(),
            city: Some("Oakland".to_string()),
            state: Some("CA".to_string()),
            zip: Some("94605".to_string()),
        }];

        let body = batch_request_body(&records).unwrap();
        // The comma-bearing street gets quoted so the slot count holds
        assert_eq!(body.trim_end(), "house 1,\"409 Main St, Apt 2\",Oakland,CA,94605");
    }

    #[test]
    fn test_filter_matched_drops_unmatched() {
        let results = vec![
            GeocodeResult::matched("1", None, "-122.27".into(), "37.80".into()),
            GeocodeResult::unmatched("2"),
        ];

        let filtered = filter_matched(results);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "1");
    }

    #[test]
    fn test_filter_matched_is_idempotent() {
        let results = vec![
            GeocodeResult::matched("1", None, "-122.27".into(), "37.80".into()),
            GeocodeResult::matched("2", None, "-122.41".into(), "37.77".into()),
        ];

        let once = filter_matched(results);
        let ids: Vec<_> = once.iter().map(|r| r.id.clone()).collect();
        let twice = filter_matched(once);
        let ids_again: Vec<_> = twice.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, ids_again);
    }
}
