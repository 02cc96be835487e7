//! US Census batch geocoder client.
//!
//! One multipart POST uploads the whole address table; the service blocks
//! and answers with headerless CSV, one line per input id:
//!
//! ```text
//! id, input_address, match_status, match_type, matched_address,
//! "longitude,latitude", tiger_line_id, side_of_street,
//! state_fips, county_fips, tract_fips
//! ```
//!
//! The coordinate pair arrives as a single quoted field with an embedded
//! comma. Unmatched lines stop after the match status.

use std::time::Duration;

use csv::ReaderBuilder;
use reqwest::multipart;
use tracing::debug;

use crate::error::GeocodeError;
use crate::records::{AddressRecord, GeocodeResult, batch_request_body};

const CENSUS_BATCH_URL: &str = "https://geocoding.geo.census.gov/geocoder/geographies/addressbatch";

pub struct CensusBatchClient {
    base_url: String,
    benchmark: String,
    vintage: String,
    client: reqwest::Client,
}

impl CensusBatchClient {
    /// Creates a client for the given benchmark/vintage dataset pair.
    ///
    /// The request timeout is generous: the service geocodes the whole file
    /// before answering, which takes tens of seconds for hundreds of rows.
    pub fn new(benchmark: &str, vintage: &str) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: CENSUS_BATCH_URL.to_string(),
            benchmark: benchmark.to_string(),
            vintage: vintage.to_string(),
            client,
        })
    }

    /// Uploads the address table and returns the raw response text.
    ///
    /// # Errors
    ///
    /// A rejected upload or non-success status fails the whole submission
    /// with [`GeocodeError::BatchSubmission`]; there is no partial result.
    pub async fn submit(&self, records: &[AddressRecord]) -> Result<String, GeocodeError> {
        let body = batch_request_body(records)?;
        debug!(rows = records.len(), bytes = body.len(), "Submitting address batch");

        let part = multipart::Part::bytes(body.into_bytes())
            .file_name("addresses.csv")
            .mime_str("text/csv")?;
        let form = multipart::Form::new()
            .part("addressFile", part)
            .text("benchmark", self.benchmark.clone())
            .text("vintage", self.vintage.clone());

        let response = self
            .client
            .post(&self.base_url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(GeocodeError::BatchSubmission(format!(
                "status {status}: {detail}"
            )));
        }

        Ok(response.text().await?)
    }
}

/// Parses the raw batch response into one [`GeocodeResult`] per line.
///
/// # Errors
///
/// A line that cannot be attributed or a matched line without a coordinate
/// pair fails the whole parse; a malformed aggregate response is not
/// trustworthy row by row.
pub fn parse_batch_response(text: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut results = Vec::new();
    for row in reader.records() {
        results.push(parse_batch_row(&row?)?);
    }
    Ok(results)
}

const MATCH_STATUSES: [&str; 3] = ["Match", "No_Match", "Tie"];

fn parse_batch_row(row: &csv::StringRecord) -> Result<GeocodeResult, GeocodeError> {
    let id = row
        .get(0)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GeocodeError::ResponseFormat("batch row with no id".to_string()))?;

    // The input-address echo shifts later columns when the service leaves it
    // unquoted, so anchor on the match-status column instead of position 2.
    let status_idx = row
        .iter()
        .position(|field| MATCH_STATUSES.contains(&field))
        .ok_or_else(|| GeocodeError::ResponseFormat(format!("record '{id}': no match status")))?;

    // "No_Match" and "Tie" carry no usable coordinates
    if row.get(status_idx) != Some("Match") {
        return Ok(GeocodeResult::unmatched(id));
    }

    let matched_address = row.get(status_idx + 2).map(str::to_string);
    let lon_lat = row.get(status_idx + 3).ok_or_else(|| {
        GeocodeError::ResponseFormat(format!("record '{id}': matched but no coordinate field"))
    })?;

    let (longitude, latitude) = match lon_lat.split_once(',') {
        Some((lon, lat)) => (lon.trim().to_string(), lat.trim().to_string()),
        // Tolerate an unquoted pair that the comma split across two columns
        None => {
            let lat = row.get(status_idx + 4).ok_or_else(|| {
                GeocodeError::ResponseFormat(format!("record '{id}': coordinate pair incomplete"))
            })?;
            (lon_lat.trim().to_string(), lat.trim().to_string())
        }
    };

    Ok(GeocodeResult::matched(id, matched_address, longitude, latitude))
}
