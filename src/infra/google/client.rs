//! Google Geocoding API client.
//!
//! The API key is injected as a `key` query parameter by the fetch-layer
//! [`UrlParam`] wrapper. The response is deserialized into a named-field
//! contract rather than navigated by position, so a reordered response
//! body fails loudly instead of silently swapping coordinates.

use serde::Deserialize;

use crate::error::GeocodeError;
use crate::fetch::auth::UrlParam;
use crate::fetch::{BasicClient, fetch_bytes};
use crate::services::geocoder::{GeocodePoint, Geocoder};

const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeHit>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    formatted_address: String,
    geometry: HitGeometry,
}

#[derive(Debug, Deserialize)]
struct HitGeometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

pub struct GoogleClient {
    base_url: String,
    client: UrlParam<BasicClient>,
}

impl GoogleClient {
    pub fn new(api_key: String) -> Self {
        Self {
            base_url: GOOGLE_GEOCODE_URL.to_string(),
            client: UrlParam {
                inner: BasicClient::new(),
                param_name: "key".to_string(),
                key: api_key,
            },
        }
    }
}

#[async_trait::async_trait]
impl Geocoder for GoogleClient {
    async fn resolve(&self, address: &str) -> Result<GeocodePoint, GeocodeError> {
        let url = reqwest::Url::parse_with_params(&self.base_url, &[("address", address)])
            .map_err(|e| GeocodeError::ResponseFormat(format!("invalid query url: {e}")))?;

        let bytes = fetch_bytes(&self.client, url.as_str()).await?;
        let response: GeocodeResponse = serde_json::from_slice(&bytes)?;
        extract_point(response)
    }
}

fn extract_point(response: GeocodeResponse) -> Result<GeocodePoint, GeocodeError> {
    if response.status != "OK" {
        let detail = response.error_message.unwrap_or_default();
        return Err(GeocodeError::ResponseFormat(format!(
            "geocoder status '{}' {detail}",
            response.status
        )));
    }

    let hit = response.results.into_iter().next().ok_or_else(|| {
        GeocodeError::ResponseFormat("geocoder returned OK with no results".to_string())
    })?;

    // Service reports latitude first; features want longitude first.
    Ok(GeocodePoint {
        longitude: hit.geometry.location.lng.to_string(),
        latitude: hit.geometry.location.lat.to_string(),
        matched_address: Some(hit.formatted_address),
    })
}
