//! Photon single-address geocoding client.
//!
//! Photon answers a free-text query with a GeoJSON FeatureCollection; the
//! best hit's coordinates sit at `features[0].geometry.coordinates` in
//! `[longitude, latitude]` order. The response is navigated as generic JSON
//! since Photon's property set varies by place type.

use serde_json::Value;

use crate::error::GeocodeError;
use crate::fetch::{BasicClient, HttpClient, fetch_bytes};
use crate::services::geocoder::{GeocodePoint, Geocoder};

const PHOTON_API_URL: &str = "https://photon.komoot.io/api";

pub struct PhotonClient<C = BasicClient> {
    base_url: String,
    client: C,
}

impl PhotonClient<BasicClient> {
    pub fn new() -> Self {
        Self::with_client(BasicClient::new())
    }
}

impl Default for PhotonClient<BasicClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: HttpClient> PhotonClient<C> {
    pub fn with_client(client: C) -> Self {
        Self {
            base_url: PHOTON_API_URL.to_string(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl<C: HttpClient> Geocoder for PhotonClient<C> {
    async fn resolve(&self, address: &str) -> Result<GeocodePoint, GeocodeError> {
        let url = reqwest::Url::parse_with_params(&self.base_url, &[("q", address)])
            .map_err(|e| GeocodeError::ResponseFormat(format!("invalid query url: {e}")))?;

        let bytes = fetch_bytes(&self.client, url.as_str()).await?;
        let json: Value = serde_json::from_slice(&bytes)?;
        extract_point(&json)
    }
}

/// Pulls the best hit's coordinate pair out of a Photon response.
fn extract_point(json: &Value) -> Result<GeocodePoint, GeocodeError> {
    let hit = &json["features"][0];
    if hit.is_null() {
        return Err(GeocodeError::ResponseFormat(
            "no features in Photon response".to_string(),
        ));
    }

    let coords = hit["geometry"]["coordinates"]
        .as_array()
        .filter(|c| c.len() >= 2)
        .ok_or_else(|| {
            GeocodeError::ResponseFormat("Photon feature has no coordinate pair".to_string())
        })?;

    let longitude = coords[0].as_number().ok_or_else(|| {
        GeocodeError::ResponseFormat("Photon longitude is not a number".to_string())
    })?;
    let latitude = coords[1].as_number().ok_or_else(|| {
        GeocodeError::ResponseFormat("Photon latitude is not a number".to_string())
    })?;

    Ok(GeocodePoint {
        longitude: longitude.to_string(),
        latitude: latitude.to_string(),
        matched_address: hit["properties"]["name"].as_str().map(str::to_string),
    })
}
