mod client;
mod basic;
pub mod auth;

pub use client::HttpClient;
pub use basic::BasicClient;

use crate::error::GeocodeError;

/// Executes a GET against `url` and returns the response body.
///
/// # Errors
///
/// Fails with [`GeocodeError::Network`] on connection problems and with
/// [`GeocodeError::ResponseFormat`] on a non-success status, since geocoding
/// services report bad queries that way.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>, GeocodeError> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse()
            .map_err(|e| GeocodeError::ResponseFormat(format!("invalid url '{url}': {e}")))?,
    );

    let resp = client.execute(req).await?;
    if !resp.status().is_success() {
        return Err(GeocodeError::ResponseFormat(format!(
            "service returned status {}",
            resp.status()
        )));
    }
    Ok(resp.bytes().await?.to_vec())
}
