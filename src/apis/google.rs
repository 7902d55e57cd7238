use crate::apis::coordinate_value;
use crate::config::GeocoderConfig;
use crate::constants::{GOOGLE_GEOCODE_URL, GOOGLE_PROVIDER, GOOGLE_REGION_BIAS};
use crate::error::Result;
use crate::types::{Coordinates, GeocodeProvider};
use serde_json::Value;
use tracing::{instrument, warn};

/// Google Geocoding API, biased towards Korean results.
pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.settings.timeout())
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: GOOGLE_GEOCODE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Only `status == "OK"` with at least one result counts as a hit.
    /// `results[0].geometry.location` already holds lat then lng.
    pub fn parse_response(data: &Value) -> Result<Option<Coordinates>> {
        let status = data["status"].as_str().unwrap_or("UNKNOWN");
        let first = match data["results"].as_array().and_then(|results| results.first()) {
            Some(first) if status == "OK" => first,
            _ => {
                warn!("Google API: {}", status);
                return Ok(None);
            }
        };
        let location = &first["geometry"]["location"];
        let latitude = coordinate_value(&location["lat"], "results[0].geometry.location.lat")?;
        let longitude = coordinate_value(&location["lng"], "results[0].geometry.location.lng")?;
        Ok(Some(Coordinates { latitude, longitude }))
    }
}

#[async_trait::async_trait]
impl GeocodeProvider for GoogleGeocoder {
    fn provider_name(&self) -> &'static str {
        GOOGLE_PROVIDER
    }

    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("address", address),
                ("key", self.api_key.as_str()),
                ("region", GOOGLE_REGION_BIAS),
            ])
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response.json().await?;
        Self::parse_response(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_ok_response() {
        let data = json!({
            "status": "OK",
            "results": [
                { "geometry": { "location": { "lat": 37.5172, "lng": 127.0473 } } },
                { "geometry": { "location": { "lat": 1.0, "lng": 2.0 } } }
            ]
        });
        let coords = GoogleGeocoder::parse_response(&data).unwrap().unwrap();
        assert_eq!(coords, Coordinates { latitude: 37.5172, longitude: 127.0473 });
    }

    #[test]
    fn test_parse_zero_results() {
        let data = json!({ "status": "ZERO_RESULTS", "results": [] });
        assert!(GoogleGeocoder::parse_response(&data).unwrap().is_none());
    }

    #[test]
    fn test_parse_denied_with_stale_results_is_not_found() {
        let data = json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": [ { "geometry": { "location": { "lat": 37.5, "lng": 127.0 } } } ]
        });
        assert!(GoogleGeocoder::parse_response(&data).unwrap().is_none());
    }

    #[test]
    fn test_parse_ok_without_results() {
        let data = json!({ "status": "OK" });
        assert!(GoogleGeocoder::parse_response(&data).unwrap().is_none());
    }
}
