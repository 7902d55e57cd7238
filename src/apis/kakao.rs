use crate::apis::coordinate_value;
use crate::config::GeocoderConfig;
use crate::constants::{KAKAO_ADDRESS_SEARCH_URL, KAKAO_PROVIDER};
use crate::error::Result;
use crate::types::{Coordinates, GeocodeProvider};
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::{debug, instrument};

/// Kakao Local address search. Best coverage for Korean street and lot
/// addresses.
pub struct KakaoGeocoder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl KakaoGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.settings.timeout())
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: KAKAO_ADDRESS_SEARCH_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Kakao reports `x` = longitude and `y` = latitude, as strings.
    pub fn parse_response(data: &Value) -> Result<Option<Coordinates>> {
        let Some(first) = data["documents"].as_array().and_then(|docs| docs.first()) else {
            return Ok(None);
        };
        let longitude = coordinate_value(&first["x"], "documents[0].x")?;
        let latitude = coordinate_value(&first["y"], "documents[0].y")?;
        Ok(Some(Coordinates { latitude, longitude }))
    }
}

#[async_trait::async_trait]
impl GeocodeProvider for KakaoGeocoder {
    fn provider_name(&self) -> &'static str {
        KAKAO_PROVIDER
    }

    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let response = self
            .client
            .get(&self.base_url)
            .header(AUTHORIZATION, format!("KakaoAK {}", self.api_key))
            .query(&[("query", address)])
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response.json().await?;
        debug!(
            "Kakao returned {} documents",
            data["documents"].as_array().map_or(0, Vec::len)
        );
        Self::parse_response(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use serde_json::json;

    #[test]
    fn test_parse_swaps_x_and_y() {
        let data = json!({
            "meta": { "total_count": 1 },
            "documents": [
                { "address_name": "서울 강남구 역삼동 123", "x": "127.0365", "y": "37.5006" },
                { "address_name": "다른 주소", "x": "126.0", "y": "35.0" }
            ]
        });
        let coords = KakaoGeocoder::parse_response(&data).unwrap().unwrap();
        assert_eq!(coords.latitude, 37.5006);
        assert_eq!(coords.longitude, 127.0365);
    }

    #[test]
    fn test_parse_numeric_fields() {
        let data = json!({ "documents": [ { "x": 126.9780, "y": 37.5665 } ] });
        let coords = KakaoGeocoder::parse_response(&data).unwrap().unwrap();
        assert_eq!(coords, Coordinates { latitude: 37.5665, longitude: 126.9780 });
    }

    #[test]
    fn test_parse_no_documents() {
        let data = json!({ "meta": { "total_count": 0 }, "documents": [] });
        assert!(KakaoGeocoder::parse_response(&data).unwrap().is_none());
        assert!(KakaoGeocoder::parse_response(&json!({})).unwrap().is_none());
    }

    #[test]
    fn test_parse_garbage_coordinate() {
        let data = json!({ "documents": [ { "x": "east", "y": "37.5" } ] });
        let err = KakaoGeocoder::parse_response(&data).unwrap_err();
        assert!(matches!(err, IngestError::Api { .. }));
    }
}
