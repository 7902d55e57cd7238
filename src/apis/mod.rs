pub mod google;
pub mod kakao;

use crate::config::{GeocoderConfig, Provider};
use crate::error::{IngestError, Result};
use crate::types::GeocodeProvider;
use serde_json::Value;

pub use google::GoogleGeocoder;
pub use kakao::KakaoGeocoder;

/// Build the client for the configured provider.
pub fn create_provider(config: &GeocoderConfig) -> Result<Box<dyn GeocodeProvider>> {
    let provider: Box<dyn GeocodeProvider> = match config.provider {
        Provider::Kakao => Box::new(KakaoGeocoder::new(config)?),
        Provider::Google => Box::new(GoogleGeocoder::new(config)?),
    };
    Ok(provider)
}

/// Read a coordinate that a provider may send either as a JSON number or as
/// a numeric string.
pub(crate) fn coordinate_value(value: &Value, field: &str) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| IngestError::Api {
        message: format!("{field} is not a coordinate: {value}"),
    })
}
