use serde::Deserialize;

use crate::errors::AppError;
use crate::payloads::require;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum GeolocationEncoding {
    #[default]
    #[serde(rename = "GEO", alias = "Geo")]
    Geo,
    GoogleMaps,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationPayload {
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub encoding: GeolocationEncoding,
}

impl GeolocationPayload {
    pub fn to_payload(&self) -> Result<String, AppError> {
        let latitude = coordinate(&self.latitude, "latitude", 90.0)?;
        let longitude = coordinate(&self.longitude, "longitude", 180.0)?;
        Ok(match self.encoding {
            GeolocationEncoding::Geo => format!("geo:{},{}", latitude, longitude),
            GeolocationEncoding::GoogleMaps => {
                format!("https://maps.google.com/maps?q={},{}", latitude, longitude)
            }
        })
    }
}

/// Normalises a decimal comma and range-checks; the caller's digits are kept as typed.
fn coordinate(raw: &str, field: &str, limit: f64) -> Result<String, AppError> {
    let value = require(raw, field)?.replace(',', ".");
    let parsed: f64 = Some(value.as_str())
        .filter(|v| is_plain_decimal(v))
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| AppError::validation(format!("{} must be a decimal number", field)))?;
    if !parsed.is_finite() || parsed.abs() > limit {
        return Err(AppError::validation(format!(
            "{} must be between -{} and {}",
            field, limit, limit
        )));
    }
    Ok(value)
}

/// `[+-]digits[.digits]`, no exponent.
fn is_plain_decimal(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    digits(whole) && fraction.is_none_or(digits)
}
