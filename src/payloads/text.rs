use serde::Deserialize;

use crate::errors::AppError;
use crate::payloads::escape::escape_input;
use crate::payloads::{present, require};
use crate::qr::encoder::{AUTO_VERSION, EccLevel, EciMode, EncodeOptions, RequestedVersion};

fn auto_version() -> i32 {
    AUTO_VERSION
}

/// Free text plus the encoder knobs that only this content type exposes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainTextPayload {
    #[serde(default, alias = "plainText")]
    pub text: String,
    #[serde(default)]
    pub ecc_level: EccLevel,
    #[serde(default)]
    pub force_utf8: bool,
    #[serde(default, alias = "utf8BOM")]
    pub utf8_bom: bool,
    #[serde(default)]
    pub eci_mode: EciMode,
    #[serde(default = "auto_version")]
    pub requested_version: i32,
}

impl PlainTextPayload {
    pub fn to_payload(&self) -> Result<String, AppError> {
        if self.text.is_empty() {
            return Err(AppError::validation("text is required"));
        }
        Ok(self.text.clone())
    }

    pub fn encode_options(&self) -> Result<EncodeOptions, AppError> {
        Ok(EncodeOptions {
            ecc_level: self.ecc_level,
            eci_mode: self.eci_mode,
            force_utf8: self.force_utf8,
            utf8_bom: self.utf8_bom,
            version: RequestedVersion::try_from(self.requested_version)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlPayload {
    #[serde(default)]
    pub url: String,
}

impl UrlPayload {
    pub fn to_payload(&self) -> Result<String, AppError> {
        let url = require(&self.url, "url")?;
        if url.starts_with("http") {
            Ok(url.to_string())
        } else {
            Ok(format!("http://{}", url))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkPayload {
    #[serde(default)]
    pub url: String,
    pub title: Option<String>,
}

impl BookmarkPayload {
    /// `MEBKM:TITLE:<title>;URL:<url>;;`
    pub fn to_payload(&self) -> Result<String, AppError> {
        let url = require(&self.url, "url")?;
        let title = present(&self.title)
            .map(|title| format!("TITLE:{};", escape_input(title)))
            .unwrap_or_default();
        Ok(format!("MEBKM:{}URL:{};;", title, escape_input(url)))
    }
}
