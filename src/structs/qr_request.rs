use serde::Deserialize;
use validator::Validate;

use crate::errors::AppError;
use crate::models::qr_code::RecordData;
use crate::qr::renderer::{RasterFormat, RenderRequest, RenderType};

/// Render options for `POST /api/generate/{contentType}`, all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderQuery {
    pub render_type: Option<String>,
    pub pixels_per_module: Option<u32>,
    pub dark_color: Option<String>,
    pub light_color: Option<String>,
    pub draw_quiet_zone: Option<bool>,
    pub dpi: Option<u32>,
    pub jpg_quality: Option<u8>,
    pub ascii_repeat_per_module: Option<u32>,
    pub dark_glyph: Option<String>,
    pub light_glyph: Option<String>,
    pub eol: Option<String>,
    pub image_format: Option<String>,
}

impl RenderQuery {
    pub fn into_render_request(self) -> Result<RenderRequest, AppError> {
        let defaults = RenderRequest::default();
        Ok(RenderRequest {
            render_type: match self.render_type {
                Some(tag) => tag.parse::<RenderType>()?,
                None => defaults.render_type,
            },
            pixels_per_module: self.pixels_per_module.unwrap_or(defaults.pixels_per_module),
            dark_color: self.dark_color.unwrap_or(defaults.dark_color),
            light_color: self.light_color.unwrap_or(defaults.light_color),
            draw_quiet_zone: self.draw_quiet_zone.unwrap_or(defaults.draw_quiet_zone),
            dpi: self.dpi.unwrap_or(defaults.dpi),
            jpg_quality: self.jpg_quality.unwrap_or(defaults.jpg_quality),
            ascii_repeat_per_module: self
                .ascii_repeat_per_module
                .unwrap_or(defaults.ascii_repeat_per_module),
            dark_glyph: self.dark_glyph.unwrap_or(defaults.dark_glyph),
            light_glyph: self.light_glyph.unwrap_or(defaults.light_glyph),
            eol: self.eol.unwrap_or(defaults.eol),
            raster_format: match self.image_format {
                Some(tag) => tag.parse::<RasterFormat>()?,
                None => defaults.raster_format,
            },
        })
    }
}

/// Body of `POST /api/records` and `PUT /api/records/{id}`. Any `ownerId`
/// sent by the client is ignored.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    #[validate(length(min = 1, max = 25, message = "title must be 1 to 25 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 50, message = "description must be 1 to 50 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "type must be 1 to 50 characters"))]
    pub kind: String,
    #[serde(default)]
    pub is_public: bool,
}

impl From<RecordRequest> for RecordData {
    fn from(request: RecordRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            content: request.content,
            kind: request.kind,
            is_public: request.is_public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_gives_default_render_request() {
        let request = RenderQuery::default().into_render_request().unwrap();
        assert_eq!(request, RenderRequest::default());
        assert_eq!(request.render_type, RenderType::Base64);
    }

    #[test]
    fn query_overrides_and_tags() {
        let query = RenderQuery {
            render_type: Some("svg".to_string()),
            pixels_per_module: Some(5),
            image_format: Some("Jpeg".to_string()),
            ..RenderQuery::default()
        };
        let request = query.into_render_request().unwrap();
        assert_eq!(request.render_type, RenderType::Svg);
        assert_eq!(request.pixels_per_module, 5);
        assert_eq!(request.raster_format, RasterFormat::Jpeg);

        let query = RenderQuery {
            render_type: Some("Gif".to_string()),
            ..RenderQuery::default()
        };
        assert!(matches!(
            query.into_render_request(),
            Err(AppError::UnsupportedRenderType(_))
        ));
    }

    #[test]
    fn record_request_limits() {
        let request: RecordRequest = serde_json::from_str(
            r#"{"title":"Guest WiFi","description":"Lobby","content":"data:x","type":"wifi","ownerId":"mallory"}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
        assert!(!request.is_public);

        let request: RecordRequest = serde_json::from_str(&format!(
            r#"{{"title":"{}","description":"d","content":"c","type":"t"}}"#,
            "x".repeat(26)
        ))
        .unwrap();
        assert!(request.validate().is_err());

        let request: RecordRequest = serde_json::from_str(
            r#"{"title":"t","description":"","content":"c","type":"t"}"#,
        )
        .unwrap();
        let err: AppError = request.validate().unwrap_err().into();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
