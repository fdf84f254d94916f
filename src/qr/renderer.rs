use std::io::Cursor;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgba};
use qrcode::render::{Renderer, svg};

use crate::errors::AppError;
use crate::qr::encoder::{QUIET_ZONE, SymbolMatrix};

pub const DEFAULT_PIXELS_PER_MODULE: u32 = 20;
pub const DEFAULT_DPI: u32 = 150;
pub const DEFAULT_JPG_QUALITY: u8 = 85;
pub const DEFAULT_ASCII_REPEAT: u32 = 1;

const MAX_PIXELS_PER_MODULE: u32 = 100;
const MAX_DPI: u32 = 1200;
const MAX_ASCII_REPEAT: u32 = 10;
const MAX_GLYPH_CHARS: usize = 8;
const MAX_RASTER_SIDE: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderType {
    Image,
    Svg,
    #[default]
    Base64,
    Ascii,
    /// Served through the raster pipeline; there is no vector PDF writer.
    Pdf,
}

impl FromStr for RenderType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "image" => Ok(RenderType::Image),
            "svg" => Ok(RenderType::Svg),
            "base64" => Ok(RenderType::Base64),
            "ascii" => Ok(RenderType::Ascii),
            "pdf" => Ok(RenderType::Pdf),
            _ => Err(AppError::UnsupportedRenderType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterFormat {
    #[default]
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn mime(self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
            RasterFormat::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for RasterFormat {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "png" => Ok(RasterFormat::Png),
            "jpeg" | "jpg" => Ok(RasterFormat::Jpeg),
            _ => Err(AppError::UnsupportedVariant(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub render_type: RenderType,
    pub pixels_per_module: u32,
    pub dark_color: String,
    pub light_color: String,
    pub draw_quiet_zone: bool,
    pub dpi: u32,
    pub jpg_quality: u8,
    pub ascii_repeat_per_module: u32,
    pub dark_glyph: String,
    pub light_glyph: String,
    pub eol: String,
    pub raster_format: RasterFormat,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            render_type: RenderType::default(),
            pixels_per_module: DEFAULT_PIXELS_PER_MODULE,
            dark_color: "#000000".to_string(),
            light_color: "#ffffff".to_string(),
            draw_quiet_zone: true,
            dpi: DEFAULT_DPI,
            jpg_quality: DEFAULT_JPG_QUALITY,
            ascii_repeat_per_module: DEFAULT_ASCII_REPEAT,
            dark_glyph: "\u{2588}\u{2588}".to_string(),
            light_glyph: "  ".to_string(),
            eol: "\n".to_string(),
            raster_format: RasterFormat::default(),
        }
    }
}

impl RenderRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=MAX_PIXELS_PER_MODULE).contains(&self.pixels_per_module) {
            return Err(AppError::validation(format!(
                "pixelsPerModule must be between 1 and {}",
                MAX_PIXELS_PER_MODULE
            )));
        }
        if !(1..=MAX_DPI).contains(&self.dpi) {
            return Err(AppError::validation(format!(
                "dpi must be between 1 and {}",
                MAX_DPI
            )));
        }
        if !(1..=100).contains(&self.jpg_quality) {
            return Err(AppError::validation("jpgQuality must be between 1 and 100"));
        }
        if !(1..=MAX_ASCII_REPEAT).contains(&self.ascii_repeat_per_module) {
            return Err(AppError::validation(format!(
                "asciiRepeatPerModule must be between 1 and {}",
                MAX_ASCII_REPEAT
            )));
        }
        if self.dark_glyph.is_empty() {
            return Err(AppError::validation("darkGlyph must not be empty"));
        }
        for (field, value) in [
            ("darkGlyph", &self.dark_glyph),
            ("lightGlyph", &self.light_glyph),
            ("eol", &self.eol),
        ] {
            if value.chars().count() > MAX_GLYPH_CHARS {
                return Err(AppError::validation(format!(
                    "{} must be at most {} characters",
                    field, MAX_GLYPH_CHARS
                )));
            }
        }
        parse_hex_color(&self.dark_color)?;
        parse_hex_color(&self.light_color)?;
        Ok(())
    }
}

/// Output of a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Binary { bytes: Vec<u8>, mime: &'static str },
    Svg(String),
    Ascii(String),
    DataUri(String),
}

impl Artifact {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Artifact::Binary { .. } => None,
            Artifact::Svg(text) | Artifact::Ascii(text) | Artifact::DataUri(text) => Some(text),
        }
    }
}

/// Expects a request that already passed [`RenderRequest::validate`].
pub fn render(matrix: &SymbolMatrix, request: &RenderRequest) -> Result<Artifact, AppError> {
    match request.render_type {
        RenderType::Image | RenderType::Pdf => Ok(Artifact::Binary {
            bytes: raster(matrix, request)?,
            mime: request.raster_format.mime(),
        }),
        RenderType::Base64 => {
            let bytes = raster(matrix, request)?;
            Ok(Artifact::DataUri(format!(
                "data:{};base64,{}",
                request.raster_format.mime(),
                STANDARD.encode(bytes)
            )))
        }
        RenderType::Svg => svg_markup(matrix, request).map(Artifact::Svg),
        RenderType::Ascii => Ok(Artifact::Ascii(ascii(matrix, request))),
    }
}

fn quiet_zone(request: &RenderRequest) -> usize {
    if request.draw_quiet_zone {
        QUIET_ZONE as usize
    } else {
        0
    }
}

fn raster(matrix: &SymbolMatrix, request: &RenderRequest) -> Result<Vec<u8>, AppError> {
    let side = (matrix.width() + 2 * quiet_zone(request)) as u64 * request.pixels_per_module as u64;
    if side > MAX_RASTER_SIDE {
        return Err(AppError::validation(format!(
            "rendered image would be {} pixels wide, the limit is {}",
            side, MAX_RASTER_SIDE
        )));
    }

    let [dr, dg, db] = parse_hex_color(&request.dark_color)?;
    let [lr, lg, lb] = parse_hex_color(&request.light_color)?;
    let canvas = Renderer::<Rgba<u8>>::new(matrix.modules(), matrix.width(), QUIET_ZONE)
        .quiet_zone(request.draw_quiet_zone)
        .module_dimensions(request.pixels_per_module, request.pixels_per_module)
        .dark_color(Rgba([dr, dg, db, 255]))
        .light_color(Rgba([lr, lg, lb, 255]))
        .build();

    let mut bytes = Vec::new();
    match request.raster_format {
        RasterFormat::Png => DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| AppError::Internal(format!("PNG encoding error: {}", e)))?,
        RasterFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, request.jpg_quality)
                .encode_image(&rgb)
                .map_err(|e| AppError::Internal(format!("JPEG encoding error: {}", e)))?;
        }
    }
    Ok(bytes)
}

fn svg_markup(matrix: &SymbolMatrix, request: &RenderRequest) -> Result<String, AppError> {
    let dark = hex_string(parse_hex_color(&request.dark_color)?);
    let light = hex_string(parse_hex_color(&request.light_color)?);
    Ok(
        Renderer::<svg::Color>::new(matrix.modules(), matrix.width(), QUIET_ZONE)
            .quiet_zone(request.draw_quiet_zone)
            .module_dimensions(request.pixels_per_module, request.pixels_per_module)
            .dark_color(svg::Color(dark.as_str()))
            .light_color(svg::Color(light.as_str()))
            .build(),
    )
}

fn ascii(matrix: &SymbolMatrix, request: &RenderRequest) -> String {
    let margin = quiet_zone(request);
    let side = matrix.width() + 2 * margin;
    let repeat = request.ascii_repeat_per_module as usize;

    let mut lines = Vec::with_capacity(side);
    for y in 0..side {
        let mut line = String::new();
        for x in 0..side {
            let dark = match (x.checked_sub(margin), y.checked_sub(margin)) {
                (Some(mx), Some(my)) => matrix.is_dark(mx, my),
                _ => false,
            };
            let glyph = if dark {
                &request.dark_glyph
            } else {
                &request.light_glyph
            };
            for _ in 0..repeat {
                line.push_str(glyph);
            }
        }
        lines.push(line);
    }
    lines.join(&request.eol)
}

fn parse_hex_color(value: &str) -> Result<[u8; 3], AppError> {
    let invalid = || AppError::validation(format!("`{}` is not a #RGB or #RRGGBB colour", value));
    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return Err(invalid()),
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

fn hex_string([r, g, b]: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> SymbolMatrix {
        SymbolMatrix::from_rows(&[&[true, false], &[false, true]]).unwrap()
    }

    fn request(render_type: RenderType) -> RenderRequest {
        RenderRequest {
            render_type,
            ..RenderRequest::default()
        }
    }

    #[test]
    fn render_type_parsing() {
        assert_eq!("svg".parse::<RenderType>().unwrap(), RenderType::Svg);
        assert_eq!("Base64".parse::<RenderType>().unwrap(), RenderType::Base64);
        assert_eq!("PDF".parse::<RenderType>().unwrap(), RenderType::Pdf);
        assert!(matches!(
            "Gif".parse::<RenderType>(),
            Err(AppError::UnsupportedRenderType(_))
        ));
    }

    #[test]
    fn base64_is_png_data_uri() {
        let artifact = render(&checker(), &request(RenderType::Base64)).unwrap();
        let text = artifact.as_text().unwrap();
        assert!(text.starts_with("data:image/png;base64,"));
        let decoded = STANDARD
            .decode(text.trim_start_matches("data:image/png;base64,"))
            .unwrap();
        assert_eq!(&decoded[1..4], b"PNG");
    }

    #[test]
    fn image_scales_modules_and_quiet_zone() {
        let mut req = request(RenderType::Image);
        req.pixels_per_module = 3;
        let Artifact::Binary { bytes, mime } = render(&checker(), &req).unwrap() else {
            panic!("expected binary artifact");
        };
        assert_eq!(mime, "image/png");
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.width(), (2 + 8) * 3);
        // first module after the 4-module quiet zone is dark
        assert_eq!(decoded.get_pixel(12, 12), &Rgba([0, 0, 0, 255]));
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn image_uses_requested_colours() {
        let mut req = request(RenderType::Image);
        req.pixels_per_module = 1;
        req.draw_quiet_zone = false;
        req.dark_color = "#f00".to_string();
        req.light_color = "#00FF00".to_string();
        let Artifact::Binary { bytes, .. } = render(&checker(), &req).unwrap() else {
            panic!("expected binary artifact");
        };
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.width(), 2);
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(decoded.get_pixel(1, 0), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn pdf_degrades_to_raster() {
        let artifact = render(&checker(), &request(RenderType::Pdf)).unwrap();
        assert!(matches!(artifact, Artifact::Binary { mime: "image/png", .. }));
    }

    #[test]
    fn jpeg_raster_format() {
        let mut req = request(RenderType::Base64);
        req.raster_format = RasterFormat::Jpeg;
        req.jpg_quality = 50;
        let artifact = render(&checker(), &req).unwrap();
        assert!(artifact.as_text().unwrap().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn svg_carries_colours() {
        let mut req = request(RenderType::Svg);
        req.dark_color = "#123456".to_string();
        let artifact = render(&checker(), &req).unwrap();
        let svg = artifact.as_text().unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("#123456"));
        assert!(svg.contains("#ffffff"));
    }

    #[test]
    fn ascii_grid_without_quiet_zone() {
        let mut req = request(RenderType::Ascii);
        req.draw_quiet_zone = false;
        req.dark_glyph = "#".to_string();
        req.light_glyph = ".".to_string();
        req.ascii_repeat_per_module = 2;
        req.eol = "|".to_string();
        let artifact = render(&checker(), &req).unwrap();
        assert_eq!(artifact, Artifact::Ascii("##..|..##".to_string()));
    }

    #[test]
    fn ascii_quiet_zone_adds_margin_rows() {
        let artifact = render(&checker(), &request(RenderType::Ascii)).unwrap();
        let text = artifact.as_text().unwrap();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|line| line.chars().count() == 20));
        assert_eq!(lines[4].trim(), "\u{2588}\u{2588}");
    }

    #[test]
    fn invalid_options_are_validation_errors() {
        let mut req = request(RenderType::Svg);
        req.dark_color = "black".to_string();
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));

        let mut req = request(RenderType::Image);
        req.pixels_per_module = 0;
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));

        let mut req = request(RenderType::Image);
        req.jpg_quality = 0;
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn ascii_glyphs_are_bounded() {
        let mut req = request(RenderType::Ascii);
        req.dark_glyph = "#".repeat(8);
        req.light_glyph = "\u{2591}".repeat(8);
        assert!(req.validate().is_ok());

        req.dark_glyph = "#".repeat(8192);
        assert_eq!(
            req.validate(),
            Err(AppError::validation("darkGlyph must be at most 8 characters"))
        );

        req.dark_glyph = "#".to_string();
        req.light_glyph = " ".repeat(9);
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));

        req.light_glyph = " ".to_string();
        req.eol = "\n".repeat(9);
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn oversized_raster_is_rejected() {
        let modules = vec![qrcode::Color::Light; 177 * 177];
        let matrix = SymbolMatrix::new(177, modules).unwrap();
        let mut req = request(RenderType::Image);
        req.pixels_per_module = 100;
        assert!(matches!(render(&matrix, &req), Err(AppError::Validation(_))));
    }
}
