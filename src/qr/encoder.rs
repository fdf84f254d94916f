use qrcode::bits::Bits;
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode, Version};
use serde::Deserialize;

use crate::errors::AppError;

/// Quiet zone width (in modules) of a normal QR symbol.
pub const QUIET_ZONE: u32 = 4;

pub const AUTO_VERSION: i32 = -1;
const MAX_VERSION: i16 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum EccLevel {
    L,
    M,
    #[default]
    Q,
    H,
}

impl From<EccLevel> for EcLevel {
    fn from(level: EccLevel) -> Self {
        match level {
            EccLevel::L => EcLevel::L,
            EccLevel::M => EcLevel::M,
            EccLevel::Q => EcLevel::Q,
            EccLevel::H => EcLevel::H,
        }
    }
}

/// Extended Channel Interpretation applied to the data segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum EciMode {
    #[default]
    Default,
    #[serde(alias = "ISO_8859_1")]
    Iso8859_1,
    #[serde(alias = "UTF8", alias = "UTF_8")]
    Utf8,
}

impl EciMode {
    fn designator(self) -> Option<u32> {
        match self {
            EciMode::Default => None,
            EciMode::Iso8859_1 => Some(3),
            EciMode::Utf8 => Some(26),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestedVersion {
    #[default]
    Auto,
    Fixed(i16),
}

impl TryFrom<i32> for RequestedVersion {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            AUTO_VERSION => Ok(RequestedVersion::Auto),
            1..=40 => Ok(RequestedVersion::Fixed(value as i16)),
            _ => Err(AppError::validation(
                "requestedVersion must be either -1 or between 1 and 40",
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    pub ecc_level: EccLevel,
    pub eci_mode: EciMode,
    pub force_utf8: bool,
    pub utf8_bom: bool,
    pub version: RequestedVersion,
}

/// Square grid of dark/light modules, without quiet zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatrix {
    width: usize,
    modules: Vec<Color>,
}

impl SymbolMatrix {
    pub fn new(width: usize, modules: Vec<Color>) -> Result<Self, AppError> {
        if width == 0 || modules.len() != width * width {
            return Err(AppError::Internal(format!(
                "symbol matrix of width {} cannot hold {} modules",
                width,
                modules.len()
            )));
        }
        Ok(Self { width, modules })
    }

    #[cfg(test)]
    pub fn from_rows(rows: &[&[bool]]) -> Result<Self, AppError> {
        let modules = rows
            .iter()
            .flat_map(|row| row.iter())
            .map(|dark| if *dark { Color::Dark } else { Color::Light })
            .collect();
        Self::new(rows.len(), modules)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn modules(&self) -> &[Color] {
        &self.modules
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x] == Color::Dark
    }
}

/// Turns a canonical payload into a module matrix.
pub trait SymbolEncoder: Send + Sync {
    fn encode(&self, content: &str, options: &EncodeOptions) -> Result<SymbolMatrix, AppError>;
}

/// Encoder backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrSymbolEncoder;

impl SymbolEncoder for QrSymbolEncoder {
    fn encode(&self, content: &str, options: &EncodeOptions) -> Result<SymbolMatrix, AppError> {
        let data = content_bytes(content, options)?;
        let ec_level = EcLevel::from(options.ecc_level);
        let eci = options.eci_mode.designator();

        let code = match options.version {
            RequestedVersion::Fixed(version) => {
                build_symbol(&data, Version::Normal(version), eci, ec_level).map_err(|err| {
                    match err {
                        QrError::DataTooLong => AppError::CapacityExceeded(format!(
                            "{} bytes do not fit version {} at level {:?}",
                            data.len(),
                            version,
                            options.ecc_level
                        )),
                        other => AppError::Internal(format!("QR code generation error: {}", other)),
                    }
                })?
            }
            RequestedVersion::Auto => auto_symbol(&data, eci, ec_level, options.ecc_level)?,
        };

        SymbolMatrix::new(code.width(), code.to_colors())
    }
}

fn auto_symbol(
    data: &[u8],
    eci: Option<u32>,
    ec_level: EcLevel,
    requested: EccLevel,
) -> Result<QrCode, AppError> {
    for version in 1..=MAX_VERSION {
        match build_symbol(data, Version::Normal(version), eci, ec_level) {
            Ok(code) => return Ok(code),
            Err(QrError::DataTooLong) => continue,
            Err(err) => {
                return Err(AppError::Internal(format!(
                    "QR code generation error: {}",
                    err
                )));
            }
        }
    }
    Err(AppError::CapacityExceeded(format!(
        "{} bytes do not fit version 40 at level {:?}",
        data.len(),
        requested
    )))
}

fn build_symbol(
    data: &[u8],
    version: Version,
    eci: Option<u32>,
    ec_level: EcLevel,
) -> Result<QrCode, QrError> {
    let mut bits = Bits::new(version);
    if let Some(designator) = eci {
        bits.push_eci_designator(designator)?;
    }
    // The segment optimizer may read multi-byte UTF-8 as Kanji, so only
    // plain ASCII goes through it.
    if data.is_ascii() {
        bits.push_optimal_data(data)?;
    } else {
        bits.push_byte_data(data)?;
    }
    bits.push_terminator(ec_level)?;
    QrCode::with_bits(bits, ec_level)
}

fn content_bytes(content: &str, options: &EncodeOptions) -> Result<Vec<u8>, AppError> {
    match options.eci_mode {
        EciMode::Iso8859_1 => to_latin1(content).ok_or_else(|| {
            AppError::validation("content contains characters outside ISO-8859-1")
        }),
        EciMode::Utf8 => Ok(utf8_bytes(content, options.utf8_bom)),
        EciMode::Default => match to_latin1(content) {
            Some(bytes) if !options.force_utf8 => Ok(bytes),
            _ => Ok(utf8_bytes(content, options.utf8_bom)),
        },
    }
}

fn utf8_bytes(content: &str, bom: bool) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(content.len() + 3);
    if bom {
        bytes.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
    }
    bytes.extend_from_slice(content.as_bytes());
    bytes
}

/// Latin-1 bytes of `value`, or `None` if any character lies above U+00FF.
pub fn to_latin1(value: &str) -> Option<Vec<u8>> {
    value.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(version: i32) -> EncodeOptions {
        EncodeOptions {
            version: RequestedVersion::try_from(version).unwrap(),
            ..EncodeOptions::default()
        }
    }

    #[test]
    fn requested_version_bounds() {
        assert_eq!(RequestedVersion::try_from(-1), Ok(RequestedVersion::Auto));
        assert_eq!(RequestedVersion::try_from(1), Ok(RequestedVersion::Fixed(1)));
        assert_eq!(
            RequestedVersion::try_from(40),
            Ok(RequestedVersion::Fixed(40))
        );
        for bad in [0, 41, -2, 100] {
            assert!(matches!(
                RequestedVersion::try_from(bad),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn auto_version_picks_smallest_symbol() {
        let matrix = QrSymbolEncoder.encode("HELLO", &options(-1)).unwrap();
        // version 1 is 21 modules wide
        assert_eq!(matrix.width(), 21);
    }

    #[test]
    fn fixed_version_is_honoured() {
        let matrix = QrSymbolEncoder.encode("HELLO", &options(5)).unwrap();
        assert_eq!(matrix.width(), 17 + 4 * 5);
    }

    #[test]
    fn content_too_large_for_fixed_version() {
        let content = "x".repeat(200);
        let err = QrSymbolEncoder.encode(&content, &options(1)).unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded(_)));
    }

    #[test]
    fn content_too_large_for_any_version() {
        let content = "\u{00e9}".repeat(3000);
        let opts = EncodeOptions {
            ecc_level: EccLevel::H,
            ..EncodeOptions::default()
        };
        let err = QrSymbolEncoder.encode(&content, &opts).unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded(_)));
    }

    #[test]
    fn utf8_with_eci_encodes_non_latin_text() {
        let opts = EncodeOptions {
            eci_mode: EciMode::Utf8,
            utf8_bom: true,
            ..EncodeOptions::default()
        };
        let matrix = QrSymbolEncoder.encode("\u{4f60}\u{597d}", &opts).unwrap();
        assert!(matrix.width() >= 21);
    }

    #[test]
    fn iso_mode_rejects_wide_characters() {
        let opts = EncodeOptions {
            eci_mode: EciMode::Iso8859_1,
            ..EncodeOptions::default()
        };
        let err = QrSymbolEncoder.encode("\u{4f60}", &opts).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn latin1_conversion() {
        assert_eq!(to_latin1("M\u{fc}ller"), Some(vec![b'M', 0xFC, b'l', b'l', b'e', b'r']));
        assert_eq!(to_latin1("\u{20ac}"), None);
    }

    #[test]
    fn matrix_rejects_wrong_module_count() {
        assert!(SymbolMatrix::new(2, vec![Color::Dark; 3]).is_err());
        let matrix = SymbolMatrix::from_rows(&[&[true, false], &[false, true]]).unwrap();
        assert!(matrix.is_dark(0, 0));
        assert!(!matrix.is_dark(1, 0));
        assert!(matrix.is_dark(1, 1));
        assert!(!matrix.is_dark(5, 5));
    }
}
