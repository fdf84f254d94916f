//! EPC069-12 "Girocode" SEPA credit transfer block.
//!
//! Banking apps read the block by line position, so every line is emitted
//! even when empty; only the BIC line is version dependent.

use serde::Deserialize;

use crate::errors::AppError;
use crate::payloads::{present, require};
use crate::qr::encoder::{EncodeOptions, to_latin1};

const MIN_AMOUNT: f64 = 0.01;
const MAX_AMOUNT: f64 = 999_999_999.99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TypeOfRemittance {
    Structured,
    #[default]
    Unstructured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum GirocodeVersion {
    #[default]
    #[serde(alias = "V1")]
    Version1,
    #[serde(alias = "V2")]
    Version2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum GirocodeCharset {
    #[default]
    #[serde(rename = "ISO_8859_1", alias = "ISO8859_1")]
    Iso8859_1,
    #[serde(rename = "UTF_8", alias = "UTF8")]
    Utf8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GirocodePayload {
    #[serde(default)]
    pub iban: String,
    pub bic: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(alias = "remittanceInfo")]
    pub remittance_information: Option<String>,
    #[serde(default, alias = "remittanceType")]
    pub type_of_remittance: TypeOfRemittance,
    #[serde(alias = "purpose")]
    pub purpose_of_credit_transfer: Option<String>,
    #[serde(alias = "userMessage")]
    pub message_to_girocode_user: Option<String>,
    #[serde(default)]
    pub version: GirocodeVersion,
    #[serde(default)]
    pub encoding: GirocodeCharset,
}

impl GirocodePayload {
    pub fn to_payload(&self) -> Result<String, AppError> {
        let iban = normalize_iban(&self.iban)?;
        let bic = present(&self.bic).map(validate_bic).transpose()?;
        let name = require(&self.name, "name")?;
        max_chars(name, "name", 70)?;
        validate_amount(self.amount)?;

        let purpose = present(&self.purpose_of_credit_transfer).unwrap_or_default();
        max_chars(purpose, "purposeOfCreditTransfer", 4)?;
        let remittance = present(&self.remittance_information).unwrap_or_default();
        let (structured, unstructured) = match self.type_of_remittance {
            TypeOfRemittance::Structured => {
                max_chars(remittance, "remittanceInformation", 35)?;
                (remittance, "")
            }
            TypeOfRemittance::Unstructured => {
                max_chars(remittance, "remittanceInformation", 140)?;
                ("", remittance)
            }
        };
        let message = present(&self.message_to_girocode_user).unwrap_or_default();
        max_chars(message, "messageToGirocodeUser", 70)?;

        let (version, charset) = (
            match self.version {
                GirocodeVersion::Version1 => "001",
                GirocodeVersion::Version2 => "002",
            },
            match self.encoding {
                GirocodeCharset::Iso8859_1 => "1",
                GirocodeCharset::Utf8 => "2",
            },
        );
        let amount = format!("EUR{:.2}", self.amount);

        let mut lines = vec!["BCD", version, charset, "SCT"];
        if self.version == GirocodeVersion::Version2 {
            lines.push(bic.as_deref().unwrap_or_default());
        }
        lines.extend([
            name,
            iban.as_str(),
            amount.as_str(),
            purpose,
            structured,
            unstructured,
            message,
        ]);
        let payload = lines.join("\n");

        if self.encoding == GirocodeCharset::Iso8859_1 && to_latin1(&payload).is_none() {
            return Err(AppError::validation(
                "payload contains characters outside ISO-8859-1; use UTF_8 encoding",
            ));
        }
        Ok(payload)
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            force_utf8: self.encoding == GirocodeCharset::Utf8,
            ..EncodeOptions::default()
        }
    }
}

/// Each field occupies exactly one line of the block.
fn max_chars(value: &str, field: &str, limit: usize) -> Result<(), AppError> {
    if value.contains(['\n', '\r']) {
        return Err(AppError::validation(format!(
            "{} must not contain line breaks",
            field
        )));
    }
    if value.chars().count() > limit {
        return Err(AppError::validation(format!(
            "{} must be at most {} characters",
            field, limit
        )));
    }
    Ok(())
}

/// Strips spaces, upper-cases and runs the ISO 13616 mod-97 check.
fn normalize_iban(raw: &str) -> Result<String, AppError> {
    let iban: String = require(raw, "iban")?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    let bytes = iban.as_bytes();
    let well_formed = (15..=34).contains(&bytes.len())
        && bytes.iter().all(u8::is_ascii_alphanumeric)
        && bytes[..2].iter().all(u8::is_ascii_uppercase)
        && bytes[2..4].iter().all(u8::is_ascii_digit);
    if !well_formed {
        return Err(AppError::validation("iban is malformed"));
    }

    let remainder = bytes[4..]
        .iter()
        .chain(&bytes[..4])
        .fold(0u32, |acc, &b| {
            if b.is_ascii_digit() {
                (acc * 10 + u32::from(b - b'0')) % 97
            } else {
                (acc * 100 + u32::from(b - b'A' + 10)) % 97
            }
        });
    if remainder != 1 {
        return Err(AppError::validation("iban checksum is invalid"));
    }
    Ok(iban)
}

fn validate_bic(raw: &str) -> Result<String, AppError> {
    let bic = raw.to_ascii_uppercase();
    if !matches!(bic.len(), 8 | 11) || !bic.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(AppError::validation("bic must be 8 or 11 alphanumeric characters"));
    }
    Ok(bic)
}

fn validate_amount(amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() || !(MIN_AMOUNT..=MAX_AMOUNT).contains(&amount) {
        return Err(AppError::validation(format!(
            "amount must be between {} and {}",
            MIN_AMOUNT, MAX_AMOUNT
        )));
    }
    let cents = amount * 100.0;
    if (cents - cents.round()).abs() > 1e-6 {
        return Err(AppError::validation("amount must have at most two decimals"));
    }
    Ok(())
}
