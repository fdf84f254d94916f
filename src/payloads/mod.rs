//! Canonical text payloads for every supported content type.
//!
//! Each content type maps to the external grammar that scanner and banking
//! apps parse, so output has to be byte-exact: field order, escaping and
//! which empty fields are dropped all matter.

pub mod calendar;
pub mod contact;
pub mod crypto;
pub mod escape;
pub mod geo;
pub mod girocode;
pub mod messaging;
pub mod text;
pub mod wifi;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::errors::AppError;
use crate::qr::encoder::EncodeOptions;

pub use calendar::CalendarEventPayload;
pub use contact::VCardPayload;
pub use crypto::CryptoPaymentPayload;
pub use geo::GeolocationPayload;
pub use girocode::GirocodePayload;
pub use messaging::{MailPayload, SmsPayload, WhatsAppPayload};
pub use text::{BookmarkPayload, PlainTextPayload, UrlPayload};
pub use wifi::WiFiPayload;

/// Content-type tag used in routes and stored as the record `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    PlainText,
    Url,
    Bookmark,
    Sms,
    WhatsApp,
    Mail,
    WiFi,
    VCard,
    CalendarEvent,
    Geolocation,
    CryptoPayment,
    Girocode,
}

impl ContentKind {
    pub const ALL: [ContentKind; 12] = [
        ContentKind::PlainText,
        ContentKind::Url,
        ContentKind::Bookmark,
        ContentKind::Sms,
        ContentKind::WhatsApp,
        ContentKind::Mail,
        ContentKind::WiFi,
        ContentKind::VCard,
        ContentKind::CalendarEvent,
        ContentKind::Geolocation,
        ContentKind::CryptoPayment,
        ContentKind::Girocode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::PlainText => "text",
            ContentKind::Url => "url",
            ContentKind::Bookmark => "bookmark",
            ContentKind::Sms => "sms",
            ContentKind::WhatsApp => "whatsapp",
            ContentKind::Mail => "email",
            ContentKind::WiFi => "wifi",
            ContentKind::VCard => "vcard",
            ContentKind::CalendarEvent => "calendar-event",
            ContentKind::Geolocation => "geolocation",
            ContentKind::CryptoPayment => "crypto-payment",
            ContentKind::Girocode => "girocode",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let tag = value.to_ascii_lowercase();
        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .or(match tag.as_str() {
                "mail" => Some(ContentKind::Mail),
                "plaintext" => Some(ContentKind::PlainText),
                _ => None,
            })
            .ok_or_else(|| AppError::UnsupportedVariant(value.to_string()))
    }
}

/// A typed content description; exactly one variant per request.
#[derive(Debug, Clone)]
pub enum ContentRequest {
    PlainText(PlainTextPayload),
    Url(UrlPayload),
    Bookmark(BookmarkPayload),
    Sms(SmsPayload),
    WhatsApp(WhatsAppPayload),
    Mail(MailPayload),
    WiFi(WiFiPayload),
    VCard(VCardPayload),
    CalendarEvent(CalendarEventPayload),
    Geolocation(GeolocationPayload),
    CryptoPayment(CryptoPaymentPayload),
    Girocode(GirocodePayload),
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(AppError::from_json)
}

impl ContentRequest {
    /// Reads the JSON body belonging to `kind`.
    pub fn from_json(kind: ContentKind, body: &[u8]) -> Result<Self, AppError> {
        Ok(match kind {
            ContentKind::PlainText => ContentRequest::PlainText(parse(body)?),
            ContentKind::Url => ContentRequest::Url(parse(body)?),
            ContentKind::Bookmark => ContentRequest::Bookmark(parse(body)?),
            ContentKind::Sms => ContentRequest::Sms(parse(body)?),
            ContentKind::WhatsApp => ContentRequest::WhatsApp(parse(body)?),
            ContentKind::Mail => ContentRequest::Mail(parse(body)?),
            ContentKind::WiFi => ContentRequest::WiFi(parse(body)?),
            ContentKind::VCard => ContentRequest::VCard(parse(body)?),
            ContentKind::CalendarEvent => ContentRequest::CalendarEvent(parse(body)?),
            ContentKind::Geolocation => ContentRequest::Geolocation(parse(body)?),
            ContentKind::CryptoPayment => ContentRequest::CryptoPayment(parse(body)?),
            ContentKind::Girocode => ContentRequest::Girocode(parse(body)?),
        })
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentRequest::PlainText(_) => ContentKind::PlainText,
            ContentRequest::Url(_) => ContentKind::Url,
            ContentRequest::Bookmark(_) => ContentKind::Bookmark,
            ContentRequest::Sms(_) => ContentKind::Sms,
            ContentRequest::WhatsApp(_) => ContentKind::WhatsApp,
            ContentRequest::Mail(_) => ContentKind::Mail,
            ContentRequest::WiFi(_) => ContentKind::WiFi,
            ContentRequest::VCard(_) => ContentKind::VCard,
            ContentRequest::CalendarEvent(_) => ContentKind::CalendarEvent,
            ContentRequest::Geolocation(_) => ContentKind::Geolocation,
            ContentRequest::CryptoPayment(_) => ContentKind::CryptoPayment,
            ContentRequest::Girocode(_) => ContentKind::Girocode,
        }
    }

    /// The canonical text payload.
    pub fn to_payload(&self) -> Result<String, AppError> {
        match self {
            ContentRequest::PlainText(p) => p.to_payload(),
            ContentRequest::Url(p) => p.to_payload(),
            ContentRequest::Bookmark(p) => p.to_payload(),
            ContentRequest::Sms(p) => p.to_payload(),
            ContentRequest::WhatsApp(p) => p.to_payload(),
            ContentRequest::Mail(p) => p.to_payload(),
            ContentRequest::WiFi(p) => p.to_payload(),
            ContentRequest::VCard(p) => p.to_payload(),
            ContentRequest::CalendarEvent(p) => p.to_payload(),
            ContentRequest::Geolocation(p) => p.to_payload(),
            ContentRequest::CryptoPayment(p) => p.to_payload(),
            ContentRequest::Girocode(p) => p.to_payload(),
        }
    }

    /// Encoder settings; only plain text and Girocode deviate from the defaults.
    pub fn encode_options(&self) -> Result<EncodeOptions, AppError> {
        match self {
            ContentRequest::PlainText(p) => p.encode_options(),
            ContentRequest::Girocode(p) => Ok(p.encode_options()),
            _ => Ok(EncodeOptions::default()),
        }
    }
}

/// Trimmed value of a mandatory field, or a validation error naming it.
pub(crate) fn require<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

/// `Some(trimmed)` for a populated optional field.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
