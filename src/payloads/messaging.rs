use serde::Deserialize;

use crate::errors::AppError;
use crate::payloads::escape::{escape_colons, escape_input, uri_escape};
use crate::payloads::{present, require};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SmsEncoding {
    #[default]
    #[serde(alias = "SMSTO")]
    Smsto,
    #[serde(alias = "SMS")]
    Sms,
    #[serde(alias = "SMS_iOS")]
    SmsIos,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsPayload {
    #[serde(default)]
    pub phone_number: String,
    pub message: Option<String>,
    #[serde(default)]
    pub encoding: SmsEncoding,
}

impl SmsPayload {
    pub fn to_payload(&self) -> Result<String, AppError> {
        let number = require(&self.phone_number, "phoneNumber")?;
        let message = self.message.as_deref().unwrap_or_default();
        Ok(match self.encoding {
            SmsEncoding::Smsto => format!("SMSTO:{}:{}", number, message),
            SmsEncoding::Sms if message.is_empty() => format!("sms:{}", number),
            SmsEncoding::Sms => format!("sms:{}?body={}", number, uri_escape(message)),
            SmsEncoding::SmsIos => format!("sms:{};{}", number, message),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppPayload {
    #[serde(default)]
    pub phone_number: String,
    pub message: Option<String>,
}

impl WhatsAppPayload {
    /// `https://wa.me/<digits>?text=<message>`
    pub fn to_payload(&self) -> Result<String, AppError> {
        let raw = require(&self.phone_number, "phoneNumber")?;
        let number: String = raw
            .trim_start_matches(['0', '+'])
            .chars()
            .filter(|c| !matches!(c, ' ' | '(' | ')' | '-'))
            .collect();
        if number.is_empty() {
            return Err(AppError::validation("phoneNumber has no digits"));
        }
        match self.message.as_deref().filter(|m| !m.is_empty()) {
            Some(message) => Ok(format!("https://wa.me/{}?text={}", number, uri_escape(message))),
            None => Ok(format!("https://wa.me/{}", number)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum MailEncoding {
    #[default]
    #[serde(alias = "MAILTO")]
    Mailto,
    #[serde(alias = "MATMSG")]
    Matmsg,
    #[serde(alias = "SMTP")]
    Smtp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailPayload {
    #[serde(default, alias = "email")]
    pub address: String,
    pub subject: Option<String>,
    #[serde(alias = "message")]
    pub body: Option<String>,
    #[serde(default)]
    pub encoding: MailEncoding,
}

impl MailPayload {
    pub fn to_payload(&self) -> Result<String, AppError> {
        let address = require(&self.address, "address")?;
        let subject = present(&self.subject);
        let body = present(&self.body);

        Ok(match self.encoding {
            MailEncoding::Mailto => {
                let query: Vec<String> = [("subject", subject), ("body", body)]
                    .into_iter()
                    .filter_map(|(key, value)| value.map(|v| format!("{}={}", key, uri_escape(v))))
                    .collect();
                if query.is_empty() {
                    format!("mailto:{}", address)
                } else {
                    format!("mailto:{}?{}", address, query.join("&"))
                }
            }
            MailEncoding::Matmsg => {
                let mut payload = format!("MATMSG:TO:{};", address);
                if let Some(subject) = subject {
                    payload.push_str(&format!("SUB:{};", escape_input(subject)));
                }
                if let Some(body) = body {
                    payload.push_str(&format!("BODY:{};", escape_input(body)));
                }
                payload.push(';');
                payload
            }
            MailEncoding::Smtp => format!(
                "SMTP:{}:{}:{}",
                address,
                escape_colons(subject.unwrap_or_default()),
                escape_colons(body.unwrap_or_default())
            ),
        })
    }
}
