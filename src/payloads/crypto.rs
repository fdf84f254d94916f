use serde::Deserialize;

use crate::errors::AppError;
use crate::payloads::escape::uri_escape;
use crate::payloads::{present, require};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum CryptoCurrency {
    #[default]
    Bitcoin,
    BitcoinCash,
    Litecoin,
}

impl CryptoCurrency {
    pub fn scheme(self) -> &'static str {
        match self {
            CryptoCurrency::Bitcoin => "bitcoin",
            CryptoCurrency::BitcoinCash => "bitcoincash",
            CryptoCurrency::Litecoin => "litecoin",
        }
    }
}

/// BIP-21 style payment request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoPaymentPayload {
    #[serde(default)]
    pub currency: CryptoCurrency,
    #[serde(default)]
    pub address: String,
    pub amount: Option<f64>,
    pub label: Option<String>,
    pub message: Option<String>,
}

impl CryptoPaymentPayload {
    pub fn to_payload(&self) -> Result<String, AppError> {
        let address = require(&self.address, "address")?;
        let amount = self.amount.map(format_amount).transpose()?;

        let query: Vec<String> = [
            ("amount", amount),
            ("label", present(&self.label).map(uri_escape)),
            ("message", present(&self.message).map(uri_escape)),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| format!("{}={}", key, v)))
        .collect();

        let mut payload = format!("{}:{}", self.currency.scheme(), address);
        if !query.is_empty() {
            payload.push('?');
            payload.push_str(&query.join("&"));
        }
        Ok(payload)
    }
}

fn format_amount(amount: f64) -> Result<String, AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::validation("amount must be a positive number"));
    }
    let fixed = format!("{:.8}", amount);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "0" {
        return Err(AppError::validation("amount must be at least 0.00000001"));
    }
    Ok(trimmed.to_string())
}
