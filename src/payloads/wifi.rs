use serde::Deserialize;

use crate::errors::AppError;
use crate::payloads::escape::{escape_input, is_hex_style};
use crate::payloads::require;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WiFiAuth {
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(alias = "nopass", alias = "None", alias = "")]
    Open,
}

impl WiFiAuth {
    fn token(self) -> &'static str {
        match self {
            WiFiAuth::Wpa => "WPA",
            WiFiAuth::Wep => "WEP",
            WiFiAuth::Open => "nopass",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WiFiPayload {
    #[serde(default)]
    pub ssid: String,
    #[serde(default)]
    pub password: String,
    pub auth: Option<WiFiAuth>,
    #[serde(default)]
    pub hidden: bool,
}

impl WiFiPayload {
    /// `WIFI:T:<auth>;S:<ssid>;P:<password>;<H:true>;`
    pub fn to_payload(&self) -> Result<String, AppError> {
        let ssid = require(&self.ssid, "ssid")?;
        let auth = self.auth.unwrap_or(WiFiAuth::Open);
        let password = match auth {
            WiFiAuth::Open => String::new(),
            WiFiAuth::Wpa | WiFiAuth::Wep => {
                if self.password.is_empty() {
                    return Err(AppError::validation(format!(
                        "password is required for {} networks",
                        auth.token()
                    )));
                }
                quote_hex(escape_input(&self.password))
            }
        };
        let hidden = if self.hidden { "H:true" } else { "" };
        Ok(format!(
            "WIFI:T:{};S:{};P:{};{};",
            auth.token(),
            quote_hex(escape_input(ssid)),
            password,
            hidden
        ))
    }
}

// Scanners read an unquoted all-hex value as a raw key.
fn quote_hex(value: String) -> String {
    if is_hex_style(&value) {
        format!("\"{}\"", value)
    } else {
        value
    }
}
