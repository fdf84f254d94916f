use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::payloads::escape::{escape_input, escape_text};
use crate::payloads::{present, require};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ContactOutput {
    #[default]
    #[serde(alias = "vCard3", alias = "VCARD3")]
    VCard3,
    #[serde(alias = "MECARD")]
    MeCard,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VCardPayload {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub work_phone: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
    pub website: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub state_region: Option<String>,
    pub country: Option<String>,
    pub note: Option<String>,
    pub org: Option<String>,
    pub org_title: Option<String>,
    #[serde(default, alias = "outputType")]
    pub output: ContactOutput,
}

struct Address<'a> {
    street: Option<String>,
    city: Option<&'a str>,
    state: Option<&'a str>,
    zip: Option<&'a str>,
    country: Option<&'a str>,
}

impl VCardPayload {
    pub fn to_payload(&self) -> Result<String, AppError> {
        let first = require(&self.first_name, "firstName")?;
        let last = require(&self.last_name, "lastName")?;
        let birthday = present(&self.birthday).map(parse_birthday).transpose()?;

        Ok(match self.output {
            ContactOutput::VCard3 => self.vcard3(first, last, birthday.as_deref()),
            ContactOutput::MeCard => self.mecard(first, last, birthday.as_deref()),
        })
    }

    fn address(&self) -> Option<Address<'_>> {
        let street = match (present(&self.street), present(&self.house_number)) {
            (Some(street), Some(number)) => Some(format!("{} {}", street, number)),
            (Some(street), None) => Some(street.to_string()),
            (None, Some(number)) => Some(number.to_string()),
            (None, None) => None,
        };
        let address = Address {
            street,
            city: present(&self.city),
            state: present(&self.state_region),
            zip: present(&self.zip_code),
            country: present(&self.country),
        };
        let empty = address.street.is_none()
            && address.city.is_none()
            && address.state.is_none()
            && address.zip.is_none()
            && address.country.is_none();
        (!empty).then_some(address)
    }

    fn vcard3(&self, first: &str, last: &str, birthday: Option<&str>) -> String {
        let mut lines = vec![
            "BEGIN:VCARD".to_string(),
            "VERSION:3.0".to_string(),
            format!("N:{};{};;;", escape_text(last), escape_text(first)),
            format!("FN:{} {}", escape_text(first), escape_text(last)),
        ];
        let mut push = |prefix: &str, value: Option<&str>| {
            if let Some(value) = value {
                lines.push(format!("{}{}", prefix, escape_text(value)));
            }
        };
        push("ORG:", present(&self.org));
        push("TITLE:", present(&self.org_title));
        push("TEL;TYPE=HOME,VOICE:", present(&self.phone));
        push("TEL;TYPE=HOME,CELL:", present(&self.mobile_phone));
        push("TEL;TYPE=WORK,VOICE:", present(&self.work_phone));

        if let Some(address) = self.address() {
            let part = |value: Option<&str>| value.map(escape_text).unwrap_or_default();
            lines.push(format!(
                "ADR;TYPE=HOME,PREF:;;{};{};{};{};{}",
                part(address.street.as_deref()),
                part(address.city),
                part(address.state),
                part(address.zip),
                part(address.country)
            ));
        }
        if let Some(birthday) = birthday {
            lines.push(format!("BDAY:{}", birthday));
        }

        let mut push = |prefix: &str, value: Option<&str>| {
            if let Some(value) = value {
                lines.push(format!("{}{}", prefix, escape_text(value)));
            }
        };
        push("URL:", present(&self.website));
        push("EMAIL:", present(&self.email));
        push("NOTE:", present(&self.note));
        push("NICKNAME:", present(&self.nickname));

        lines.push("END:VCARD".to_string());
        lines.join("\r\n")
    }

    fn mecard(&self, first: &str, last: &str, birthday: Option<&str>) -> String {
        let mut payload = format!("MECARD:N:{},{};", escape_input(last), escape_input(first));
        let mut push = |tag: &str, value: Option<&str>| {
            if let Some(value) = value {
                payload.push_str(&format!("{}:{};", tag, escape_input(value)));
            }
        };
        push("TEL", present(&self.phone));
        push("TEL", present(&self.mobile_phone));
        push("TEL", present(&self.work_phone));
        push("EMAIL", present(&self.email));
        push("NOTE", present(&self.note));
        push("BDAY", birthday);

        if let Some(address) = self.address() {
            let part = |value: Option<&str>| value.map(escape_input).unwrap_or_default();
            payload.push_str(&format!(
                "ADR:,,{},{},{},{},{};",
                part(address.street.as_deref()),
                part(address.city),
                part(address.state),
                part(address.zip),
                part(address.country)
            ));
        }

        let mut push = |tag: &str, value: Option<&str>| {
            if let Some(value) = value {
                payload.push_str(&format!("{}:{};", tag, escape_input(value)));
            }
        };
        push("URL", present(&self.website));
        push("NICKNAME", present(&self.nickname));
        payload.push(';');
        payload
    }
}

fn parse_birthday(value: &str) -> Result<String, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.format("%Y%m%d").to_string())
        .map_err(|_| AppError::validation("birthday must be formatted as YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> VCardPayload {
        VCardPayload {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_vcard() {
        assert_eq!(
            jane().to_payload().unwrap(),
            "BEGIN:VCARD\r\nVERSION:3.0\r\nN:Doe;Jane;;;\r\nFN:Jane Doe\r\nEND:VCARD"
        );
    }

    #[test]
    fn vcard_lines_follow_populated_fields() {
        let mut card = jane();
        card.phone = Some("+1 555 0100".to_string());
        card.email = Some("jane@example.com".to_string());
        card.birthday = Some("1990-04-01".to_string());
        card.city = Some("Berlin".to_string());
        card.org = Some("Acme, Inc.".to_string());
        card.work_phone = Some("  ".to_string());

        let payload = card.to_payload().unwrap();
        let lines: Vec<&str> = payload.split("\r\n").collect();
        assert_eq!(
            lines,
            vec![
                "BEGIN:VCARD",
                "VERSION:3.0",
                "N:Doe;Jane;;;",
                "FN:Jane Doe",
                r"ORG:Acme\, Inc.",
                "TEL;TYPE=HOME,VOICE:+1 555 0100",
                "ADR;TYPE=HOME,PREF:;;;Berlin;;;",
                "BDAY:19900401",
                "EMAIL:jane@example.com",
                "END:VCARD",
            ]
        );
    }

    #[test]
    fn street_and_house_number_share_a_component() {
        let mut card = jane();
        card.street = Some("Main St".to_string());
        card.house_number = Some("12".to_string());
        card.zip_code = Some("10115".to_string());
        card.country = Some("Germany".to_string());
        assert!(
            card.to_payload()
                .unwrap()
                .contains("\r\nADR;TYPE=HOME,PREF:;;Main St 12;;;10115;Germany\r\n")
        );
    }

    #[test]
    fn mecard_output() {
        let mut card = jane();
        card.output = ContactOutput::MeCard;
        card.phone = Some("123".to_string());
        card.note = Some("a;b".to_string());
        card.nickname = Some("JD".to_string());
        assert_eq!(
            card.to_payload().unwrap(),
            r"MECARD:N:Doe,Jane;TEL:123;NOTE:a\;b;NICKNAME:JD;;"
        );
    }

    #[test]
    fn names_are_required() {
        let mut card = jane();
        card.last_name = String::new();
        assert!(matches!(card.to_payload(), Err(AppError::Validation(_))));
    }

    #[test]
    fn birthday_must_be_a_date() {
        let mut card = jane();
        card.birthday = Some("01.04.1990".to_string());
        assert!(matches!(card.to_payload(), Err(AppError::Validation(_))));
    }

    #[test]
    fn reads_camel_case_body() {
        let card: VCardPayload = serde_json::from_str(
            r#"{"firstName":"Jane","lastName":"Doe","mobilePhone":"555","output":"MeCard"}"#,
        )
        .unwrap();
        assert_eq!(card.to_payload().unwrap(), "MECARD:N:Doe,Jane;TEL:555;;");
    }
}
