use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::errors::AppError;
use crate::payloads::escape::escape_text;
use crate::payloads::{present, require};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum EventEncoding {
    #[default]
    Universal,
    #[serde(alias = "iCalComplete", alias = "iCalendar")]
    ICalendar,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventPayload {
    #[serde(default)]
    pub subject: String,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default, alias = "allDayEvent")]
    pub all_day: bool,
    #[serde(default)]
    pub encoding: EventEncoding,
}

/// A parsed start or end. `utc` is set when the input carried an offset.
#[derive(Debug, Clone, Copy)]
struct Moment {
    at: NaiveDateTime,
    utc: bool,
}

impl Moment {
    fn parse(value: &str, field: &str) -> Result<Self, AppError> {
        let value = require(value, field)?;
        if let Ok(at) = DateTime::parse_from_rfc3339(value) {
            return Ok(Moment {
                at: at.with_timezone(&Utc).naive_utc(),
                utc: true,
            });
        }
        let local = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            });
        local.map(|at| Moment { at, utc: false }).ok_or_else(|| {
            AppError::validation(format!(
                "{} must be an ISO 8601 date or date-time, got {:?}",
                field, value
            ))
        })
    }

    fn render(self, all_day: bool) -> String {
        if all_day {
            self.at.format("%Y%m%d").to_string()
        } else if self.utc {
            self.at.format("%Y%m%dT%H%M%SZ").to_string()
        } else {
            self.at.format("%Y%m%dT%H%M%S").to_string()
        }
    }
}

impl CalendarEventPayload {
    pub fn to_payload(&self) -> Result<String, AppError> {
        let subject = require(&self.subject, "subject")?;
        let start = Moment::parse(&self.start, "start")?;
        let end = Moment::parse(&self.end, "end")?;
        let out_of_order = if self.all_day {
            end.at.date() < start.at.date()
        } else {
            end.at < start.at
        };
        if out_of_order {
            return Err(AppError::validation("end must not be before start"));
        }

        let date_param = if self.all_day { ";VALUE=DATE" } else { "" };
        let mut lines = vec!["BEGIN:VEVENT".to_string(), format!("SUMMARY:{}", escape_text(subject))];
        if let Some(description) = present(&self.description) {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }
        if let Some(location) = present(&self.location) {
            lines.push(format!("LOCATION:{}", escape_text(location)));
        }
        lines.push(format!("DTSTART{}:{}", date_param, start.render(self.all_day)));
        lines.push(format!("DTEND{}:{}", date_param, end.render(self.all_day)));
        lines.push("END:VEVENT".to_string());

        let event = lines.join("\r\n");
        Ok(match self.encoding {
            EventEncoding::Universal => event,
            EventEncoding::ICalendar => {
                format!("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n{}\r\nEND:VCALENDAR", event)
            }
        })
    }
}
