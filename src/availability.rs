use chrono::{NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

static HH_MM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("regex compiles"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidAvailability {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("unknown day of week `{0}`")]
    UnknownDay(String),
    #[error("malformed time `{0}`, expected HH:MM")]
    MalformedTime(String),
    #[error("window start {start} is not before end {end}")]
    EmptyWindow { start: NaiveTime, end: NaiveTime },
}

/// Recurring weekly availability as authored by the tutor and returned by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct WeeklyAvailability {
    #[serde(alias = "dayOfWeek", default)]
    pub day_of_week: Option<String>,
    #[serde(alias = "startTime", default)]
    pub start_time: Option<String>,
    #[serde(alias = "endTime", default)]
    pub end_time: Option<String>,
}

/// A validated window: a weekday plus a non-empty time-of-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityWindow {
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl WeeklyAvailability {
    pub fn new(day: &str, start: &str, end: &str) -> Self {
        Self {
            day_of_week: Some(day.to_string()),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
        }
    }

    pub fn validate(&self) -> Result<AvailabilityWindow, InvalidAvailability> {
        let day = self
            .day_of_week
            .as_deref()
            .ok_or(InvalidAvailability::MissingField("day_of_week"))?;
        let start = self
            .start_time
            .as_deref()
            .ok_or(InvalidAvailability::MissingField("start_time"))?;
        let end = self
            .end_time
            .as_deref()
            .ok_or(InvalidAvailability::MissingField("end_time"))?;

        let weekday = parse_weekday(day)?;
        let start = parse_hh_mm(start)?;
        let end = parse_hh_mm(end)?;
        if start >= end {
            return Err(InvalidAvailability::EmptyWindow { start, end });
        }

        Ok(AvailabilityWindow {
            weekday,
            start,
            end,
        })
    }
}

/// Keeps the windows that validate and logs the ones that don't.
pub fn validate_all(records: &[WeeklyAvailability]) -> Vec<AvailabilityWindow> {
    records
        .iter()
        .filter_map(|record| match record.validate() {
            Ok(window) => Some(window),
            Err(err) => {
                debug!(error = %err, ?record, "skipping availability record");
                None
            }
        })
        .collect()
}

pub fn parse_weekday(value: &str) -> Result<Weekday, InvalidAvailability> {
    match value.trim().to_uppercase().as_str() {
        "MONDAY" => Ok(Weekday::Mon),
        "TUESDAY" => Ok(Weekday::Tue),
        "WEDNESDAY" => Ok(Weekday::Wed),
        "THURSDAY" => Ok(Weekday::Thu),
        "FRIDAY" => Ok(Weekday::Fri),
        "SATURDAY" => Ok(Weekday::Sat),
        "SUNDAY" => Ok(Weekday::Sun),
        _ => Err(InvalidAvailability::UnknownDay(value.to_string())),
    }
}

pub fn parse_hh_mm(value: &str) -> Result<NaiveTime, InvalidAvailability> {
    if !HH_MM.is_match(value) {
        return Err(InvalidAvailability::MalformedTime(value.to_string()));
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| InvalidAvailability::MalformedTime(value.to_string()))
}
