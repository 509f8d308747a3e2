use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::expander::TimeSlot;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AvailableDates {
    pub tutor_id: String,
    #[schema(value_type = Vec<String>, example = json!(["2025-03-10", "2025-03-17"]))]
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct SlotView {
    #[schema(value_type = String, format = "date-time", example = "2025-03-10T09:00:00+01:00")]
    pub start: DateTime<FixedOffset>,
    #[schema(value_type = String, format = "date-time", example = "2025-03-10T10:00:00+01:00")]
    pub end: DateTime<FixedOffset>,
    pub label: String,
}

impl From<&TimeSlot> for SlotView {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            start: slot.start,
            end: slot.end,
            label: slot.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct SlotList {
    pub tutor_id: String,
    #[schema(value_type = Option<String>, example = "2025-03-10")]
    pub date: Option<NaiveDate>,
    pub duration_min: u32,
    pub slots: Vec<SlotView>,
}

/// Booking as submitted by the client: the chosen slot start plus session metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BookingDraft {
    #[schema(value_type = String, format = "date-time", example = "2025-03-10T09:00:00+01:00")]
    pub start: DateTime<FixedOffset>,
    pub duration_min: u32,
    pub subject: String,
    #[serde(default = "default_session_type")]
    pub session_type: String,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_session_type() -> String {
    "ONLINE".to_string()
}

/// Booking payload forwarded to the backend, with UTC-anchored instants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub tutor_id: String,
    #[schema(value_type = String, format = "date-time", example = "2025-03-10T08:00:00Z")]
    pub start_time: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time", example = "2025-03-10T09:00:00Z")]
    pub end_time: DateTime<Utc>,
    pub subject: String,
    pub duration_minutes: u32,
    pub session_type: String,
    pub notes: Option<String>,
}

impl BookingRequest {
    pub fn from_slot(tutor_id: &str, slot: &TimeSlot, draft: BookingDraft) -> Self {
        Self {
            tutor_id: tutor_id.to_string(),
            start_time: slot.start.with_timezone(&Utc),
            end_time: slot.end.with_timezone(&Utc),
            subject: draft.subject,
            duration_minutes: draft.duration_min,
            session_type: draft.session_type,
            notes: draft.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_request_is_utc_anchored() {
        let start = DateTime::parse_from_rfc3339("2025-03-10T09:00:00+01:00").unwrap();
        let end = DateTime::parse_from_rfc3339("2025-03-10T10:30:00+01:00").unwrap();
        let slot = TimeSlot { start, end };
        let draft = BookingDraft {
            start,
            duration_min: 90,
            subject: "Algebra".into(),
            session_type: "IN_PERSON".into(),
            notes: None,
        };

        let request = BookingRequest::from_slot("tutor-1", &slot, draft);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["startTime"], "2025-03-10T08:00:00Z");
        assert_eq!(json["endTime"], "2025-03-10T09:30:00Z");
        assert_eq!(json["durationMinutes"], 90);
        assert_eq!(json["tutorId"], "tutor-1");
    }

    #[test]
    fn test_booking_draft_defaults() {
        let draft: BookingDraft = serde_json::from_str(
            r#"{"start": "2025-03-10T09:00:00+01:00", "duration_min": 60, "subject": "Physics"}"#,
        )
        .unwrap();
        assert_eq!(draft.session_type, "ONLINE");
        assert!(draft.notes.is_none());
    }

    #[test]
    fn test_slot_view_label() {
        let start = DateTime::parse_from_rfc3339("2025-03-10T14:30:00+01:00").unwrap();
        let slot = TimeSlot {
            start,
            end: start + chrono::Duration::minutes(60),
        };
        assert_eq!(SlotView::from(&slot).label, "14:30");
    }
}
