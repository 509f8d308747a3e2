use chrono::Utc;
use icalendar::{Calendar, Component, Event, EventLike};

use crate::expander::TimeSlot;

/// Renders bookable slots as free-time events for calendar clients.
#[derive(Clone, Default)]
pub struct ICalExporter;

impl ICalExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, tutor_id: &str, slots: &[TimeSlot]) -> Vec<u8> {
        if slots.is_empty() {
            return Vec::new();
        }

        let mut calendar = Calendar::new();
        calendar.name(&format!("Bookable slots for tutor {tutor_id}"));

        for slot in slots {
            let start = slot.start.with_timezone(&Utc);
            let end = slot.end.with_timezone(&Utc);

            let mut event = Event::new();
            event.summary(&format!("Available: {}", slot.label()));
            event.starts(start);
            event.ends(end);
            event.description(&format!(
                "Bookable session with tutor {tutor_id}\nDuration: {} min",
                slot.duration().num_minutes()
            ));
            event.uid(&format!(
                "{}-{}-{}-tutor-slots",
                start.format("%Y%m%dT%H%M%SZ"),
                end.format("%H%M%S"),
                tutor_id.replace(' ', "-")
            ));
            calendar.push(event);
        }

        calendar.to_string().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    #[test]
    fn test_generate_single_slot() {
        let exporter = ICalExporter::new();
        let slot = TimeSlot {
            start: DateTime::parse_from_rfc3339("2025-03-10T09:00:00+01:00").unwrap(),
            end: DateTime::parse_from_rfc3339("2025-03-10T10:00:00+01:00").unwrap(),
        };
        let bytes = exporter.generate("tutor-1", &[slot]);
        let body = String::from_utf8(bytes).unwrap();
        assert!(body.contains("BEGIN:VEVENT"));
        assert!(body.contains("Available: 09:00"));
        assert!(body.contains("20250310T080000Z"));
    }

    #[test]
    fn test_generate_empty() {
        let exporter = ICalExporter::new();
        assert!(exporter.generate("tutor-1", &[]).is_empty());
    }
}
