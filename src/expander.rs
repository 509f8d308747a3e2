use std::collections::{BTreeMap, BTreeSet};

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, TimeZone,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::availability::{WeeklyAvailability, validate_all};
use crate::clock::Clock;

pub const DEFAULT_HORIZON_DAYS: u32 = 31;
/// Step between candidate start times, independent of session duration.
pub const SLOT_STRIDE_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeSlot {
    #[schema(value_type = String, format = "date-time", example = "2025-03-10T09:00:00+01:00")]
    pub start: DateTime<FixedOffset>,
    #[schema(value_type = String, format = "date-time", example = "2025-03-10T10:00:00+01:00")]
    pub end: DateTime<FixedOffset>,
}

impl TimeSlot {
    /// Short start-time label shown next to the slot in booking forms.
    pub fn label(&self) -> String {
        self.start.format("%H:%M").to_string()
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Expands recurring weekly availability into concrete bookable dates and slots.
///
/// Every computation reads the clock once, so a fixed clock gives fully
/// deterministic output. Invalid availability records contribute nothing.
#[derive(Debug, Clone)]
pub struct AvailabilityExpander<C> {
    clock: C,
}

impl<C: Clock> AvailabilityExpander<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Dates from today through `today + horizon_days` whose weekday has at
    /// least one valid window, capped at one calendar month from today.
    pub fn compute_available_dates(
        &self,
        availability: &[WeeklyAvailability],
        horizon_days: u32,
    ) -> Vec<NaiveDate> {
        let today = self.clock.today();
        let Some(max_date) = max_bookable_date(today) else {
            return Vec::new();
        };

        let windows = validate_all(availability);
        let mut dates = BTreeSet::new();
        for window in &windows {
            for offset in 0..=u64::from(horizon_days) {
                let Some(date) = today.checked_add_days(Days::new(offset)) else {
                    break;
                };
                if date > max_date {
                    break;
                }
                if date.weekday() == window.weekday {
                    dates.insert(date);
                }
            }
        }

        debug!(
            %today,
            windows = windows.len(),
            dates = dates.len(),
            "computed available dates"
        );
        dates.into_iter().collect()
    }

    /// Slots of `duration_minutes` on `date`, stepped every
    /// [`SLOT_STRIDE_MINUTES`] from each matching window's start and kept only
    /// when they end by the window's end. Dates outside today through one
    /// month ahead have no slots, and on today's date only slots starting
    /// strictly after now survive. Output is ascending with unique starts.
    pub fn compute_time_slots(
        &self,
        availability: &[WeeklyAvailability],
        date: NaiveDate,
        duration_minutes: u32,
    ) -> Vec<TimeSlot> {
        if duration_minutes == 0 {
            return Vec::new();
        }

        let now = self.clock.now();
        let tz = now.timezone();
        let today = now.date_naive();
        if date < today || max_bookable_date(today).is_none_or(|max| date > max) {
            debug!(%date, %today, "date outside bookable range");
            return Vec::new();
        }

        let is_today = date == today;
        let duration = Duration::minutes(i64::from(duration_minutes));
        let stride = Duration::minutes(SLOT_STRIDE_MINUTES);

        let mut slots: BTreeMap<DateTime<Tz>, TimeSlot> = BTreeMap::new();
        let windows = validate_all(availability)
            .into_iter()
            .filter(|window| window.weekday == date.weekday());

        for window in windows {
            let local_end = date.and_time(window.end);
            let Some(window_end) = tz.from_local_datetime(&local_end).latest() else {
                debug!(%local_end, %tz, "window ends at a nonexistent local time, skipping");
                continue;
            };

            let mut candidate = date.and_time(window.start);
            while candidate < local_end {
                match resolve_local(&tz, candidate) {
                    Some(start) if start + duration > window_end => {}
                    Some(start) if is_today && start <= now => {}
                    Some(start) => {
                        slots.entry(start).or_insert_with(|| TimeSlot {
                            start: start.fixed_offset(),
                            end: (start + duration).fixed_offset(),
                        });
                    }
                    None => debug!(%candidate, %tz, "skipping nonexistent local time"),
                }
                candidate += stride;
            }
        }

        slots.into_values().collect()
    }
}

/// Last date a session can be booked on: one calendar month after `today`.
pub fn max_bookable_date(today: NaiveDate) -> Option<NaiveDate> {
    today.checked_add_months(Months::new(1))
}

fn resolve_local(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&local).earliest()
}
