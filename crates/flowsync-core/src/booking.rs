//! Booking catalog and slot availability

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CalendarConfig;
use crate::models::{DayWindow, Event};

/// A bookable service
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Service {
    pub id: &'static str,
    pub name: &'static str,
    pub duration_minutes: u32,
    /// Price in whole currency units (0 = free)
    pub price: u32,
}

/// Built-in service catalog
pub const SERVICES: &[Service] = &[
    Service {
        id: "consultation",
        name: "Initial Consultation",
        duration_minutes: 30,
        price: 0,
    },
    Service {
        id: "strategy",
        name: "Strategy Session",
        duration_minutes: 60,
        price: 150,
    },
    Service {
        id: "review",
        name: "Quarterly Review",
        duration_minutes: 90,
        price: 250,
    },
    Service {
        id: "coaching",
        name: "Executive Coaching",
        duration_minutes: 45,
        price: 200,
    },
];

/// Look up a service by id or display name (case-insensitive)
pub fn find_service(key: &str) -> Option<&'static Service> {
    let key = key.trim();
    SERVICES
        .iter()
        .find(|s| s.id.eq_ignore_ascii_case(key) || s.name.eq_ignore_ascii_case(key))
}

/// A candidate start time on the booking page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    /// Local wall-clock label, e.g. "09:30"
    pub label: String,
    pub available: bool,
}

/// Slots for one local day
///
/// Starts run from the workday start to the workday end in `slot_minutes`
/// steps, and a slot is only offered if the whole service still fits before
/// the workday ends. A slot is unavailable when `[start, start + duration)`
/// overlaps any of `events` or when it starts before `now`.
pub fn available_slots(
    window: &DayWindow,
    offset: FixedOffset,
    duration_minutes: u32,
    events: &[Event],
    calendar: &CalendarConfig,
    now: DateTime<Utc>,
) -> Vec<TimeSlot> {
    let duration = Duration::minutes(duration_minutes as i64);
    let step = Duration::minutes(calendar.slot_minutes.max(1) as i64);
    let day_start = window.start + Duration::hours(calendar.workday_start_hour as i64);
    let day_end = window.start + Duration::hours(calendar.workday_end_hour as i64);

    let mut slots = vec![];
    let mut start = day_start;
    while start + duration <= day_end {
        let end = start + duration;
        let busy = events.iter().any(|e| e.overlaps(start, end));
        slots.push(TimeSlot {
            start,
            label: start.with_timezone(&offset).format("%H:%M").to_string(),
            available: !busy && start >= now,
        });
        start += step;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{utc_offset, EventCategory};
    use chrono::{NaiveDate, TimeZone};

    fn window(offset: FixedOffset) -> DayWindow {
        DayWindow::for_date(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(), offset)
    }

    fn busy(start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event {
            id: 1,
            user_id: "u".to_string(),
            title: "Busy".to_string(),
            start,
            end,
            category: EventCategory::Meeting,
            location: None,
            attendees: None,
            description: None,
            appointment_id: None,
            created_at: start,
        }
    }

    fn long_ago() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_find_service() {
        assert_eq!(find_service("strategy").unwrap().duration_minutes, 60);
        assert_eq!(find_service("Quarterly Review").unwrap().price, 250);
        assert!(find_service("massage").is_none());
    }

    #[test]
    fn test_empty_day_offers_every_half_hour() {
        let offset = utc_offset(0).unwrap();
        let slots = available_slots(
            &window(offset),
            offset,
            30,
            &[],
            &CalendarConfig::default(),
            long_ago(),
        );

        // 09:00 through 16:30
        assert_eq!(slots.len(), 16);
        assert_eq!(slots[0].label, "09:00");
        assert_eq!(slots[15].label, "16:30");
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn test_long_service_must_fit_before_close() {
        let offset = utc_offset(0).unwrap();
        let slots = available_slots(
            &window(offset),
            offset,
            90,
            &[],
            &CalendarConfig::default(),
            long_ago(),
        );
        assert_eq!(slots.last().unwrap().label, "15:30");
    }

    #[test]
    fn test_overlapping_event_blocks_slots() {
        let offset = utc_offset(0).unwrap();
        let w = window(offset);
        let event = busy(w.start + Duration::hours(10), w.start + Duration::hours(11));
        let slots = available_slots(&w, offset, 60, &[event], &CalendarConfig::default(), long_ago());

        let unavailable: Vec<&str> = slots
            .iter()
            .filter(|s| !s.available)
            .map(|s| s.label.as_str())
            .collect();
        // 09:30-10:30, 10:00-11:00, 10:30-11:30 overlap; 09:00-10:00 and 11:00 touch only
        assert_eq!(unavailable, vec!["09:30", "10:00", "10:30"]);
    }

    #[test]
    fn test_labels_use_local_time() {
        let offset = utc_offset(-300).unwrap();
        let w = window(offset);
        let slots = available_slots(&w, offset, 30, &[], &CalendarConfig::default(), long_ago());
        assert_eq!(slots[0].label, "09:00");
        assert_eq!(slots[0].start, Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_past_slots_are_unavailable() {
        let offset = utc_offset(0).unwrap();
        let w = window(offset);
        let now = w.start + Duration::hours(12);
        let slots = available_slots(&w, offset, 30, &[], &CalendarConfig::default(), now);
        assert!(!slots[0].available);
        assert!(slots.iter().find(|s| s.label == "12:00").unwrap().available);
    }
}
