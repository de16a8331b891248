// libs/scheduling-cell/src/services/slots.rs
use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use shared_models::scheduling::{Appointment, BlockedRange, WeeklyAvailability};

use crate::models::Slot;

/// Compute the candidate slot list for one provider and one calendar date.
///
/// The result covers every window configured for that weekday, stepped at
/// `granularity` over the half-open `[start, end)` interval. A weekday with
/// no entry, or one flagged unavailable, yields an empty list rather than an
/// error.
///
/// A slot is unavailable when any of three independent checks hit:
/// a non-terminal appointment at that exact time, an active blocked range
/// covering it, or (when `date` is today) a start time at or before `now`.
pub fn generate_slots(
    availability: Option<&WeeklyAvailability>,
    date: NaiveDate,
    now: DateTime<Utc>,
    granularity: Duration,
    appointments: &[Appointment],
    blocked_ranges: &[BlockedRange],
) -> Vec<Slot> {
    let weekday = date.weekday();

    let day = match availability.and_then(|a| a.day(weekday)) {
        Some(day) if day.is_available => day,
        _ => {
            debug!("No availability configured for {:?}", weekday);
            return Vec::new();
        }
    };

    let booked: HashSet<NaiveTime> = appointments
        .iter()
        .filter(|apt| apt.date == date && !apt.status.is_terminal())
        .map(|apt| apt.time)
        .collect();

    let is_today = date == now.date_naive();
    let mut slots = Vec::new();

    for window in &day.windows {
        let mut time = window.start;
        while time < window.end {
            let blocked = blocked_ranges
                .iter()
                .any(|range| range.weekday == weekday && range.is_active && range.covers(time));
            let in_the_past = is_today && time <= now.time();

            slots.push(Slot {
                time,
                available: !booked.contains(&time) && !blocked && !in_the_past,
            });

            // NaiveTime arithmetic wraps at midnight; stop instead of looping.
            let (next, wrapped) = time.overflowing_add_signed(granularity);
            if wrapped != 0 {
                break;
            }
            time = next;
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};
    use shared_models::scheduling::{
        AppointmentStatus, AppointmentType, DayAvailability, TimeWindow,
    };
    use uuid::Uuid;

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn monday_template(provider_id: Uuid, windows: Vec<TimeWindow>) -> WeeklyAvailability {
        WeeklyAvailability {
            provider_id,
            days: vec![DayAvailability {
                weekday: Weekday::Mon,
                is_available: true,
                windows,
            }],
        }
    }

    fn appointment_at(provider_id: Uuid, date: NaiveDate, time: NaiveTime) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: "APT202609070001".to_string(),
            requester_id: Uuid::new_v4(),
            provider_id,
            date,
            time,
            duration_minutes: 30,
            appointment_type: AppointmentType::GeneralConsultation,
            reason: "checkup".to_string(),
            symptoms: vec![],
            status: AppointmentStatus::Scheduled,
            cancellation: None,
            reschedule: None,
            checked_in_at: None,
            checked_out_at: None,
            provider_notes: None,
            rating: None,
            created_at: now,
            updated_at: now,
        }
    }

    // A Monday well in the future relative to the fixed "now" below.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 7).unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn no_weekday_entry_yields_empty_list() {
        let provider_id = Uuid::new_v4();
        let availability = WeeklyAvailability {
            provider_id,
            days: vec![],
        };

        let slots = generate_slots(
            Some(&availability),
            monday(),
            fixed_now(),
            Duration::minutes(30),
            &[],
            &[],
        );
        assert!(slots.is_empty());
    }

    #[test]
    fn unavailable_day_yields_empty_list() {
        let provider_id = Uuid::new_v4();
        let availability = WeeklyAvailability {
            provider_id,
            days: vec![DayAvailability {
                weekday: Weekday::Mon,
                is_available: false,
                windows: vec![TimeWindow {
                    start: t(9, 0),
                    end: t(12, 0),
                }],
            }],
        };

        let slots = generate_slots(
            Some(&availability),
            monday(),
            fixed_now(),
            Duration::minutes(30),
            &[],
            &[],
        );
        assert!(slots.is_empty());
    }

    #[test]
    fn morning_window_yields_six_open_slots() {
        // Scenario: Monday 09:00-12:00, no bookings, no blocks.
        let provider_id = Uuid::new_v4();
        let availability = monday_template(
            provider_id,
            vec![TimeWindow {
                start: t(9, 0),
                end: t(12, 0),
            }],
        );

        let slots = generate_slots(
            Some(&availability),
            monday(),
            fixed_now(),
            Duration::minutes(30),
            &[],
            &[],
        );

        let times: Vec<NaiveTime> = slots.iter().map(|s| s.time).collect();
        assert_eq!(
            times,
            vec![t(9, 0), t(9, 30), t(10, 0), t(10, 30), t(11, 0), t(11, 30)]
        );
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn window_end_is_exclusive() {
        let provider_id = Uuid::new_v4();
        let availability = monday_template(
            provider_id,
            vec![TimeWindow {
                start: t(9, 0),
                end: t(10, 0),
            }],
        );

        let slots = generate_slots(
            Some(&availability),
            monday(),
            fixed_now(),
            Duration::minutes(30),
            &[],
            &[],
        );

        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| s.time < t(10, 0)));
    }

    #[test]
    fn consecutive_slots_differ_by_granularity() {
        let provider_id = Uuid::new_v4();
        let availability = monday_template(
            provider_id,
            vec![TimeWindow {
                start: t(9, 0),
                end: t(12, 0),
            }],
        );

        let slots = generate_slots(
            Some(&availability),
            monday(),
            fixed_now(),
            Duration::minutes(30),
            &[],
            &[],
        );

        for pair in slots.windows(2) {
            assert_eq!(pair[1].time - pair[0].time, Duration::minutes(30));
        }
    }

    #[test]
    fn booked_slot_is_unavailable() {
        // Scenario: non-terminal appointment at 10:00 flips only that entry.
        let provider_id = Uuid::new_v4();
        let availability = monday_template(
            provider_id,
            vec![TimeWindow {
                start: t(9, 0),
                end: t(12, 0),
            }],
        );
        let booked = appointment_at(provider_id, monday(), t(10, 0));

        let slots = generate_slots(
            Some(&availability),
            monday(),
            fixed_now(),
            Duration::minutes(30),
            &[booked],
            &[],
        );

        for slot in &slots {
            assert_eq!(slot.available, slot.time != t(10, 0));
        }
    }

    #[test]
    fn terminal_appointment_does_not_occupy_slot() {
        let provider_id = Uuid::new_v4();
        let availability = monday_template(
            provider_id,
            vec![TimeWindow {
                start: t(9, 0),
                end: t(12, 0),
            }],
        );
        let mut cancelled = appointment_at(provider_id, monday(), t(10, 0));
        cancelled.status = AppointmentStatus::Cancelled;

        let slots = generate_slots(
            Some(&availability),
            monday(),
            fixed_now(),
            Duration::minutes(30),
            &[cancelled],
            &[],
        );

        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn blocked_range_masks_slot() {
        // Scenario: active block Monday 10:00-10:30 with no booking present.
        let provider_id = Uuid::new_v4();
        let availability = monday_template(
            provider_id,
            vec![TimeWindow {
                start: t(9, 0),
                end: t(12, 0),
            }],
        );
        let block = BlockedRange {
            id: Uuid::new_v4(),
            provider_id,
            weekday: Weekday::Mon,
            start_time: t(10, 0),
            end_time: t(10, 30),
            reason: "rounds".to_string(),
            is_active: true,
        };

        let slots = generate_slots(
            Some(&availability),
            monday(),
            fixed_now(),
            Duration::minutes(30),
            &[],
            &[block],
        );

        for slot in &slots {
            assert_eq!(slot.available, slot.time != t(10, 0));
        }
    }

    #[test]
    fn inactive_block_is_ignored() {
        let provider_id = Uuid::new_v4();
        let availability = monday_template(
            provider_id,
            vec![TimeWindow {
                start: t(9, 0),
                end: t(12, 0),
            }],
        );
        let block = BlockedRange {
            id: Uuid::new_v4(),
            provider_id,
            weekday: Weekday::Mon,
            start_time: t(10, 0),
            end_time: t(10, 30),
            reason: "rounds".to_string(),
            is_active: false,
        };

        let slots = generate_slots(
            Some(&availability),
            monday(),
            fixed_now(),
            Duration::minutes(30),
            &[],
            &[block],
        );

        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn past_slots_are_unavailable_when_date_is_today() {
        let provider_id = Uuid::new_v4();
        let availability = monday_template(
            provider_id,
            vec![TimeWindow {
                start: t(9, 0),
                end: t(12, 0),
            }],
        );

        // Now is 10:00 on that same Monday; 10:00 itself counts as passed.
        let now = Utc.with_ymd_and_hms(2026, 9, 7, 10, 0, 0).unwrap();
        let slots = generate_slots(
            Some(&availability),
            monday(),
            now,
            Duration::minutes(30),
            &[],
            &[],
        );

        for slot in &slots {
            assert_eq!(slot.available, slot.time > t(10, 0));
        }
    }

    #[test]
    fn multiple_windows_are_all_covered() {
        let provider_id = Uuid::new_v4();
        let availability = monday_template(
            provider_id,
            vec![
                TimeWindow {
                    start: t(9, 0),
                    end: t(10, 0),
                },
                TimeWindow {
                    start: t(14, 0),
                    end: t(15, 0),
                },
            ],
        );

        let slots = generate_slots(
            Some(&availability),
            monday(),
            fixed_now(),
            Duration::minutes(30),
            &[],
            &[],
        );

        let times: Vec<NaiveTime> = slots.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![t(9, 0), t(9, 30), t(14, 0), t(14, 30)]);
    }
}
