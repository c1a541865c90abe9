//! Effective attended time per training day and per participant.
//!
//! Arithmetic is done in whole minutes on wall-clock values; timestamps are
//! read in whatever offset they carry and never converted.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::db::{AttendanceStatus, DailyAttendance, TrainingDay};

/// A day's scheduled window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: Date,
    pub start: Time,
    pub end: Time,
}

impl DayWindow {
    pub fn starts_at(&self) -> PrimitiveDateTime {
        PrimitiveDateTime::new(self.date, self.start)
    }

    pub fn ends_at(&self) -> PrimitiveDateTime {
        PrimitiveDateTime::new(self.date, self.end)
    }

    pub fn scheduled_minutes(&self) -> i64 {
        (self.ends_at() - self.starts_at()).whole_minutes().max(0)
    }
}

impl From<&TrainingDay> for DayWindow {
    fn from(day: &TrainingDay) -> Self {
        Self {
            date: day.training_date,
            start: day.start_time,
            end: day.end_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayDuration {
    pub minutes: i64,
    /// Arrived strictly after the scheduled start with no override applied.
    pub is_late: bool,
}

impl DayDuration {
    pub const ZERO: DayDuration = DayDuration {
        minutes: 0,
        is_late: false,
    };

    pub fn hours(&self) -> f64 {
        self.minutes as f64 / 60.0
    }

    fn on_time(minutes: i64) -> Self {
        Self {
            minutes,
            is_late: false,
        }
    }
}

/// The status and timestamp half of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceMark {
    pub status: AttendanceStatus,
    pub attendance_time: Option<OffsetDateTime>,
}

impl From<&DailyAttendance> for AttendanceMark {
    fn from(record: &DailyAttendance) -> Self {
        Self {
            status: record.attendance_status,
            attendance_time: record.attendance_time,
        }
    }
}

/// Drop the offset without converting: the clock reading is what counts.
pub fn wall_clock(timestamp: OffsetDateTime) -> PrimitiveDateTime {
    PrimitiveDateTime::new(timestamp.date(), timestamp.time())
}

/// Credited time for one day.
///
/// Only `attended` earns time. A missing timestamp or an on-time override
/// earns the whole window; otherwise arriving at or before the start earns
/// the whole window and arriving later earns what is left of it.
///
/// The arrival is compared against the window on the day's own date, so an
/// arrival stamped on another date is judged as a full datetime rather than
/// by its time of day.
pub fn day_duration(
    window: &DayWindow,
    status: AttendanceStatus,
    attended_at: Option<PrimitiveDateTime>,
    on_time_override: bool,
) -> DayDuration {
    if status != AttendanceStatus::Attended {
        return DayDuration::ZERO;
    }

    let full = DayDuration::on_time(window.scheduled_minutes());
    let Some(arrived) = attended_at else {
        return full;
    };
    if on_time_override || arrived <= window.starts_at() {
        return full;
    }

    DayDuration {
        minutes: (window.ends_at() - arrived).whole_minutes().max(0),
        is_late: true,
    }
}

/// Operator-chosen (participant, day) pairs credited as on time.
///
/// Lives only for the request that carries it; it is never written to
/// attendance records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSet(HashSet<(Uuid, Uuid)>);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid override '{0}', expected <participant_id>:<day_id>")]
pub struct OverrideParseError(pub String);

impl OverrideSet {
    pub fn insert(&mut self, participant_id: Uuid, day_id: Uuid) -> bool {
        self.0.insert((participant_id, day_id))
    }

    pub fn contains(&self, participant_id: Uuid, day_id: Uuid) -> bool {
        self.0.contains(&(participant_id, day_id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a comma separated `participant_id:day_id` list.
    pub fn parse(raw: &str) -> Result<Self, OverrideParseError> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (participant, day) = entry
                    .split_once(':')
                    .ok_or_else(|| OverrideParseError(entry.to_string()))?;
                let participant = Uuid::parse_str(participant.trim())
                    .map_err(|_| OverrideParseError(entry.to_string()))?;
                let day = Uuid::parse_str(day.trim())
                    .map_err(|_| OverrideParseError(entry.to_string()))?;
                Ok((participant, day))
            })
            .collect()
    }
}

impl FromIterator<(Uuid, Uuid)> for OverrideSet {
    fn from_iter<I: IntoIterator<Item = (Uuid, Uuid)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Credited time for a participant on one day, applying their override.
pub fn credited_for_day(
    participant_id: Uuid,
    day: &TrainingDay,
    mark: Option<&AttendanceMark>,
    overrides: &OverrideSet,
) -> DayDuration {
    match mark {
        Some(mark) => day_duration(
            &DayWindow::from(day),
            mark.status,
            mark.attendance_time.map(wall_clock),
            overrides.contains(participant_id, day.id),
        ),
        None => DayDuration::ZERO,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnrollmentSummary {
    pub participant_id: Uuid,
    pub total_minutes: i64,
    pub total_hours: f64,
}

/// Total credited time for one participant over a training's days.
/// `marks` is keyed by day id; days without a mark earn nothing.
pub fn participant_summary(
    participant_id: Uuid,
    days: &[TrainingDay],
    marks: &HashMap<Uuid, AttendanceMark>,
    overrides: &OverrideSet,
) -> EnrollmentSummary {
    let total_minutes = days
        .iter()
        .map(|day| credited_for_day(participant_id, day, marks.get(&day.id), overrides).minutes)
        .sum::<i64>();

    EnrollmentSummary {
        participant_id,
        total_minutes,
        total_hours: total_minutes as f64 / 60.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::day_sync::tests::stored;
    use time::macros::{date, datetime, time};

    fn nine_to_five() -> DayWindow {
        DayWindow {
            date: date!(2024 - 01 - 10),
            start: time!(9:00),
            end: time!(17:00),
        }
    }

    fn attended(at: PrimitiveDateTime, on_time_override: bool) -> DayDuration {
        day_duration(
            &nine_to_five(),
            AttendanceStatus::Attended,
            Some(at),
            on_time_override,
        )
    }

    #[test]
    fn arriving_exactly_on_start_earns_the_full_day() {
        let result = attended(datetime!(2024-01-10 09:00), false);
        assert_eq!(result, DayDuration::on_time(480));
        assert_eq!(result.hours(), 8.0);
    }

    #[test]
    fn late_arrival_earns_the_remaining_window() {
        let result = attended(datetime!(2024-01-10 10:30), false);
        assert_eq!(result.minutes, 390);
        assert_eq!(result.hours(), 6.5);
        assert!(result.is_late);
    }

    #[test]
    fn override_restores_the_full_window() {
        let result = attended(datetime!(2024-01-10 10:30), true);
        assert_eq!(result.hours(), 8.0);
        assert!(!result.is_late);
    }

    #[test]
    fn absent_earns_nothing_even_with_a_timestamp() {
        let result = day_duration(
            &nine_to_five(),
            AttendanceStatus::Absent,
            Some(datetime!(2024-01-10 09:00)),
            true,
        );
        assert_eq!(result, DayDuration::ZERO);
    }

    #[test]
    fn attended_without_timestamp_earns_the_full_window() {
        let result = day_duration(&nine_to_five(), AttendanceStatus::Attended, None, false);
        assert_eq!(result.minutes, 480);
        assert!(!result.is_late);
    }

    #[test]
    fn early_arrival_is_capped_at_the_window() {
        assert_eq!(attended(datetime!(2024-01-10 07:45), false).minutes, 480);
    }

    #[test]
    fn arriving_after_the_end_earns_zero_not_negative() {
        let result = attended(datetime!(2024-01-10 18:15), false);
        assert_eq!(result.minutes, 0);
        assert!(result.is_late);
    }

    #[test]
    fn zero_length_window_earns_nothing() {
        let window = DayWindow {
            date: date!(2024 - 01 - 10),
            start: time!(9:00),
            end: time!(9:00),
        };
        for arrival in [None, Some(datetime!(2024-01-10 08:00)), Some(datetime!(2024-01-10 09:30))] {
            assert_eq!(
                day_duration(&window, AttendanceStatus::Attended, arrival, false).minutes,
                0
            );
        }
    }

    #[test]
    fn arrival_on_another_date_compares_as_a_full_datetime() {
        // Next morning: after the start datetime, nothing left of the window.
        let next_day = attended(datetime!(2024-01-11 08:00), false);
        assert_eq!(next_day, DayDuration { minutes: 0, is_late: true });

        // Previous day at 10:30: before the start datetime, so full credit.
        let previous_day = attended(datetime!(2024-01-09 10:30), false);
        assert_eq!(previous_day, DayDuration::on_time(480));
    }

    #[test]
    fn wall_clock_ignores_the_offset() {
        let stamped = datetime!(2024-01-10 10:30 +07:00);
        assert_eq!(wall_clock(stamped), datetime!(2024-01-10 10:30));
    }

    #[test]
    fn summary_sums_days_and_applies_overrides_per_pair() {
        let participant = Uuid::from_u128(42);
        let day_one = stored(Uuid::from_u128(1), 1, date!(2024 - 01 - 10));
        let day_two = stored(Uuid::from_u128(2), 2, date!(2024 - 01 - 11));
        let day_three = stored(Uuid::from_u128(3), 3, date!(2024 - 01 - 12));
        let days = vec![day_one.clone(), day_two.clone(), day_three];

        let marks = HashMap::from([
            (
                day_one.id,
                AttendanceMark {
                    status: AttendanceStatus::Attended,
                    attendance_time: Some(datetime!(2024-01-10 10:30 UTC)),
                },
            ),
            (
                day_two.id,
                AttendanceMark {
                    status: AttendanceStatus::Attended,
                    attendance_time: Some(datetime!(2024-01-11 11:00 UTC)),
                },
            ),
        ]);

        let none = participant_summary(participant, &days, &marks, &OverrideSet::default());
        assert_eq!(none.total_minutes, 390 + 360);
        assert_eq!(none.total_hours, 12.5);

        let overrides: OverrideSet = [(participant, day_two.id)].into_iter().collect();
        let with_override = participant_summary(participant, &days, &marks, &overrides);
        assert_eq!(with_override.total_minutes, 390 + 480);

        // Someone else's override does not leak across participants.
        let foreign: OverrideSet = [(Uuid::from_u128(99), day_one.id)].into_iter().collect();
        assert_eq!(
            participant_summary(participant, &days, &marks, &foreign).total_minutes,
            750
        );
    }

    #[test]
    fn override_list_parses_pairs() {
        let participant = Uuid::from_u128(1);
        let day = Uuid::from_u128(2);
        let raw = format!("{participant}:{day}, ");

        let set = OverrideSet::parse(&raw).unwrap();
        assert!(set.contains(participant, day));
        assert_eq!(set.len(), 1);
        assert!(OverrideSet::parse("").unwrap().is_empty());
        assert!(OverrideSet::parse("not-a-pair").is_err());
    }
}
