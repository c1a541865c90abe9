//! Attendance report assembly.
//!
//! Everything here is pure: the handler loads the rows, this module lines
//! them up per participant and day and runs the duration rules over them.

use std::collections::HashMap;

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::duration::{credited_for_day, participant_summary, AttendanceMark, EnrollmentSummary, OverrideSet};
use crate::db::{
    AttendanceStatus, DailyAttendance, EnrollmentWithParticipant, Participant, Training, TrainingDay,
};

#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub training_day_id: Uuid,
    pub day_number: i32,
    pub status: AttendanceStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub attendance_time: Option<OffsetDateTime>,
    pub minutes: i64,
    pub hours: f64,
    pub is_late: bool,
    pub overridden: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantReport {
    pub training_participant_id: Uuid,
    pub participant: Participant,
    pub days: Vec<DayReport>,
    pub summary: EnrollmentSummary,
}

/// Participant-day counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceStats {
    pub registered: usize,
    pub attended: usize,
    pub absent: usize,
    pub cancelled: usize,
}

impl AttendanceStats {
    fn count(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Registered => self.registered += 1,
            AttendanceStatus::Attended => self.attended += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Cancelled => self.cancelled += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_participants: usize,
    pub total_days: usize,
    pub attendance_stats: AttendanceStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub training: Training,
    pub days: Vec<TrainingDay>,
    pub participants: Vec<ParticipantReport>,
    pub summary: ReportSummary,
}

/// Build the report for one training.
///
/// `attendance` may hold rows for any enrollment and day; rows that match
/// neither are ignored. A participant-day without a row takes the
/// enrollment's own status and no timestamp.
pub fn build_training_report(
    training: Training,
    mut days: Vec<TrainingDay>,
    enrollments: Vec<EnrollmentWithParticipant>,
    attendance: &[DailyAttendance],
    overrides: &OverrideSet,
) -> TrainingReport {
    days.sort_by_key(|day| day.day_number);

    let recorded: HashMap<(Uuid, Uuid), AttendanceMark> = attendance
        .iter()
        .map(|row| ((row.training_participant_id, row.training_day_id), AttendanceMark::from(row)))
        .collect();

    let mut stats = AttendanceStats::default();
    let participants = enrollments
        .into_iter()
        .map(|EnrollmentWithParticipant { enrollment, participant }| {
            let fallback = AttendanceMark {
                status: enrollment.attendance_status,
                attendance_time: None,
            };
            let marks: HashMap<Uuid, AttendanceMark> = days
                .iter()
                .map(|day| {
                    let mark = recorded
                        .get(&(enrollment.id, day.id))
                        .copied()
                        .unwrap_or(fallback);
                    (day.id, mark)
                })
                .collect();

            let day_reports = days
                .iter()
                .filter_map(|day| {
                    let mark = marks.get(&day.id)?;
                    stats.count(mark.status);
                    let credited = credited_for_day(participant.id, day, Some(mark), overrides);
                    Some(DayReport {
                        training_day_id: day.id,
                        day_number: day.day_number,
                        status: mark.status,
                        attendance_time: mark.attendance_time,
                        minutes: credited.minutes,
                        hours: credited.hours(),
                        is_late: credited.is_late,
                        overridden: overrides.contains(participant.id, day.id),
                    })
                })
                .collect();

            ParticipantReport {
                training_participant_id: enrollment.id,
                summary: participant_summary(participant.id, &days, &marks, overrides),
                participant,
                days: day_reports,
            }
        })
        .collect::<Vec<_>>();

    TrainingReport {
        summary: ReportSummary {
            total_participants: participants.len(),
            total_days: days.len(),
            attendance_stats: stats,
        },
        training,
        days,
        participants,
    }
}

/// Reports for several trainings at once, in the order of `trainings`.
///
/// Days and enrollments are grouped by their training id. With
/// `skip_unattended` set, trainings that end up with no enrollments are
/// left out, which is what a participant-name search wants.
pub fn build_reports(
    trainings: Vec<Training>,
    days: Vec<TrainingDay>,
    enrollments: Vec<EnrollmentWithParticipant>,
    attendance: &[DailyAttendance],
    overrides: &OverrideSet,
    skip_unattended: bool,
) -> Vec<TrainingReport> {
    let mut days_by_training: HashMap<Uuid, Vec<TrainingDay>> = HashMap::new();
    for day in days {
        days_by_training.entry(day.training_id).or_default().push(day);
    }
    let mut enrollments_by_training: HashMap<Uuid, Vec<EnrollmentWithParticipant>> = HashMap::new();
    for enrollment in enrollments {
        enrollments_by_training
            .entry(enrollment.enrollment.training_id)
            .or_default()
            .push(enrollment);
    }

    trainings
        .into_iter()
        .filter_map(|training| {
            let enrollments = enrollments_by_training.remove(&training.id).unwrap_or_default();
            if skip_unattended && enrollments.is_empty() {
                return None;
            }
            let days = days_by_training.remove(&training.id).unwrap_or_default();
            Some(build_training_report(training, days, enrollments, attendance, overrides))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{TrainingParticipant, TrainingStatus};
    use crate::services::day_sync::tests::stored;
    use time::macros::{date, datetime};

    fn training() -> Training {
        Training {
            id: Uuid::from_u128(7),
            title: "Forklift safety".to_string(),
            description: None,
            training_date: None,
            start_time: None,
            end_time: None,
            location: Some("Hall B".to_string()),
            instructor: None,
            max_participants: Some(12),
            status: TrainingStatus::Ongoing,
            created_at: datetime!(2024-01-01 00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00 UTC),
        }
    }

    fn enrolled(id: u128, participant_id: u128, status: AttendanceStatus) -> EnrollmentWithParticipant {
        EnrollmentWithParticipant {
            enrollment: TrainingParticipant {
                id: Uuid::from_u128(id),
                participant_id: Uuid::from_u128(participant_id),
                training_id: Uuid::from_u128(7),
                registration_date: datetime!(2024-01-02 00:00 UTC),
                attendance_status: status,
                attendance_time: None,
                notes: None,
                created_at: datetime!(2024-01-02 00:00 UTC),
                updated_at: datetime!(2024-01-02 00:00 UTC),
            },
            participant: Participant {
                id: Uuid::from_u128(participant_id),
                name: format!("Participant {participant_id}"),
                email: format!("p{participant_id}@example.com"),
                phone: None,
                address: None,
                created_at: datetime!(2024-01-02 00:00 UTC),
                updated_at: datetime!(2024-01-02 00:00 UTC),
            },
        }
    }

    fn record(
        enrollment: u128,
        day: Uuid,
        status: AttendanceStatus,
        at: Option<OffsetDateTime>,
    ) -> DailyAttendance {
        DailyAttendance {
            id: Uuid::new_v4(),
            training_participant_id: Uuid::from_u128(enrollment),
            training_day_id: day,
            attendance_status: status,
            attendance_time: at,
            notes: None,
            created_at: datetime!(2024-01-10 00:00 UTC),
            updated_at: datetime!(2024-01-10 00:00 UTC),
        }
    }

    #[test]
    fn report_lines_up_days_statuses_and_totals() {
        let day_two = stored(Uuid::from_u128(2), 2, date!(2024 - 01 - 11));
        let day_one = stored(Uuid::from_u128(1), 1, date!(2024 - 01 - 10));
        let attendance = vec![
            record(100, day_one.id, AttendanceStatus::Attended, Some(datetime!(2024-01-10 10:30 UTC))),
            record(100, day_two.id, AttendanceStatus::Absent, None),
            record(200, day_one.id, AttendanceStatus::Attended, Some(datetime!(2024-01-10 08:50 UTC))),
        ];

        let report = build_training_report(
            training(),
            vec![day_two, day_one],
            vec![
                enrolled(100, 10, AttendanceStatus::Registered),
                enrolled(200, 20, AttendanceStatus::Registered),
            ],
            &attendance,
            &OverrideSet::default(),
        );

        assert_eq!(report.days[0].day_number, 1);

        let late = &report.participants[0];
        assert_eq!(late.days[0].minutes, 390);
        assert!(late.days[0].is_late);
        assert_eq!(late.days[1].status, AttendanceStatus::Absent);
        assert_eq!(late.summary.total_minutes, 390);

        // No row for day two: falls back to the enrollment status.
        let on_time = &report.participants[1];
        assert_eq!(on_time.days[1].status, AttendanceStatus::Registered);
        assert_eq!(on_time.days[1].attendance_time, None);
        assert_eq!(on_time.summary.total_hours, 8.0);

        assert_eq!(
            report.summary,
            ReportSummary {
                total_participants: 2,
                total_days: 2,
                attendance_stats: AttendanceStats {
                    registered: 1,
                    attended: 2,
                    absent: 1,
                    cancelled: 0,
                },
            }
        );
    }

    #[test]
    fn overrides_only_touch_the_named_pair() {
        let day = stored(Uuid::from_u128(1), 1, date!(2024 - 01 - 10));
        let late_at = Some(datetime!(2024-01-10 10:30 UTC));
        let attendance = vec![
            record(100, day.id, AttendanceStatus::Attended, late_at),
            record(200, day.id, AttendanceStatus::Attended, late_at),
        ];
        let overrides: OverrideSet = [(Uuid::from_u128(10), day.id)].into_iter().collect();

        let report = build_training_report(
            training(),
            vec![day],
            vec![
                enrolled(100, 10, AttendanceStatus::Registered),
                enrolled(200, 20, AttendanceStatus::Registered),
            ],
            &attendance,
            &overrides,
        );

        let forgiven = &report.participants[0].days[0];
        assert!(forgiven.overridden);
        assert!(!forgiven.is_late);
        assert_eq!(forgiven.hours, 8.0);

        let still_late = &report.participants[1].days[0];
        assert!(!still_late.overridden);
        assert!(still_late.is_late);
        assert_eq!(still_late.hours, 6.5);
    }

    #[test]
    fn attended_enrollment_without_rows_earns_full_days() {
        let days = vec![
            stored(Uuid::from_u128(1), 1, date!(2024 - 01 - 10)),
            stored(Uuid::from_u128(2), 2, date!(2024 - 01 - 11)),
        ];
        let report = build_training_report(
            training(),
            days,
            vec![enrolled(100, 10, AttendanceStatus::Attended)],
            &[],
            &OverrideSet::default(),
        );

        assert_eq!(report.participants[0].summary.total_hours, 16.0);
        assert_eq!(report.summary.attendance_stats.attended, 2);
    }

    #[test]
    fn reports_group_by_training_and_can_skip_empty_ones() {
        let mut other = training();
        other.id = Uuid::from_u128(8);
        other.title = "Ladder safety".to_string();

        let day = stored(Uuid::from_u128(1), 1, date!(2024 - 01 - 10));
        let enrollments = vec![enrolled(100, 10, AttendanceStatus::Attended)];

        let all = build_reports(
            vec![training(), other.clone()],
            vec![day.clone()],
            enrollments.clone(),
            &[],
            &OverrideSet::default(),
            false,
        );
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].days.len(), 1);
        assert_eq!(all[1].summary.total_participants, 0);

        let matched = build_reports(
            vec![training(), other],
            vec![day],
            enrollments,
            &[],
            &OverrideSet::default(),
            true,
        );
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].training.id, Uuid::from_u128(7));
    }
}
