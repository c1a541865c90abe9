use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use time::Date;
use tracing::info;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{
    formats::iso_date,
    repositories::{
        AttendanceRepository, EnrollmentRepository, TrainingDayRepository, TrainingRepository,
    },
};
use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::duration::OverrideSet;
use crate::services::report::{build_reports, TrainingReport};

/// Camel-case aliases are accepted for the dashboard's existing links.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(alias = "trainingId")]
    pub training_id: Option<Uuid>,
    #[serde(default, alias = "startDate", with = "iso_date::option")]
    pub start_date: Option<Date>,
    #[serde(default, alias = "endDate", with = "iso_date::option")]
    pub end_date: Option<Date>,
    #[serde(alias = "participantName")]
    pub participant_name: Option<String>,
    /// Comma separated `participant_id:day_id` pairs credited as on time.
    pub overrides: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSelection {
    ParticipantName(String),
    Training(Uuid),
    DateRange { start: Date, end: Date },
}

impl ReportQuery {
    /// Participant name wins over training id, which wins over a date range.
    pub fn selection(&self) -> AppResult<ReportSelection> {
        let name = self
            .participant_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        match (name, self.training_id, self.start_date, self.end_date) {
            (Some(name), _, _, _) => Ok(ReportSelection::ParticipantName(name.to_string())),
            (None, Some(id), _, _) => Ok(ReportSelection::Training(id)),
            (None, None, Some(start), Some(end)) if start > end => Err(AppError::Validation(
                "start_date must not be after end_date".to_string(),
            )),
            (None, None, Some(start), Some(end)) => Ok(ReportSelection::DateRange { start, end }),
            _ => Err(AppError::BadRequest(
                "Either training_id, start_date/end_date, or participant_name is required"
                    .to_string(),
            )),
        }
    }
}

/// Attendance report with per-day credited hours. Overrides only change
/// this response; nothing is written back.
pub async fn attendance_report(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<TrainingReport>>> {
    let selection = query.selection()?;
    let overrides = OverrideSet::parse(query.overrides.as_deref().unwrap_or_default())?;

    let (training_ids, name_filter) = match &selection {
        ReportSelection::ParticipantName(name) => (
            TrainingRepository::ids_with_participant_named(&state.db, name).await?,
            Some(name.as_str()),
        ),
        ReportSelection::Training(id) => {
            if TrainingRepository::find_by_id(&state.db, *id).await?.is_none() {
                return Err(AppError::NotFound("Training not found".to_string()));
            }
            (vec![*id], None)
        }
        ReportSelection::DateRange { start, end } => (
            TrainingRepository::ids_scheduled_between(&state.db, *start, *end).await?,
            None,
        ),
    };

    if training_ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let trainings = TrainingRepository::find_many(&state.db, &training_ids).await?;
    let days = TrainingDayRepository::list_for_trainings(&state.db, &training_ids).await?;
    let enrollments =
        EnrollmentRepository::list_for_trainings(&state.db, &training_ids, name_filter).await?;
    let enrollment_ids: Vec<Uuid> = enrollments.iter().map(|e| e.enrollment.id).collect();
    let attendance = AttendanceRepository::list_for_enrollments(&state.db, &enrollment_ids).await?;

    let reports = build_reports(
        trainings,
        days,
        enrollments,
        &attendance,
        &overrides,
        name_filter.is_some(),
    );

    info!(
        selection = ?selection,
        trainings = reports.len(),
        overrides = overrides.len(),
        "Attendance report generated"
    );
    Ok(Json(reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn parse(raw: &str) -> ReportQuery {
        let uri: axum::http::Uri = format!("/api/reports?{raw}").parse().unwrap();
        Query::<ReportQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn participant_name_takes_priority() {
        let query = parse("participant_name=%20Ana%20&training_id=00000000-0000-0000-0000-000000000007");
        assert_eq!(
            query.selection().unwrap(),
            ReportSelection::ParticipantName("Ana".to_string())
        );
    }

    #[test]
    fn camel_case_date_range_is_accepted() {
        let query = parse("startDate=2024-01-01&endDate=2024-01-31");
        assert_eq!(
            query.selection().unwrap(),
            ReportSelection::DateRange {
                start: date!(2024 - 01 - 01),
                end: date!(2024 - 01 - 31),
            }
        );
    }

    #[test]
    fn half_a_range_is_not_a_selection() {
        let err = parse("start_date=2024-01-01").selection().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = parse("start_date=2024-02-01&end_date=2024-01-01")
            .selection()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn no_selector_is_a_bad_request() {
        assert!(matches!(
            ReportQuery::default().selection(),
            Err(AppError::BadRequest(_))
        ));
    }
}
