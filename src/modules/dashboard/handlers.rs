use axum::{extract::State, Json};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::app_state::AppState;
use crate::db::{
    repositories::{AttendanceRepository, ParticipantRepository, TrainingRepository},
    TrainingListing,
};
use crate::error::AppResult;
use crate::middleware::CurrentUser;

const LISTING_SIZE: usize = 5;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_trainings: i64,
    pub total_participants: i64,
    pub upcoming_trainings: i64,
    pub ongoing_trainings: i64,
    pub completed_trainings: i64,
    /// Percentage of daily attendance records marked attended.
    pub attendance_rate: f64,
    pub recent_trainings: Vec<TrainingListing>,
    pub upcoming_trainings_list: Vec<TrainingListing>,
}

pub async fn dashboard_stats(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<Json<DashboardStats>> {
    let counts = TrainingRepository::counts(&state.db).await?;
    let total_participants = ParticipantRepository::count(&state.db).await?;
    let tally = AttendanceRepository::tally(&state.db).await?;
    let recent = TrainingRepository::recent(&state.db, LISTING_SIZE as i64).await?;
    let active = TrainingRepository::active_listings(&state.db).await?;

    Ok(Json(DashboardStats {
        total_trainings: counts.total,
        total_participants,
        upcoming_trainings: counts.upcoming,
        ongoing_trainings: counts.ongoing,
        completed_trainings: counts.completed,
        attendance_rate: tally.rate(),
        recent_trainings: recent,
        upcoming_trainings_list: upcoming(active, OffsetDateTime::now_utc().date(), LISTING_SIZE),
    }))
}

/// Drop trainings dated before `today`, then order by date with undated
/// trainings last.
fn upcoming(mut listings: Vec<TrainingListing>, today: Date, limit: usize) -> Vec<TrainingListing> {
    listings.retain(|t| t.training_date.map_or(true, |d| d >= today));
    listings.sort_by_key(|t| (t.training_date.is_none(), t.training_date));
    listings.truncate(limit);
    listings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TrainingStatus;
    use time::macros::date;
    use uuid::Uuid;

    fn listing(n: u128, date: Option<Date>) -> TrainingListing {
        TrainingListing {
            id: Uuid::from_u128(n),
            title: format!("Training {n}"),
            status: TrainingStatus::Scheduled,
            training_date: date,
            start_time: None,
            location: None,
        }
    }

    #[test]
    fn upcoming_skips_past_and_puts_undated_last() {
        let today = date!(2024 - 03 - 10);
        let listings = vec![
            listing(1, None),
            listing(2, Some(date!(2024 - 03 - 20))),
            listing(3, Some(date!(2024 - 03 - 01))),
            listing(4, Some(today)),
        ];

        let ids: Vec<u128> = upcoming(listings, today, 5)
            .iter()
            .map(|t| t.id.as_u128())
            .collect();
        assert_eq!(ids, vec![4, 2, 1]);
    }

    #[test]
    fn upcoming_is_capped() {
        let today = date!(2024 - 03 - 10);
        let listings = (1..=8).map(|n| listing(n, Some(today))).collect();
        assert_eq!(upcoming(listings, today, 5).len(), 5);
    }
}
