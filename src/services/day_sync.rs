//! Day reconciliation.
//!
//! Attendance rows point at a training day by id, so editing a training's
//! schedule must keep day ids stable wherever the operator meant "the same
//! day". Each submitted day is matched against the stored days by calendar
//! date first and by position (`day_number`) second; matched rows are
//! updated in place, unmatched submissions become new rows, and stored days
//! nobody claimed are deleted (taking their attendance with them).
//!
//! Planning is pure ([`plan_sync`]); [`reconcile`] applies a plan through a
//! [`DayStore`], which the HTTP layer backs with a database transaction.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use thiserror::Error;
use time::Date;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{DbResult, DesiredDay, TrainingDay, TrainingDayInput};

/// Persistence operations the reconciliation needs.
#[async_trait]
pub trait DayStore: Send {
    async fn list_days(&mut self, training_id: Uuid) -> DbResult<Vec<TrainingDay>>;

    async fn create_day(&mut self, training_id: Uuid, day: &DesiredDay) -> DbResult<TrainingDay>;

    async fn update_day(
        &mut self,
        day_id: Uuid,
        training_id: Uuid,
        day: &DesiredDay,
    ) -> DbResult<TrainingDay>;

    /// Deleting a day also deletes its attendance rows.
    async fn delete_day(&mut self, day_id: Uuid) -> DbResult<()>;
}

/// What happens to one submitted day. `desired` indexes the submitted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayAction {
    Update { day_id: Uuid, desired: usize },
    Create { desired: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// One action per submitted day, in submission order.
    pub actions: Vec<DayAction>,
    /// Stored days that no submitted day claimed.
    pub deletions: Vec<Uuid>,
}

impl SyncPlan {
    pub fn updates(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, DayAction::Update { .. }))
            .count()
    }

    pub fn creates(&self) -> usize {
        self.actions.len() - self.updates()
    }
}

/// A way of picking a stored day for a submitted one. Matchers never return
/// an id that is already in `consumed`.
trait DayMatcher {
    fn candidate(&self, desired: &DesiredDay, consumed: &HashSet<Uuid>) -> Option<Uuid>;
}

/// Same calendar date. Only the first stored day per date is eligible, so a
/// consumed hit means "no date match" rather than "try the next one".
struct ByDate {
    first_by_date: HashMap<Date, Uuid>,
}

impl ByDate {
    fn new(existing: &[&TrainingDay]) -> Self {
        let mut first_by_date = HashMap::new();
        for day in existing {
            first_by_date.entry(day.training_date).or_insert(day.id);
        }
        Self { first_by_date }
    }
}

impl DayMatcher for ByDate {
    fn candidate(&self, desired: &DesiredDay, consumed: &HashSet<Uuid>) -> Option<Uuid> {
        self.first_by_date
            .get(&desired.training_date)
            .copied()
            .filter(|id| !consumed.contains(id))
    }
}

/// Same position; first unconsumed day in the bucket wins.
struct ByDayNumber {
    buckets: HashMap<i32, Vec<Uuid>>,
}

impl ByDayNumber {
    fn new(existing: &[&TrainingDay]) -> Self {
        let mut buckets: HashMap<i32, Vec<Uuid>> = HashMap::new();
        for day in existing {
            buckets.entry(day.day_number).or_default().push(day.id);
        }
        Self { buckets }
    }
}

impl DayMatcher for ByDayNumber {
    fn candidate(&self, desired: &DesiredDay, consumed: &HashSet<Uuid>) -> Option<Uuid> {
        self.buckets
            .get(&desired.day_number)?
            .iter()
            .copied()
            .find(|id| !consumed.contains(id))
    }
}

/// Work out which stored days to reuse, which submitted days to create and
/// which stored days to delete.
///
/// Stored days are ranked by `(day_number, created_at, id)` before matching,
/// so when two stored days share a date the earliest-positioned one is the
/// date match no matter what order the store returned them in.
pub fn plan_sync(existing: &[TrainingDay], desired: &[DesiredDay]) -> SyncPlan {
    let mut ranked: Vec<&TrainingDay> = existing.iter().collect();
    ranked.sort_by(|a, b| {
        (a.day_number, a.created_at, a.id).cmp(&(b.day_number, b.created_at, b.id))
    });

    let by_date = ByDate::new(&ranked);
    let by_day_number = ByDayNumber::new(&ranked);
    let matchers: [&dyn DayMatcher; 2] = [&by_date, &by_day_number];

    let mut consumed = HashSet::with_capacity(ranked.len());
    let mut actions = Vec::with_capacity(desired.len());

    for (index, day) in desired.iter().enumerate() {
        let matched = matchers
            .iter()
            .find_map(|matcher| matcher.candidate(day, &consumed));

        match matched {
            Some(day_id) => {
                consumed.insert(day_id);
                actions.push(DayAction::Update {
                    day_id,
                    desired: index,
                });
            }
            None => actions.push(DayAction::Create { desired: index }),
        }
    }

    let deletions = ranked
        .iter()
        .map(|day| day.id)
        .filter(|id| !consumed.contains(id))
        .collect();

    SyncPlan { actions, deletions }
}

/// Apply `desired` to a training whose current days are `existing`.
///
/// Returns the resulting days ordered by `day_number`. The first store
/// failure aborts the run and is returned as is; callers that need
/// all-or-nothing behaviour run this inside a transaction.
pub async fn reconcile<S>(
    store: &mut S,
    training_id: Uuid,
    existing: &[TrainingDay],
    desired: &[DesiredDay],
) -> DbResult<Vec<TrainingDay>>
where
    S: DayStore + ?Sized,
{
    let plan = plan_sync(existing, desired);
    debug!(
        %training_id,
        updates = plan.updates(),
        creates = plan.creates(),
        deletions = plan.deletions.len(),
        "Planned training day sync"
    );

    let mut days = Vec::with_capacity(plan.actions.len());
    for action in &plan.actions {
        let day = match *action {
            DayAction::Update { day_id, desired: i } => {
                store.update_day(day_id, training_id, &desired[i]).await?
            }
            DayAction::Create { desired: i } => store.create_day(training_id, &desired[i]).await?,
        };
        days.push(day);
    }

    for day_id in &plan.deletions {
        store.delete_day(*day_id).await?;
    }

    days.sort_by_key(|day| day.day_number);

    info!(
        %training_id,
        updated = plan.updates(),
        created = plan.creates(),
        deleted = plan.deletions.len(),
        "Training days synced"
    );
    Ok(days)
}

/// Fetch the training's current days from `store`, then [`reconcile`].
pub async fn sync_training_days<S>(
    store: &mut S,
    training_id: Uuid,
    desired: &[DesiredDay],
) -> DbResult<Vec<TrainingDay>>
where
    S: DayStore + ?Sized,
{
    let existing = store.list_days(training_id).await?;
    reconcile(store, training_id, &existing, desired).await
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DayInputError {
    #[error("All training days must have date, start time, and end time (day {position})")]
    MissingFields { position: usize },
}

/// Turn posted days into [`DesiredDay`]s.
///
/// Date, start and end are required. A missing `day_number` takes the
/// day's 1-based position; blank location and instructor fall back to the
/// training's own values.
pub fn desired_days_from_input(
    days: &[TrainingDayInput],
    training_location: Option<&str>,
    training_instructor: Option<&str>,
) -> Result<Vec<DesiredDay>, DayInputError> {
    days.iter()
        .enumerate()
        .map(|(index, day)| {
            let position = index + 1;
            let (Some(training_date), Some(start_time), Some(end_time)) =
                (day.training_date, day.start_time, day.end_time)
            else {
                return Err(DayInputError::MissingFields { position });
            };

            Ok(DesiredDay {
                day_number: day.day_number.unwrap_or(position as i32),
                training_date,
                start_time,
                end_time,
                location: non_blank(day.location.as_deref()).or(non_blank(training_location)),
                instructor: non_blank(day.instructor.as_deref())
                    .or(non_blank(training_instructor)),
                description: non_blank(day.description.as_deref()),
            })
        })
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
