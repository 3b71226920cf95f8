/// Dashboard statistics
///
/// [`compute_stats`] is a pure function of a task set and a reference instant.
/// Every date comparison happens on calendar dates in the reference instant's
/// time zone, so two timestamps on the same local day always land in the same
/// bucket regardless of time of day.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use tasktrack_shared::services::stats::compute_stats;
///
/// let stats = compute_stats(&[], Utc::now());
/// assert_eq!(stats.total, 0);
/// assert_eq!(stats.chart_data.len(), 7);
/// ```
use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::error::ServiceResult;
use crate::models::task::{Task, TaskPriority};
use crate::store::SharedStore;

/// Days covered by the completion chart, today included
pub const CHART_DAYS: u64 = 7;

/// One bar of the completion chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    /// Short weekday label, e.g. "Mon"
    pub date: String,

    /// Tasks completed (last updated while completed) on that day
    pub count: usize,
}

/// Aggregate counts for one user's dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,

    /// `total - completed`
    pub pending: usize,

    /// High priority and not completed
    pub high: usize,

    /// Not completed, due before now on an earlier calendar day
    pub overdue: usize,

    /// Not completed, due on today's calendar date
    pub due_today: usize,

    /// Oldest first, ending today
    pub chart_data: Vec<ChartPoint>,
}

fn local_date<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Computes dashboard statistics for a set of live tasks
pub fn compute_stats<Tz: TimeZone>(tasks: &[Task], now: DateTime<Tz>) -> TaskStats {
    let tz = now.timezone();
    let today = now.date_naive();
    let now_utc = now.with_timezone(&Utc);

    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.status.is_completed()).count();
    let open = || tasks.iter().filter(|t| !t.status.is_completed());

    let high = open()
        .filter(|t| t.priority == TaskPriority::High)
        .count();

    let overdue = open()
        .filter_map(|t| t.due_date)
        .filter(|due| *due < now_utc && local_date(due, &tz) != today)
        .count();

    let due_today = open()
        .filter_map(|t| t.due_date)
        .filter(|due| local_date(due, &tz) == today)
        .count();

    let chart_data = (0..CHART_DAYS)
        .rev()
        .filter_map(|days_ago| today.checked_sub_days(Days::new(days_ago)))
        .map(|day| ChartPoint {
            date: day.format("%a").to_string(),
            count: tasks
                .iter()
                .filter(|t| t.status.is_completed() && local_date(&t.updated_at, &tz) == day)
                .count(),
        })
        .collect();

    TaskStats {
        total,
        completed,
        pending: total - completed,
        high,
        overdue,
        due_today,
        chart_data,
    }
}

#[derive(Clone)]
pub struct StatsService {
    store: SharedStore,
}

impl StatsService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Loads the user's live tasks and aggregates them relative to `now`
    pub async fn stats<Tz: TimeZone>(
        &self,
        user_id: i64,
        now: DateTime<Tz>,
    ) -> ServiceResult<TaskStats> {
        let tasks = self.store.all_tasks(user_id).await?;
        Ok(compute_stats(&tasks, now))
    }
}
