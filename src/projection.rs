// src/projection.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::Task;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// A task as returned by the list endpoint: the stored fields with
/// `progressPercentage` recomputed, plus `totalDays` and `isCompleted`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub progress_percentage: Option<f64>,
    pub total_days: Option<i64>,
    pub is_completed: bool,
}

/// Derives the scheduling fields of `task` as of `now`.
///
/// `daysRemaining` is measured over the same interval as `totalDays`, so a
/// task that is still open always reports 0% progress. Completion is read
/// from the stored `progressPercentage`, never from the recomputed one.
pub fn project(task: Task, now: DateTime<Utc>) -> TaskView {
    let deadline = task.deadline().and_then(|deadline| deadline.instant());
    let total_days = deadline.map(|deadline| days_until(deadline, now));

    let progress_percentage = match (deadline, total_days) {
        (Some(deadline), Some(total_days)) if total_days > 0 => {
            let days_remaining = days_until(deadline, now);
            let elapsed = (total_days - days_remaining) as f64;
            Some(f64::min(100.0, elapsed / total_days as f64 * 100.0))
        }
        _ => None,
    };

    let is_completed = task.progress_percentage() == Some(100.0);

    let mut fields = task.into_json();
    fields.remove("progressPercentage");
    fields.remove("totalDays");
    fields.remove("isCompleted");

    TaskView {
        fields,
        progress_percentage,
        total_days,
        is_completed,
    }
}

pub fn project_all(tasks: Vec<Task>, now: DateTime<Utc>) -> Vec<TaskView> {
    tasks.into_iter().map(|task| project(task, now)).collect()
}

fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (deadline - now).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).ceil() as i64
}
