//! Cross-entity validation: structural `RawBundle` → typed [`WeekReportBundle`].
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. report status known, `cycle_end >= cycle_start`, `week_id` non-empty
//! 2. every goal string and every issue field non-empty after trimming
//! 3. current tasks: title, status, positive estimate, day linkage
//! 4. last-week tasks: title, status, positive estimate (no day linkage —
//!    their days belong to the previous cycle)
//! 5. sessions: task linkage against current tasks, `end_at > start_at`
//!
//! A failed build yields no bundle.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{SennightError, ValidationError};
use crate::model::{Task, TaskStatus, WeekReport, WeekReportBundle};
use crate::payload::{self, RawBundle, RawTask};

fn require_text(value: &str, label: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::RequiredText {
            label: label.to_string(),
        });
    }
    Ok(())
}

fn validate_task(raw: &RawTask, day_ids: Option<&HashSet<&str>>) -> Result<Task, ValidationError> {
    require_text(&raw.title, "task.title")?;
    let status: TaskStatus = raw.status.parse()?;
    if raw.estimated_minutes <= 0 {
        return Err(ValidationError::NonPositiveEstimate {
            title: raw.title.clone(),
        });
    }
    if let Some(day_ids) = day_ids {
        if !raw.day_id.is_empty() && !day_ids.contains(raw.day_id.as_str()) {
            return Err(ValidationError::UnknownDay {
                day_id: raw.day_id.clone(),
            });
        }
    }
    Ok(Task {
        id: raw.id.clone(),
        week_report_id: raw.week_report_id.clone(),
        day_id: raw.day_id.clone(),
        title: raw.title.clone(),
        estimated_minutes: raw.estimated_minutes,
        priority: raw.priority,
        status,
        reason_tags: raw.reason_tags.clone(),
        note: raw.note.clone(),
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    })
}

/// Enforce the cross-entity invariants and produce the typed bundle.
pub fn validate_bundle(raw: RawBundle) -> Result<WeekReportBundle, ValidationError> {
    let status = raw.report.status.parse()?;
    if raw.report.cycle_end < raw.report.cycle_start {
        return Err(ValidationError::CycleOrder);
    }
    require_text(&raw.report.week_id, "week_id")?;

    for goal_group in [
        &raw.report.goals_week,
        &raw.report.goals_month,
        &raw.report.goals_long,
    ] {
        for goal in goal_group {
            require_text(goal, "goal")?;
        }
    }
    for issue in &raw.report.issues {
        require_text(&issue.problem, "issue.problem")?;
        require_text(&issue.root_cause, "issue.root_cause")?;
        require_text(&issue.improvement, "issue.improvement")?;
    }

    let day_ids: HashSet<&str> = raw.days.iter().map(|day| day.id.as_str()).collect();
    let tasks = raw
        .tasks
        .iter()
        .map(|task| validate_task(task, Some(&day_ids)))
        .collect::<Result<Vec<_>, _>>()?;
    let last_week_tasks = raw
        .last_week_tasks
        .iter()
        .map(|task| validate_task(task, None))
        .collect::<Result<Vec<_>, _>>()?;

    let task_ids: HashSet<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
    for session in &raw.task_sessions {
        if !task_ids.contains(session.task_id.as_str()) {
            return Err(ValidationError::UnknownTask {
                task_id: session.task_id.clone(),
            });
        }
        if session.end_at <= session.start_at {
            return Err(ValidationError::SessionOrder);
        }
    }

    let report = WeekReport {
        id: raw.report.id,
        week_id: raw.report.week_id,
        cycle_start: raw.report.cycle_start,
        cycle_end: raw.report.cycle_end,
        review_at: raw.report.review_at,
        status,
        prev_week_report_id: raw.report.prev_week_report_id,
        goals_week: raw.report.goals_week,
        goals_month: raw.report.goals_month,
        goals_long: raw.report.goals_long,
        good_points: raw.report.good_points,
        issues: raw.report.issues,
        created_at: raw.report.created_at,
        updated_at: raw.report.updated_at,
    };

    Ok(WeekReportBundle {
        report,
        days: raw.days,
        tasks,
        task_sessions: raw.task_sessions,
        last_week_tasks,
    })
}

/// Decode and validate a loose payload in one step.
///
/// This is the single entry point adapters call; parse errors surface
/// before any cross-entity check runs.
pub fn build_bundle(payload: &Value) -> Result<WeekReportBundle, SennightError> {
    let raw = payload::decode_bundle(payload)?;
    let bundle = validate_bundle(raw)?;
    tracing::debug!(week_id = %bundle.report.week_id, "bundle validated");
    Ok(bundle)
}
