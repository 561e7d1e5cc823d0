//! Versioned archival projection of a finalized bundle.
//!
//! A snapshot is denormalized and read-only: day entries embed their own
//! task lists (re-grouped by `day_id`, independently of the metrics
//! grouping), and the export paths are recorded verbatim as given by the
//! caller. The builder assumes day metrics are already current — it never
//! recomputes them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Issue, Task, TaskSession, WeekReportBundle};

/// Bump when the snapshot payload shape changes.
pub const SCHEMA_VERSION: &str = "1.0";

/// Flattened task as it appears inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub estimated_minutes: i64,
    pub status: crate::model::TaskStatus,
    pub day_id: String,
    pub priority: Option<i64>,
    pub reason_tags: Vec<String>,
    pub note: Option<String>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        TaskView {
            id: task.id.clone(),
            title: task.title.clone(),
            estimated_minutes: task.estimated_minutes,
            status: task.status,
            day_id: task.day_id.clone(),
            priority: task.priority,
            reason_tags: task.reason_tags.clone(),
            note: task.note.clone(),
        }
    }
}

/// Flattened session as it appears inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: String,
    pub task_id: String,
    pub start_at: chrono::NaiveDateTime,
    pub end_at: chrono::NaiveDateTime,
    pub note: Option<String>,
    pub is_completed: Option<bool>,
}

impl From<&TaskSession> for SessionView {
    fn from(session: &TaskSession) -> Self {
        SessionView {
            id: session.id.clone(),
            task_id: session.task_id.clone(),
            start_at: session.start_at,
            end_at: session.end_at,
            note: session.note.clone(),
            is_completed: session.is_completed,
        }
    }
}

/// A day entry with its embedded tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayView {
    pub id: String,
    pub date: chrono::NaiveDate,
    pub planned_minutes: Option<i64>,
    pub scheduled_minutes: Option<i64>,
    pub done_count: Option<i64>,
    pub total_count: Option<i64>,
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleView {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalsView {
    pub week: Vec<String>,
    pub month: Vec<String>,
    pub long: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewView {
    pub good: Vec<String>,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportsView {
    pub pdf_path: String,
    pub json_path: String,
}

/// Immutable archival projection of one finalized week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: String,
    pub week_id: String,
    pub cycle: CycleView,
    pub review_at: chrono::NaiveDateTime,
    pub goals: GoalsView,
    pub review: ReviewView,
    pub last_week_tasks: Vec<TaskView>,
    pub next_week_days: Vec<DayView>,
    pub task_sessions: Vec<SessionView>,
    pub exports: ExportsView,
}

/// Project a metrics-updated bundle into its archival snapshot.
///
/// The export paths are a record of where the caller intends to write, not
/// a filesystem guarantee; nothing here checks they exist. Tasks with an
/// empty `day_id` appear in no day's task list.
pub fn build_snapshot(bundle: &WeekReportBundle, pdf_path: &str, json_path: &str) -> Snapshot {
    let report = &bundle.report;

    let mut tasks_by_day: HashMap<&str, Vec<TaskView>> = HashMap::new();
    for task in &bundle.tasks {
        tasks_by_day.entry(task.day_id.as_str()).or_default().push(task.into());
    }

    let next_week_days = bundle
        .days
        .iter()
        .map(|day| DayView {
            id: day.id.clone(),
            date: day.date,
            planned_minutes: day.planned_minutes,
            scheduled_minutes: day.scheduled_minutes,
            done_count: day.done_count,
            total_count: day.total_count,
            tasks: tasks_by_day.remove(day.id.as_str()).unwrap_or_default(),
        })
        .collect();

    tracing::debug!(week_id = %report.week_id, "built snapshot");

    Snapshot {
        schema_version: SCHEMA_VERSION.to_string(),
        week_id: report.week_id.clone(),
        cycle: CycleView {
            start: report.cycle_start,
            end: report.cycle_end,
        },
        review_at: report.review_at,
        goals: GoalsView {
            week: report.goals_week.clone(),
            month: report.goals_month.clone(),
            long: report.goals_long.clone(),
        },
        review: ReviewView {
            good: report.good_points.clone(),
            issues: report.issues.clone(),
        },
        last_week_tasks: bundle.last_week_tasks.iter().map(TaskView::from).collect(),
        next_week_days,
        task_sessions: bundle.task_sessions.iter().map(SessionView::from).collect(),
        exports: ExportsView {
            pdf_path: pdf_path.to_string(),
            json_path: json_path.to_string(),
        },
    }
}

/// Pretty-printed JSON text of a snapshot.
pub fn snapshot_json(snapshot: &Snapshot) -> String {
    serde_json::to_string_pretty(snapshot).expect("snapshot serializes to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;
    use crate::workflow::{finalize_week_report, init_week_report};
    use chrono::NaiveDateTime;

    fn populated_bundle() -> WeekReportBundle {
        let review_at: NaiveDateTime = "2026-01-16T18:00:00".parse().unwrap();
        let now: NaiveDateTime = "2026-01-16T18:05:00".parse().unwrap();
        let mut bundle = init_week_report(review_at, None, now);
        let day_id = bundle.days[0].id.clone();
        bundle.tasks.push(Task {
            id: "t1".into(),
            week_report_id: bundle.report.id.clone(),
            day_id,
            title: "refactor decoder".into(),
            estimated_minutes: 90,
            priority: Some(1),
            status: TaskStatus::Done,
            reason_tags: vec![],
            note: None,
            created_at: None,
            updated_at: None,
        });
        bundle.tasks.push(Task {
            id: "t2".into(),
            week_report_id: bundle.report.id.clone(),
            day_id: String::new(),
            title: "someday item".into(),
            estimated_minutes: 15,
            priority: None,
            status: TaskStatus::Todo,
            reason_tags: vec![],
            note: None,
            created_at: None,
            updated_at: None,
        });
        bundle.task_sessions.push(TaskSession {
            id: "s1".into(),
            task_id: "t1".into(),
            start_at: "2026-01-17T09:00:00".parse().unwrap(),
            end_at: "2026-01-17T10:30:00".parse().unwrap(),
            note: None,
            is_completed: Some(true),
        });
        finalize_week_report(&bundle, now)
    }

    #[test]
    fn snapshot_carries_the_schema_version() {
        let snapshot = build_snapshot(&populated_bundle(), "out/a.pdf", "out/a.json");
        assert_eq!(snapshot.schema_version, SCHEMA_VERSION);
        assert_eq!(snapshot.schema_version, "1.0");
    }

    #[test]
    fn days_embed_their_regrouped_tasks() {
        let snapshot = build_snapshot(&populated_bundle(), "out/a.pdf", "out/a.json");
        assert_eq!(snapshot.next_week_days.len(), 7);
        assert_eq!(snapshot.next_week_days[0].tasks.len(), 1);
        assert_eq!(snapshot.next_week_days[0].tasks[0].id, "t1");
        for day in &snapshot.next_week_days[1..] {
            assert!(day.tasks.is_empty());
        }
    }

    #[test]
    fn unassigned_tasks_appear_in_no_day() {
        let snapshot = build_snapshot(&populated_bundle(), "out/a.pdf", "out/a.json");
        let embedded: Vec<&str> = snapshot
            .next_week_days
            .iter()
            .flat_map(|day| day.tasks.iter().map(|task| task.id.as_str()))
            .collect();
        assert!(!embedded.contains(&"t2"));
    }

    #[test]
    fn export_paths_are_recorded_verbatim() {
        let snapshot = build_snapshot(&populated_bundle(), "/nonexistent/a.pdf", "rel/b.json");
        assert_eq!(snapshot.exports.pdf_path, "/nonexistent/a.pdf");
        assert_eq!(snapshot.exports.json_path, "rel/b.json");
    }

    #[test]
    fn snapshot_json_has_the_documented_top_level_keys() {
        let snapshot = build_snapshot(&populated_bundle(), "a.pdf", "a.json");
        let value: serde_json::Value = serde_json::from_str(&snapshot_json(&snapshot)).unwrap();
        for key in [
            "schema_version",
            "week_id",
            "cycle",
            "review_at",
            "goals",
            "review",
            "last_week_tasks",
            "next_week_days",
            "task_sessions",
            "exports",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["cycle"]["start"], "2026-01-17");
        assert_eq!(value["goals"]["week"], serde_json::json!([]));
        assert_eq!(value["task_sessions"][0]["start_at"], "2026-01-17T09:00:00");
    }
}
