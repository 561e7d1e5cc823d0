//! Entities of the weekly review cycle.
//!
//! All types here are immutable value records: an "update" is always the
//! construction of a new value (see `workflow::finalize_week_report` or
//! `metrics::update_day_metrics`), never an in-place field write. That is
//! what makes concurrent finalize operations on different bundles safe by
//! construction.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ── Status enums ──────────────────────────────────────────────────────────

/// Lifecycle state of a week report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    Final,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Draft => f.write_str("draft"),
            ReportStatus::Final => f.write_str("final"),
        }
    }
}

impl FromStr for ReportStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ReportStatus::Draft),
            "final" => Ok(ReportStatus::Final),
            other => Err(ValidationError::InvalidReportStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// State of a single task within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    Done,
    CarriedOver,
    Dropped,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Todo => f.write_str("todo"),
            TaskStatus::Done => f.write_str("done"),
            TaskStatus::CarriedOver => f.write_str("carried_over"),
            TaskStatus::Dropped => f.write_str("dropped"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "done" => Ok(TaskStatus::Done),
            "carried_over" => Ok(TaskStatus::CarriedOver),
            "dropped" => Ok(TaskStatus::Dropped),
            other => Err(ValidationError::InvalidTaskStatus {
                status: other.to_string(),
            }),
        }
    }
}

// ── Entities ──────────────────────────────────────────────────────────────

/// A problem noted during the review, with its diagnosis and remedy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub problem: String,
    pub root_cause: String,
    pub improvement: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One weekly report: identity, cycle window, goals and review notes.
///
/// Invariant (enforced by validation): `cycle_end >= cycle_start`; the
/// initializer always produces `cycle_end == cycle_start + 6 days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekReport {
    pub id: String,
    /// ISO calendar week of `cycle_start`, e.g. `2026-W03`.
    pub week_id: String,
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    /// When this cycle was planned.
    pub review_at: NaiveDateTime,
    pub status: ReportStatus,
    pub prev_week_report_id: Option<String>,
    pub goals_week: Vec<String>,
    pub goals_month: Vec<String>,
    pub goals_long: Vec<String>,
    pub good_points: Vec<String>,
    pub issues: Vec<Issue>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// One of the seven calendar dates spanning a report's cycle.
///
/// `available_minutes` is externally supplied capacity; the remaining
/// aggregate fields are computed by the metrics engine and zeroed (never
/// left unset) for days without tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    /// Deterministic id: `<week_id>-<ISO date>`.
    pub id: String,
    pub week_report_id: String,
    pub date: NaiveDate,
    pub available_minutes: Option<i64>,
    pub planned_minutes: Option<i64>,
    pub scheduled_minutes: Option<i64>,
    pub done_count: Option<i64>,
    pub total_count: Option<i64>,
}

/// A unit of planned work, optionally assigned to one day of the cycle.
///
/// An empty `day_id` marks a task not yet placed on a day; such tasks are
/// excluded from every per-day aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub week_report_id: String,
    pub day_id: String,
    pub title: String,
    pub estimated_minutes: i64,
    pub priority: Option<i64>,
    pub status: TaskStatus,
    #[serde(default)]
    pub reason_tags: Vec<String>,
    pub note: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// A concrete time block spent on one task. Several sessions may reference
/// the same task; their durations sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSession {
    pub id: String,
    pub task_id: String,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub note: Option<String>,
    pub is_completed: Option<bool>,
}

/// Aggregate root: one report plus its days, tasks, sessions and the
/// previous cycle's tasks carried in for reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekReportBundle {
    pub report: WeekReport,
    pub days: Vec<Day>,
    pub tasks: Vec<Task>,
    pub task_sessions: Vec<TaskSession>,
    /// Last cycle's tasks. Their `day_id`s reference the previous cycle's
    /// days and are deliberately not checked against this bundle.
    pub last_week_tasks: Vec<Task>,
}
