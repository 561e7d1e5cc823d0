//! Loose payload decode and canonical encode.
//!
//! Bundles arrive as untyped JSON (from a file, an HTTP body, a frontend
//! store dump). This module is the dedicated fallible decode step: each
//! field is coerced defensively — missing identity strings default to
//! empty, missing lists to empty, missing optionals to `None` — while
//! required date and datetime fields fail with a typed [`ParseError`]
//! naming the field. Statuses stay plain strings here so that an unknown
//! status surfaces as a validation error in the documented order, not as
//! a decode failure.
//!
//! The encode direction emits the canonical bundle payload shape: dates as
//! `YYYY-MM-DD`, datetimes as ISO-8601, absent optionals as explicit null.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value, json};

use crate::error::ParseError;
use crate::model::{Day, Task, TaskSession, WeekReport, WeekReportBundle};

/// ISO-8601 without timezone; the fraction is omitted when zero.
const DATETIME_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// ── Raw (structurally decoded, not yet validated) forms ──────────────────

/// A report as decoded from a loose payload: dates parsed, status still a
/// string pending validation.
#[derive(Debug, Clone)]
pub struct RawReport {
    pub id: String,
    pub week_id: String,
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    pub review_at: NaiveDateTime,
    pub status: String,
    pub prev_week_report_id: Option<String>,
    pub goals_week: Vec<String>,
    pub goals_month: Vec<String>,
    pub goals_long: Vec<String>,
    pub good_points: Vec<String>,
    pub issues: Vec<crate::model::Issue>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// A task as decoded from a loose payload, status pending validation.
#[derive(Debug, Clone)]
pub struct RawTask {
    pub id: String,
    pub week_report_id: String,
    pub day_id: String,
    pub title: String,
    pub estimated_minutes: i64,
    pub priority: Option<i64>,
    pub status: String,
    pub reason_tags: Vec<String>,
    pub note: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Structurally decoded bundle awaiting cross-entity validation.
///
/// Days and sessions need no status conversion, so they decode straight
/// into their model types.
#[derive(Debug, Clone)]
pub struct RawBundle {
    pub report: RawReport,
    pub days: Vec<Day>,
    pub tasks: Vec<RawTask>,
    pub task_sessions: Vec<TaskSession>,
    pub last_week_tasks: Vec<RawTask>,
}

// ── Field coercion helpers ───────────────────────────────────────────────

fn obj<'a>(value: &'a Value) -> Result<&'a Map<String, Value>, ParseError> {
    value.as_object().ok_or(ParseError::NotAnObject)
}

/// Identity and free-text fields tolerate absence as the empty string.
fn text(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn opt_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn int(map: &Map<String, Value>, key: &str, field: &str) -> Result<i64, ParseError> {
    let invalid = |value: String| ParseError::InvalidInt {
        field: field.to_string(),
        value,
    };
    match map.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| invalid(n.to_string())),
        // Some exporters quote their integers.
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid(s.clone())),
        Some(other) => Err(invalid(other.to_string())),
    }
}

fn opt_int(map: &Map<String, Value>, key: &str, field: &str) -> Result<Option<i64>, ParseError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        _ => int(map, key, field).map(Some),
    }
}

fn opt_bool(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

fn text_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn required_date(map: &Map<String, Value>, key: &str, field: &str) -> Result<NaiveDate, ParseError> {
    match map.get(key) {
        None | Some(Value::Null) => Err(ParseError::MissingDate {
            field: field.to_string(),
        }),
        Some(Value::String(s)) if s.is_empty() => Err(ParseError::MissingDate {
            field: field.to_string(),
        }),
        Some(Value::String(s)) => s.parse().map_err(|_| ParseError::InvalidDate {
            field: field.to_string(),
            value: s.clone(),
        }),
        Some(other) => Err(ParseError::InvalidDate {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

fn parse_datetime_literal(s: &str, field: &str) -> Result<NaiveDateTime, ParseError> {
    // Accept both the "T" separator and the space form some exporters emit.
    s.parse()
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|_| ParseError::InvalidDateTime {
            field: field.to_string(),
            value: s.to_string(),
        })
}

fn required_datetime(
    map: &Map<String, Value>,
    key: &str,
    field: &str,
) -> Result<NaiveDateTime, ParseError> {
    match map.get(key) {
        None | Some(Value::Null) => Err(ParseError::MissingDateTime {
            field: field.to_string(),
        }),
        Some(Value::String(s)) if s.is_empty() => Err(ParseError::MissingDateTime {
            field: field.to_string(),
        }),
        Some(Value::String(s)) => parse_datetime_literal(s, field),
        Some(other) => Err(ParseError::InvalidDateTime {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

fn optional_datetime(
    map: &Map<String, Value>,
    key: &str,
    field: &str,
) -> Result<Option<NaiveDateTime>, ParseError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => parse_datetime_literal(s, field).map(Some),
        Some(other) => Err(ParseError::InvalidDateTime {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

fn list<'a>(map: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match map.get(key) {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

// ── Decode ───────────────────────────────────────────────────────────────

fn decode_issue(value: &Value) -> Result<crate::model::Issue, ParseError> {
    let map = obj(value)?;
    Ok(crate::model::Issue {
        problem: text(map, "problem"),
        root_cause: text(map, "root_cause"),
        improvement: text(map, "improvement"),
        tags: text_list(map, "tags"),
    })
}

fn decode_report(map: &Map<String, Value>) -> Result<RawReport, ParseError> {
    Ok(RawReport {
        id: text(map, "id"),
        week_id: text(map, "week_id"),
        cycle_start: required_date(map, "cycle_start", "week_report.cycle_start")?,
        cycle_end: required_date(map, "cycle_end", "week_report.cycle_end")?,
        review_at: required_datetime(map, "review_at", "week_report.review_at")?,
        status: match map.get("status") {
            None | Some(Value::Null) => "draft".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        },
        prev_week_report_id: opt_text(map, "prev_week_report_id"),
        goals_week: text_list(map, "goals_week"),
        goals_month: text_list(map, "goals_month"),
        goals_long: text_list(map, "goals_long"),
        good_points: text_list(map, "good_points"),
        issues: list(map, "issues")
            .iter()
            .map(decode_issue)
            .collect::<Result<_, _>>()?,
        created_at: optional_datetime(map, "created_at", "week_report.created_at")?,
        updated_at: optional_datetime(map, "updated_at", "week_report.updated_at")?,
    })
}

fn decode_day(value: &Value, field: &str) -> Result<Day, ParseError> {
    let map = obj(value)?;
    Ok(Day {
        id: text(map, "id"),
        week_report_id: text(map, "week_report_id"),
        date: required_date(map, "date", &format!("{field}.date"))?,
        available_minutes: opt_int(map, "available_minutes", &format!("{field}.available_minutes"))?,
        planned_minutes: opt_int(map, "planned_minutes", &format!("{field}.planned_minutes"))?,
        scheduled_minutes: opt_int(map, "scheduled_minutes", &format!("{field}.scheduled_minutes"))?,
        done_count: opt_int(map, "done_count", &format!("{field}.done_count"))?,
        total_count: opt_int(map, "total_count", &format!("{field}.total_count"))?,
    })
}

fn decode_task(value: &Value, field: &str) -> Result<RawTask, ParseError> {
    let map = obj(value)?;
    Ok(RawTask {
        id: text(map, "id"),
        week_report_id: text(map, "week_report_id"),
        day_id: text(map, "day_id"),
        title: text(map, "title"),
        estimated_minutes: int(map, "estimated_minutes", &format!("{field}.estimated_minutes"))?,
        priority: opt_int(map, "priority", &format!("{field}.priority"))?,
        status: match map.get("status") {
            None | Some(Value::Null) => "todo".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        },
        reason_tags: text_list(map, "reason_tags"),
        note: opt_text(map, "note"),
        created_at: optional_datetime(map, "created_at", &format!("{field}.created_at"))?,
        updated_at: optional_datetime(map, "updated_at", &format!("{field}.updated_at"))?,
    })
}

fn decode_session(value: &Value, field: &str) -> Result<TaskSession, ParseError> {
    let map = obj(value)?;
    Ok(TaskSession {
        id: text(map, "id"),
        task_id: text(map, "task_id"),
        start_at: required_datetime(map, "start_at", &format!("{field}.start_at"))?,
        end_at: required_datetime(map, "end_at", &format!("{field}.end_at"))?,
        note: opt_text(map, "note"),
        is_completed: opt_bool(map, "is_completed"),
    })
}

/// Decode a loose bundle payload into its structural form.
///
/// Cross-entity invariants are not checked here; see
/// [`crate::validate::validate_bundle`].
pub fn decode_bundle(payload: &Value) -> Result<RawBundle, ParseError> {
    let map = obj(payload)?;
    // An absent week_report behaves like an empty one: its required date
    // fields are what actually fail.
    let empty = Map::new();
    let report_map = match map.get("week_report") {
        None | Some(Value::Null) => &empty,
        Some(value) => obj(value)?,
    };
    let report = decode_report(report_map)?;

    let days = list(map, "days")
        .iter()
        .enumerate()
        .map(|(i, v)| decode_day(v, &format!("days[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;
    let tasks = list(map, "tasks")
        .iter()
        .enumerate()
        .map(|(i, v)| decode_task(v, &format!("tasks[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;
    let task_sessions = list(map, "task_sessions")
        .iter()
        .enumerate()
        .map(|(i, v)| decode_session(v, &format!("task_sessions[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;
    let last_week_tasks = list(map, "last_week_tasks")
        .iter()
        .enumerate()
        .map(|(i, v)| decode_task(v, &format!("last_week_tasks[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        days = days.len(),
        tasks = tasks.len(),
        sessions = task_sessions.len(),
        "decoded bundle payload"
    );

    Ok(RawBundle {
        report,
        days,
        tasks,
        task_sessions,
        last_week_tasks,
    })
}

// ── Encode ───────────────────────────────────────────────────────────────

fn datetime_str(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

fn opt_datetime_str(dt: &Option<NaiveDateTime>) -> Value {
    match dt {
        Some(dt) => Value::String(datetime_str(dt)),
        None => Value::Null,
    }
}

fn task_to_value(task: &Task) -> Value {
    json!({
        "id": task.id,
        "week_report_id": task.week_report_id,
        "day_id": task.day_id,
        "title": task.title,
        "estimated_minutes": task.estimated_minutes,
        "priority": task.priority,
        "status": task.status.to_string(),
        "reason_tags": task.reason_tags,
        "note": task.note,
        "created_at": opt_datetime_str(&task.created_at),
        "updated_at": opt_datetime_str(&task.updated_at),
    })
}

/// Encode a bundle as its canonical payload shape.
pub fn bundle_to_value(bundle: &WeekReportBundle) -> Value {
    let report: &WeekReport = &bundle.report;
    json!({
        "week_report": {
            "id": report.id,
            "week_id": report.week_id,
            "cycle_start": report.cycle_start.to_string(),
            "cycle_end": report.cycle_end.to_string(),
            "review_at": datetime_str(&report.review_at),
            "status": report.status.to_string(),
            "prev_week_report_id": report.prev_week_report_id,
            "goals_week": report.goals_week,
            "goals_month": report.goals_month,
            "goals_long": report.goals_long,
            "good_points": report.good_points,
            "issues": report.issues.iter().map(|issue| json!({
                "problem": issue.problem,
                "root_cause": issue.root_cause,
                "improvement": issue.improvement,
                "tags": issue.tags,
            })).collect::<Vec<_>>(),
            "created_at": opt_datetime_str(&report.created_at),
            "updated_at": opt_datetime_str(&report.updated_at),
        },
        "days": bundle.days.iter().map(|day| json!({
            "id": day.id,
            "week_report_id": day.week_report_id,
            "date": day.date.to_string(),
            "available_minutes": day.available_minutes,
            "planned_minutes": day.planned_minutes,
            "scheduled_minutes": day.scheduled_minutes,
            "done_count": day.done_count,
            "total_count": day.total_count,
        })).collect::<Vec<_>>(),
        "tasks": bundle.tasks.iter().map(task_to_value).collect::<Vec<_>>(),
        "task_sessions": bundle.task_sessions.iter().map(|session| json!({
            "id": session.id,
            "task_id": session.task_id,
            "start_at": datetime_str(&session.start_at),
            "end_at": datetime_str(&session.end_at),
            "note": session.note,
            "is_completed": session.is_completed,
        })).collect::<Vec<_>>(),
        "last_week_tasks": bundle.last_week_tasks.iter().map(task_to_value).collect::<Vec<_>>(),
    })
}

/// Pretty-printed text form of a bundle payload.
pub fn serialize_bundle(bundle: &WeekReportBundle) -> String {
    // A Value built from owned fields always pretty-prints.
    serde_json::to_string_pretty(&bundle_to_value(bundle)).expect("bundle payload is valid JSON")
}

/// Parse text into a loose payload value.
pub fn deserialize_payload(text: &str) -> Result<Value, ParseError> {
    serde_json::from_str(text).map_err(|e| ParseError::InvalidJson {
        message: e.to_string(),
    })
}
