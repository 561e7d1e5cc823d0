//! Per-day planning and scheduling aggregates.
//!
//! A pure function of (days, tasks, sessions): grouping tasks by their
//! `day_id` and summing estimates and session durations. Tasks with an
//! empty or unmatched `day_id` belong to no day and are excluded from
//! every aggregate. Re-running the computation on already-updated days
//! yields identical output.

use std::collections::HashMap;

use crate::model::{Day, Task, TaskSession, TaskStatus, WeekReportBundle};

/// Recompute the derived fields of every day.
///
/// Returns a new sequence matching the input order and count;
/// `available_minutes` passes through unchanged. Days with no tasks get
/// zeroed aggregates, never `None`. Session time is converted with
/// truncating division: an 89-second session contributes 1 minute.
pub fn update_day_metrics(days: &[Day], tasks: &[Task], task_sessions: &[TaskSession]) -> Vec<Day> {
    let mut tasks_by_day: HashMap<&str, Vec<&Task>> = HashMap::new();
    for task in tasks {
        tasks_by_day.entry(task.day_id.as_str()).or_default().push(task);
    }

    let mut sessions_by_task: HashMap<&str, Vec<&TaskSession>> = HashMap::new();
    for session in task_sessions {
        sessions_by_task
            .entry(session.task_id.as_str())
            .or_default()
            .push(session);
    }

    let empty: Vec<&Task> = Vec::new();
    days.iter()
        .map(|day| {
            let day_tasks = tasks_by_day.get(day.id.as_str()).unwrap_or(&empty);
            let planned_minutes: i64 = day_tasks.iter().map(|task| task.estimated_minutes).sum();
            let total_count = day_tasks.len() as i64;
            let done_count = day_tasks
                .iter()
                .filter(|task| task.status == TaskStatus::Done)
                .count() as i64;

            let mut scheduled_minutes: i64 = 0;
            for task in day_tasks {
                if let Some(sessions) = sessions_by_task.get(task.id.as_str()) {
                    for session in sessions {
                        let elapsed = session.end_at - session.start_at;
                        scheduled_minutes += elapsed.num_seconds() / 60;
                    }
                }
            }

            Day {
                id: day.id.clone(),
                week_report_id: day.week_report_id.clone(),
                date: day.date,
                available_minutes: day.available_minutes,
                planned_minutes: Some(planned_minutes),
                scheduled_minutes: Some(scheduled_minutes),
                done_count: Some(done_count),
                total_count: Some(total_count),
            }
        })
        .collect()
}

/// Bundle-level convenience: same bundle with its day aggregates refreshed.
pub fn recompute_metrics(bundle: &WeekReportBundle) -> WeekReportBundle {
    WeekReportBundle {
        report: bundle.report.clone(),
        days: update_day_metrics(&bundle.days, &bundle.tasks, &bundle.task_sessions),
        tasks: bundle.tasks.clone(),
        task_sessions: bundle.task_sessions.clone(),
        last_week_tasks: bundle.last_week_tasks.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(id: &str, date: &str) -> Day {
        Day {
            id: id.to_string(),
            week_report_id: "wr_1".to_string(),
            date: date.parse::<NaiveDate>().unwrap(),
            available_minutes: None,
            planned_minutes: None,
            scheduled_minutes: None,
            done_count: None,
            total_count: None,
        }
    }

    fn task(id: &str, day_id: &str, estimate: i64, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            week_report_id: "wr_1".to_string(),
            day_id: day_id.to_string(),
            title: format!("task {id}"),
            estimated_minutes: estimate,
            priority: None,
            status,
            reason_tags: Vec::new(),
            note: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn session(task_id: &str, start: &str, end: &str) -> TaskSession {
        TaskSession {
            id: format!("s-{task_id}-{start}"),
            task_id: task_id.to_string(),
            start_at: start.parse::<NaiveDateTime>().unwrap(),
            end_at: end.parse::<NaiveDateTime>().unwrap(),
            note: None,
            is_completed: None,
        }
    }

    #[test]
    fn aggregates_one_day_with_one_done_task() {
        let days = vec![day("d1", "2026-01-17")];
        let tasks = vec![task("t1", "d1", 90, TaskStatus::Done)];
        let sessions = vec![session("t1", "2026-01-17T09:00:00", "2026-01-17T10:30:00")];

        let updated = update_day_metrics(&days, &tasks, &sessions);
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].planned_minutes, Some(90));
        assert_eq!(updated[0].scheduled_minutes, Some(90));
        assert_eq!(updated[0].done_count, Some(1));
        assert_eq!(updated[0].total_count, Some(1));
    }

    #[test]
    fn empty_days_get_zeroes_not_none() {
        let days = vec![day("d1", "2026-01-17"), day("d2", "2026-01-18")];
        let tasks = vec![task("t1", "d1", 45, TaskStatus::Todo)];
        let updated = update_day_metrics(&days, &tasks, &[]);

        assert_eq!(updated[1].planned_minutes, Some(0));
        assert_eq!(updated[1].scheduled_minutes, Some(0));
        assert_eq!(updated[1].done_count, Some(0));
        assert_eq!(updated[1].total_count, Some(0));
    }

    #[test]
    fn unassigned_tasks_count_toward_no_day() {
        let days = vec![day("d1", "2026-01-17")];
        let tasks = vec![
            task("t1", "d1", 30, TaskStatus::Todo),
            task("t2", "", 120, TaskStatus::Done),
        ];
        let updated = update_day_metrics(&days, &tasks, &[]);
        assert_eq!(updated[0].planned_minutes, Some(30));
        assert_eq!(updated[0].total_count, Some(1));
        assert_eq!(updated[0].done_count, Some(0));
    }

    #[test]
    fn carried_over_and_dropped_are_not_done() {
        let days = vec![day("d1", "2026-01-17")];
        let tasks = vec![
            task("t1", "d1", 30, TaskStatus::CarriedOver),
            task("t2", "d1", 30, TaskStatus::Dropped),
            task("t3", "d1", 30, TaskStatus::Done),
        ];
        let updated = update_day_metrics(&days, &tasks, &[]);
        assert_eq!(updated[0].done_count, Some(1));
        assert_eq!(updated[0].total_count, Some(3));
    }

    #[test]
    fn session_minutes_truncate() {
        let days = vec![day("d1", "2026-01-17")];
        let tasks = vec![task("t1", "d1", 10, TaskStatus::Todo)];
        // 89 seconds → 1 minute, not 2.
        let sessions = vec![session("t1", "2026-01-17T09:00:00", "2026-01-17T09:01:29")];
        let updated = update_day_metrics(&days, &tasks, &sessions);
        assert_eq!(updated[0].scheduled_minutes, Some(1));
    }

    #[test]
    fn multiple_sessions_on_one_task_sum() {
        let days = vec![day("d1", "2026-01-17")];
        let tasks = vec![task("t1", "d1", 60, TaskStatus::Todo)];
        let sessions = vec![
            session("t1", "2026-01-17T09:00:00", "2026-01-17T09:25:00"),
            session("t1", "2026-01-17T14:00:00", "2026-01-17T14:35:00"),
        ];
        let updated = update_day_metrics(&days, &tasks, &sessions);
        assert_eq!(updated[0].scheduled_minutes, Some(60));
    }

    #[test]
    fn available_minutes_pass_through() {
        let mut d = day("d1", "2026-01-17");
        d.available_minutes = Some(300);
        let updated = update_day_metrics(&[d], &[], &[]);
        assert_eq!(updated[0].available_minutes, Some(300));
    }

    #[test]
    fn bundle_recompute_touches_only_the_days() {
        let review_at = "2026-01-16T18:00:00".parse().unwrap();
        let now = "2026-01-16T18:05:00".parse().unwrap();
        let mut bundle = crate::workflow::init_week_report(review_at, None, now);
        let day_id = bundle.days[0].id.clone();
        bundle.tasks.push(task("t1", &day_id, 30, TaskStatus::Done));

        let updated = recompute_metrics(&bundle);
        assert_eq!(updated.report, bundle.report);
        assert_eq!(updated.tasks, bundle.tasks);
        assert_eq!(updated.days[0].planned_minutes, Some(30));
        assert_eq!(updated.days[0].done_count, Some(1));
        // Input bundle's days are untouched.
        assert_eq!(bundle.days[0].planned_minutes, Some(0));
    }

    #[test]
    fn recompute_is_idempotent() {
        let days = vec![day("d1", "2026-01-17"), day("d2", "2026-01-18")];
        let tasks = vec![
            task("t1", "d1", 30, TaskStatus::Done),
            task("t2", "d2", 45, TaskStatus::Todo),
        ];
        let sessions = vec![session("t1", "2026-01-17T09:00:00", "2026-01-17T09:31:00")];

        let once = update_day_metrics(&days, &tasks, &sessions);
        let twice = update_day_metrics(&once, &tasks, &sessions);
        assert_eq!(once, twice);
    }
}
