//! Cycle lifecycle: initializing a fresh week and finalizing a populated one.
//!
//! The next cycle starts the calendar day after the review and spans seven
//! consecutive days. Goals carry over verbatim from the previous cycle;
//! good points and issues are entered fresh each week. `now` is injected
//! by the caller so the core never reads the environment.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::metrics::recompute_metrics;
use crate::model::{Day, ReportStatus, WeekReport, WeekReportBundle};

/// Number of days in one reporting cycle.
pub const CYCLE_DAYS: u64 = 7;

/// ISO calendar week id for the given date, e.g. `2026-W03`.
///
/// The ISO year can differ from the calendar year near year boundaries.
pub fn week_id_from_date(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

fn fresh_report_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("wr_{}", &hex[..8])
}

/// Create an empty bundle for the cycle following `review_at`.
///
/// Produces the report plus exactly seven [`Day`]s with deterministic ids
/// (`<week_id>-<ISO date>`), computed metrics zeroed and
/// `available_minutes` unset. No tasks or sessions are populated; that is
/// the caller's job. If `prev` is given, the three goal lists are copied
/// from it and `prev_week_report_id` links back.
pub fn init_week_report(
    review_at: NaiveDateTime,
    prev: Option<&WeekReportBundle>,
    now: NaiveDateTime,
) -> WeekReportBundle {
    let cycle_start = review_at.date() + Days::new(1);
    let cycle_end = cycle_start + Days::new(CYCLE_DAYS - 1);
    let week_id = week_id_from_date(cycle_start);
    let report_id = fresh_report_id();

    tracing::info!(%week_id, %cycle_start, %cycle_end, "initializing week report");

    let report = WeekReport {
        id: report_id.clone(),
        week_id: week_id.clone(),
        cycle_start,
        cycle_end,
        review_at,
        status: ReportStatus::Draft,
        prev_week_report_id: prev.map(|p| p.report.id.clone()),
        goals_week: prev.map(|p| p.report.goals_week.clone()).unwrap_or_default(),
        goals_month: prev.map(|p| p.report.goals_month.clone()).unwrap_or_default(),
        goals_long: prev.map(|p| p.report.goals_long.clone()).unwrap_or_default(),
        good_points: Vec::new(),
        issues: Vec::new(),
        created_at: Some(now),
        updated_at: Some(now),
    };

    let days = (0..CYCLE_DAYS)
        .map(|offset| {
            let date = cycle_start + Days::new(offset);
            Day {
                id: format!("{week_id}-{date}"),
                week_report_id: report_id.clone(),
                date,
                available_minutes: None,
                planned_minutes: Some(0),
                scheduled_minutes: Some(0),
                done_count: Some(0),
                total_count: Some(0),
            }
        })
        .collect();

    WeekReportBundle {
        report,
        days,
        tasks: Vec::new(),
        task_sessions: Vec::new(),
        last_week_tasks: Vec::new(),
    }
}

/// Freeze a populated bundle: recompute day metrics, flip the report to
/// `final` and stamp `updated_at`.
///
/// Pure replace; the input bundle is left untouched. The caller builds the
/// snapshot from the result.
pub fn finalize_week_report(bundle: &WeekReportBundle, now: NaiveDateTime) -> WeekReportBundle {
    let updated = recompute_metrics(bundle);
    let report = WeekReport {
        status: ReportStatus::Final,
        updated_at: Some(now),
        ..updated.report
    };
    tracing::info!(week_id = %report.week_id, "finalized week report");
    WeekReportBundle { report, ..updated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Issue, TaskStatus};

    fn now() -> NaiveDateTime {
        "2026-01-16T18:05:00".parse().unwrap()
    }

    #[test]
    fn cycle_starts_the_day_after_the_review() {
        let review_at: NaiveDateTime = "2026-01-16T18:00:00".parse().unwrap();
        let bundle = init_week_report(review_at, None, now());

        assert_eq!(bundle.report.cycle_start.to_string(), "2026-01-17");
        assert_eq!(bundle.report.cycle_end.to_string(), "2026-01-23");
        assert_eq!(bundle.report.week_id, "2026-W03");
        assert_eq!(
            bundle.report.cycle_end - bundle.report.cycle_start,
            chrono::Duration::days(6)
        );
    }

    #[test]
    fn seven_consecutive_days_with_deterministic_ids() {
        let review_at: NaiveDateTime = "2026-01-16T18:00:00".parse().unwrap();
        let bundle = init_week_report(review_at, None, now());

        assert_eq!(bundle.days.len(), 7);
        for (offset, day) in bundle.days.iter().enumerate() {
            let expected = bundle.report.cycle_start + Days::new(offset as u64);
            assert_eq!(day.date, expected);
            assert_eq!(day.id, format!("2026-W03-{expected}"));
            assert_eq!(day.week_report_id, bundle.report.id);
            assert_eq!(day.planned_minutes, Some(0));
            assert_eq!(day.scheduled_minutes, Some(0));
            assert_eq!(day.done_count, Some(0));
            assert_eq!(day.total_count, Some(0));
            assert_eq!(day.available_minutes, None);
        }
    }

    #[test]
    fn fresh_report_ids_are_unique_and_prefixed() {
        let review_at: NaiveDateTime = "2026-01-16T18:00:00".parse().unwrap();
        let a = init_week_report(review_at, None, now());
        let b = init_week_report(review_at, None, now());
        assert!(a.report.id.starts_with("wr_"));
        assert_eq!(a.report.id.len(), "wr_".len() + 8);
        assert_ne!(a.report.id, b.report.id);
    }

    #[test]
    fn week_id_follows_the_iso_calendar_across_year_boundaries() {
        // 2027-01-01 is a Friday, part of ISO week 2026-W53.
        let date: NaiveDate = "2027-01-01".parse().unwrap();
        assert_eq!(week_id_from_date(date), "2026-W53");
        // 2024-12-30 is a Monday, already in 2025-W01.
        let date: NaiveDate = "2024-12-30".parse().unwrap();
        assert_eq!(week_id_from_date(date), "2025-W01");
    }

    #[test]
    fn goals_carry_over_but_review_notes_start_empty() {
        let review_at: NaiveDateTime = "2026-01-09T18:00:00".parse().unwrap();
        let mut prev = init_week_report(review_at, None, now());
        prev.report.goals_week = vec!["finish parser".to_string()];
        prev.report.goals_month = vec!["ship v1".to_string()];
        prev.report.goals_long = vec!["learn piano".to_string()];
        prev.report.good_points = vec!["slept well".to_string()];
        prev.report.issues = vec![Issue {
            problem: "p".into(),
            root_cause: "r".into(),
            improvement: "i".into(),
            tags: vec![],
        }];

        let next_review: NaiveDateTime = "2026-01-16T18:00:00".parse().unwrap();
        let next = init_week_report(next_review, Some(&prev), now());

        assert_eq!(next.report.goals_week, prev.report.goals_week);
        assert_eq!(next.report.goals_month, prev.report.goals_month);
        assert_eq!(next.report.goals_long, prev.report.goals_long);
        assert_eq!(next.report.prev_week_report_id, Some(prev.report.id.clone()));
        assert!(next.report.good_points.is_empty());
        assert!(next.report.issues.is_empty());
        assert!(next.tasks.is_empty());
        assert!(next.task_sessions.is_empty());
        assert!(next.last_week_tasks.is_empty());
    }

    #[test]
    fn finalize_flips_status_and_stamps_updated_at() {
        let review_at: NaiveDateTime = "2026-01-16T18:00:00".parse().unwrap();
        let mut bundle = init_week_report(review_at, None, now());
        let day_id = bundle.days[0].id.clone();
        bundle.tasks.push(crate::model::Task {
            id: "t1".into(),
            week_report_id: bundle.report.id.clone(),
            day_id,
            title: "write report".into(),
            estimated_minutes: 90,
            priority: None,
            status: TaskStatus::Done,
            reason_tags: vec![],
            note: None,
            created_at: None,
            updated_at: None,
        });

        let finalize_at: NaiveDateTime = "2026-01-23T18:00:00".parse().unwrap();
        let finalized = finalize_week_report(&bundle, finalize_at);

        assert_eq!(finalized.report.status, ReportStatus::Final);
        assert_eq!(finalized.report.updated_at, Some(finalize_at));
        assert_eq!(finalized.days[0].planned_minutes, Some(90));
        assert_eq!(finalized.days[0].done_count, Some(1));
        // The input bundle is untouched.
        assert_eq!(bundle.report.status, ReportStatus::Draft);
    }
}
