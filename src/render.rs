//! Document rendering seam.
//!
//! The core never links a page-layout engine; finalize takes any
//! [`DocumentRenderer`] and invokes it only when a document was actually
//! requested. The shipped [`MarkdownRenderer`] writes the weekly report as
//! a Markdown document with the same sections the archival record covers:
//! header, goals, last week's tasks, the day table, next week's tasks,
//! review notes and the session log.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::Days;

use crate::error::RenderError;
use crate::model::{Day, Task, TaskSession, WeekReportBundle};

/// Renders a bundle into a human-readable document at the given path.
///
/// Implementations own their format; the core only records the resulting
/// path in the snapshot's exports section.
pub trait DocumentRenderer {
    fn render(&self, bundle: &WeekReportBundle, output_path: &Path) -> Result<PathBuf, RenderError>;
}

/// Default renderer: GitHub-flavored Markdown tables.
#[derive(Debug, Default)]
pub struct MarkdownRenderer;

fn section(out: &mut String, title: &str, lines: &[String]) {
    let _ = writeln!(out, "### {title}\n");
    if lines.is_empty() {
        out.push_str("_(none)_\n\n");
        return;
    }
    for line in lines {
        let _ = writeln!(out, "- {line}");
    }
    out.push('\n');
}

fn task_table(out: &mut String, title: &str, tasks: &[Task]) {
    let _ = writeln!(out, "### {title}\n");
    out.push_str("| Task | Estimate (min) | Day | Status | Reason tags |\n");
    out.push_str("|---|---|---|---|---|\n");
    if tasks.is_empty() {
        out.push_str("| _(none)_ | | | | |\n");
    }
    for task in tasks {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            task.title,
            task.estimated_minutes,
            task.day_id,
            task.status,
            task.reason_tags.join(", "),
        );
    }
    out.push('\n');
}

fn day_table(out: &mut String, days: &[Day]) {
    out.push_str("### Next week, by day\n\n");
    out.push_str("| Date | Weekday | Planned (min) | Scheduled (min) | Done |\n");
    out.push_str("|---|---|---|---|---|\n");
    for day in days {
        let done = day.done_count.unwrap_or(0);
        let total = day.total_count.unwrap_or(0);
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {done}/{total} |",
            day.date,
            day.date.format("%a"),
            day.planned_minutes.unwrap_or(0),
            day.scheduled_minutes.unwrap_or(0),
        );
    }
    out.push('\n');
}

fn issues_table(out: &mut String, bundle: &WeekReportBundle) {
    out.push_str("### Issues\n\n");
    out.push_str("| Problem | Root cause | Improvement | Tags |\n");
    out.push_str("|---|---|---|---|\n");
    if bundle.report.issues.is_empty() {
        out.push_str("| _(none)_ | | | |\n");
    }
    for issue in &bundle.report.issues {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            issue.problem,
            issue.root_cause,
            issue.improvement,
            issue.tags.join(", "),
        );
    }
    out.push('\n');
}

fn session_table(out: &mut String, sessions: &[TaskSession], tasks: &[Task]) {
    out.push_str("### Sessions\n\n");
    out.push_str("| Task | Start | End | Completed | Note |\n");
    out.push_str("|---|---|---|---|---|\n");
    if sessions.is_empty() {
        out.push_str("| _(none)_ | | | | |\n");
    }
    let titles: HashMap<&str, &str> = tasks
        .iter()
        .map(|task| (task.id.as_str(), task.title.as_str()))
        .collect();
    for session in sessions {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            titles.get(session.task_id.as_str()).unwrap_or(&"-"),
            session.start_at.format("%Y-%m-%d %H:%M"),
            session.end_at.format("%Y-%m-%d %H:%M"),
            match session.is_completed {
                Some(true) => "yes",
                _ => "no",
            },
            session.note.as_deref().unwrap_or(""),
        );
    }
    out.push('\n');
}

impl MarkdownRenderer {
    /// Produce the document text without touching the filesystem.
    pub fn render_string(&self, bundle: &WeekReportBundle) -> String {
        let report = &bundle.report;
        let next_review = report.review_at + Days::new(7);
        let mut out = String::new();

        let _ = writeln!(out, "# Weekly Report — {}\n", report.week_id);
        let _ = writeln!(out, "- Review: {}", report.review_at.format("%Y-%m-%d %H:%M"));
        let _ = writeln!(out, "- Next review: {}", next_review.format("%Y-%m-%d %H:%M"));
        let _ = writeln!(out, "- Cycle: {} ~ {}", report.cycle_start, report.cycle_end);
        let _ = writeln!(out, "- Status: {}\n", report.status);

        section(&mut out, "Week goals", &report.goals_week);
        section(&mut out, "Month goals", &report.goals_month);
        section(&mut out, "Long-term goals", &report.goals_long);

        task_table(&mut out, "Last week's tasks", &bundle.last_week_tasks);
        day_table(&mut out, &bundle.days);
        task_table(&mut out, "Next week's tasks", &bundle.tasks);

        section(&mut out, "Good points", &report.good_points);
        issues_table(&mut out, bundle);
        session_table(&mut out, &bundle.task_sessions, &bundle.tasks);

        out
    }
}

impl DocumentRenderer for MarkdownRenderer {
    fn render(&self, bundle: &WeekReportBundle, output_path: &Path) -> Result<PathBuf, RenderError> {
        let text = self.render_string(bundle);
        std::fs::write(output_path, text).map_err(|source| RenderError::Write {
            path: output_path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %output_path.display(), "rendered weekly document");
        Ok(output_path.to_path_buf())
    }
}
