//! Rich diagnostic error types for the sennight core.
//!
//! Each stage of the pipeline defines its own error type with miette
//! `#[diagnostic]` derives, providing error codes and help text so users
//! know exactly which field or entity broke the build. Parse errors cover
//! the structural decode of a loose payload; validation errors cover the
//! cross-entity invariants; render errors cover the document adapter.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the sennight core.
///
/// Each variant wraps a stage-specific error, preserving the full
/// diagnostic chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum SennightError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Structural decode failures: a loose payload was missing a required
/// date/datetime or carried one that is not an ISO-8601 literal.
#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("{field}: date value is required")]
    #[diagnostic(
        code(sennight::parse::missing_date),
        help("Provide the field as an ISO date literal, e.g. \"2026-01-17\".")
    )]
    MissingDate { field: String },

    #[error("{field}: datetime value is required")]
    #[diagnostic(
        code(sennight::parse::missing_datetime),
        help("Provide the field as an ISO datetime literal, e.g. \"2026-01-16T18:00:00\".")
    )]
    MissingDateTime { field: String },

    #[error("{field}: invalid date literal \"{value}\"")]
    #[diagnostic(
        code(sennight::parse::invalid_date),
        help("Dates must be ISO-8601 calendar dates in the form YYYY-MM-DD.")
    )]
    InvalidDate { field: String, value: String },

    #[error("{field}: invalid datetime literal \"{value}\"")]
    #[diagnostic(
        code(sennight::parse::invalid_datetime),
        help("Datetimes must be ISO-8601 literals in the form YYYY-MM-DDTHH:MM:SS.")
    )]
    InvalidDateTime { field: String, value: String },

    #[error("{field}: expected an integer, got \"{value}\"")]
    #[diagnostic(
        code(sennight::parse::invalid_int),
        help("Minute and count fields must be plain JSON integers.")
    )]
    InvalidInt { field: String, value: String },

    #[error("payload is not a JSON object")]
    #[diagnostic(
        code(sennight::parse::not_an_object),
        help(
            "A bundle payload is a JSON object with the keys week_report, days, \
             tasks, task_sessions and last_week_tasks."
        )
    )]
    NotAnObject,

    #[error("invalid JSON: {message}")]
    #[diagnostic(
        code(sennight::parse::invalid_json),
        help("The input could not be parsed as JSON at all. Check for syntax errors.")
    )]
    InvalidJson { message: String },
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Cross-entity invariant violations, checked in a fixed order after the
/// structural decode succeeds. The first failure wins; a failed build
/// yields no bundle.
#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error("invalid status for WeekReport: \"{status}\"")]
    #[diagnostic(
        code(sennight::validate::report_status),
        help("A week report status must be \"draft\" or \"final\".")
    )]
    InvalidReportStatus { status: String },

    #[error("cycle_end must be on or after cycle_start")]
    #[diagnostic(
        code(sennight::validate::cycle_order),
        help("A reporting cycle spans cycle_start..cycle_end; the end date may not precede the start.")
    )]
    CycleOrder,

    #[error("{label} is required")]
    #[diagnostic(
        code(sennight::validate::required_text),
        help("The field must contain non-whitespace text.")
    )]
    RequiredText { label: String },

    #[error("invalid task status: \"{status}\"")]
    #[diagnostic(
        code(sennight::validate::task_status),
        help("A task status must be one of \"todo\", \"done\", \"carried_over\" or \"dropped\".")
    )]
    InvalidTaskStatus { status: String },

    #[error("task estimated_minutes must be positive: {title}")]
    #[diagnostic(
        code(sennight::validate::task_estimate),
        help("Every task needs an estimate of at least one minute.")
    )]
    NonPositiveEstimate { title: String },

    #[error("task day_id not found: {day_id}")]
    #[diagnostic(
        code(sennight::validate::unknown_day),
        help(
            "A task's day_id must match one of the bundle's days, or be empty \
             for a task not yet assigned to a day."
        )
    )]
    UnknownDay { day_id: String },

    #[error("session task_id not found: {task_id}")]
    #[diagnostic(
        code(sennight::validate::unknown_task),
        help("A session's task_id must reference a task in the current cycle's task list.")
    )]
    UnknownTask { task_id: String },

    #[error("session end_at must be after start_at")]
    #[diagnostic(
        code(sennight::validate::session_order),
        help("A time block must have strictly positive duration.")
    )]
    SessionOrder,
}

// ---------------------------------------------------------------------------
// Render errors
// ---------------------------------------------------------------------------

/// Failures from the document renderer or the artifact write path.
/// Opaque to the core pipeline; never retried here.
#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("failed to write document: {path}")]
    #[diagnostic(
        code(sennight::render::write),
        help("Check that the output directory exists and is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for functions returning sennight results.
pub type SennightResult<T> = std::result::Result<T, SennightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_converts_to_sennight_error() {
        let err = ParseError::MissingDate {
            field: "week_report.cycle_start".into(),
        };
        let top: SennightError = err.into();
        assert!(matches!(top, SennightError::Parse(ParseError::MissingDate { .. })));
    }

    #[test]
    fn validation_error_converts_to_sennight_error() {
        let err = ValidationError::InvalidTaskStatus {
            status: "paused".into(),
        };
        let top: SennightError = err.into();
        assert!(matches!(
            top,
            SennightError::Validation(ValidationError::InvalidTaskStatus { .. })
        ));
    }

    #[test]
    fn error_display_messages_name_the_offender() {
        let err = ValidationError::UnknownDay {
            day_id: "2026-W03-2026-01-99".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("2026-W03-2026-01-99"));

        let err = ParseError::InvalidDate {
            field: "days[0].date".into(),
            value: "not-a-date".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("days[0].date"));
        assert!(msg.contains("not-a-date"));
    }
}
