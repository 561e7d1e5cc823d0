//! # sennight
//!
//! A weekly review cycle manager: structured weekly reports with goals,
//! day buckets, carried-over tasks, per-day planning/scheduling metrics
//! and immutable archival snapshots.
//!
//! ## Architecture
//!
//! - **Data model** (`model`): immutable entities — report, days, tasks,
//!   sessions, issues
//! - **Decode/encode** (`payload`): loose JSON payloads in, canonical
//!   payloads out
//! - **Validation** (`validate`): fixed-order cross-entity invariants
//! - **Metrics** (`metrics`): pure per-day aggregation
//! - **Workflow** (`workflow`): cycle initialization and finalize
//! - **Snapshot** (`snapshot`): versioned archival projection
//! - **Render** (`render`): document renderer seam with a Markdown default
//!
//! ## Library usage
//!
//! ```
//! use sennight::workflow::{init_week_report, finalize_week_report};
//! use sennight::snapshot::build_snapshot;
//!
//! let review_at = "2026-01-16T18:00:00".parse().unwrap();
//! let now = "2026-01-16T18:05:00".parse().unwrap();
//! let bundle = init_week_report(review_at, None, now);
//! assert_eq!(bundle.report.week_id, "2026-W03");
//! assert_eq!(bundle.days.len(), 7);
//!
//! let finalized = finalize_week_report(&bundle, now);
//! let snapshot = build_snapshot(&finalized, "out/report.pdf", "out/snapshot.json");
//! assert_eq!(snapshot.schema_version, "1.0");
//! ```

pub mod error;
pub mod metrics;
pub mod model;
pub mod payload;
pub mod render;
pub mod snapshot;
pub mod validate;
pub mod workflow;
