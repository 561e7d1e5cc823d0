//! sennightd — the sennight HTTP daemon.
//!
//! Thin transport over the core pipeline:
//!
//! - `GET  /api/health` — server status
//! - `POST /api/weeks/init` — initialize the next cycle's bundle
//! - `POST /api/weeks/finalize` — validate, recompute metrics, render the
//!   document and return the finalized bundle plus its snapshot
//!
//! Validation failures come back as 400 with the diagnostic message; the
//! core performs no retries and no persistence — bundles travel whole in
//! request and response bodies.
//!
//! Build and run: `cargo run --features server --bin sennightd`

use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::routing::{get, post};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;

use sennight::model::WeekReportBundle;
use sennight::payload::bundle_to_value;
use sennight::render::{DocumentRenderer, MarkdownRenderer};
use sennight::snapshot::{Snapshot, build_snapshot, snapshot_json};
use sennight::validate::build_bundle;
use sennight::workflow::{finalize_week_report, init_week_report};

// ── Request/response types ────────────────────────────────────────────────

#[derive(Deserialize)]
struct InitWeekRequest {
    /// Review datetime in ISO format.
    review_at: NaiveDateTime,
    /// Previous cycle's bundle payload; goals carry over from it.
    prev_bundle: Option<Value>,
}

fn default_output_dir() -> String {
    "outputs".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct FinalizeRequest {
    bundle: Value,
    #[serde(default = "default_output_dir")]
    output_dir: String,
    #[serde(default = "default_true")]
    generate_document: bool,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
struct FinalizeResponse {
    bundle: Value,
    snapshot: Snapshot,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn init_week(
    Json(request): Json<InitWeekRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let prev: Option<WeekReportBundle> = match &request.prev_bundle {
        Some(payload) => Some(
            build_bundle(payload).map_err(|e| (StatusCode::BAD_REQUEST, format!("{e}")))?,
        ),
        None => None,
    };
    let bundle = init_week_report(request.review_at, prev.as_ref(), Local::now().naive_local());
    Ok(Json(bundle_to_value(&bundle)))
}

async fn finalize_week(
    Json(request): Json<FinalizeRequest>,
) -> Result<Json<FinalizeResponse>, (StatusCode, String)> {
    let bundle =
        build_bundle(&request.bundle).map_err(|e| (StatusCode::BAD_REQUEST, format!("{e}")))?;
    let finalized = finalize_week_report(&bundle, Local::now().naive_local());

    let output_dir = PathBuf::from(&request.output_dir);
    std::fs::create_dir_all(&output_dir)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e}")))?;
    let week_id = &finalized.report.week_id;
    let document_path = output_dir.join(format!("{week_id}_weekly_report.md"));
    let json_path = output_dir.join(format!("{week_id}_snapshot.json"));

    if request.generate_document {
        MarkdownRenderer
            .render(&finalized, &document_path)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e}")))?;
    }

    let snapshot = build_snapshot(
        &finalized,
        &document_path.display().to_string(),
        &json_path.display().to_string(),
    );
    std::fs::write(&json_path, snapshot_json(&snapshot))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e}")))?;

    Ok(Json(FinalizeResponse {
        bundle: bundle_to_value(&finalized),
        snapshot,
    }))
}

// ── Entry point ───────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let app = axum::Router::new()
        .route("/api/health", get(health))
        .route("/api/weeks/init", post(init_week))
        .route("/api/weeks/finalize", post(finalize_week))
        .layer(CorsLayer::permissive());

    let addr = std::env::var("SENNIGHTD_ADDR").unwrap_or_else(|_| "127.0.0.1:8787".to_string());
    tracing::info!(%addr, "sennightd listening");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("bind server address");
    axum::serve(listener, app).await.expect("server run");
}
