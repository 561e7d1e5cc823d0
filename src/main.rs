//! sennight CLI: weekly review cycle manager.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};

use sennight::model::WeekReportBundle;
use sennight::payload::{deserialize_payload, serialize_bundle};
use sennight::render::{DocumentRenderer, MarkdownRenderer};
use sennight::snapshot::{build_snapshot, snapshot_json};
use sennight::validate::build_bundle;
use sennight::workflow::{finalize_week_report, init_week_report};

#[derive(Parser)]
#[command(name = "sennight", version, about = "Weekly review cycle manager")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new weekly report for the cycle after a review.
    InitWeek {
        /// Review datetime (ISO format, e.g. 2026-01-16T18:00:00).
        #[arg(long)]
        review_at: String,

        /// Previous week's bundle JSON; goals carry over from it.
        #[arg(long)]
        prev: Option<PathBuf>,

        /// Where to write the fresh bundle.
        #[arg(long, default_value = "week_report.json")]
        output: PathBuf,
    },

    /// Finalize a populated weekly report: recompute metrics, render the
    /// document and write the archival snapshot.
    Finalize {
        /// Week report bundle JSON.
        input: PathBuf,

        /// Directory for the document and snapshot artifacts.
        #[arg(long, default_value = "outputs")]
        output_dir: PathBuf,

        /// Where to write the finalized bundle.
        #[arg(long, default_value = "week_report_final.json")]
        bundle_output: PathBuf,

        /// Skip rendering the document; the snapshot is still written.
        #[arg(long)]
        no_document: bool,
    },

    /// Check that the binary is functional.
    Health,
}

fn load_bundle(path: &Path) -> Result<WeekReportBundle> {
    let text = std::fs::read_to_string(path).into_diagnostic()?;
    let payload = deserialize_payload(&text)?;
    Ok(build_bundle(&payload)?)
}

fn save_bundle(bundle: &WeekReportBundle, output: &Path) -> Result<()> {
    std::fs::write(output, serialize_bundle(bundle)).into_diagnostic()
}

fn parse_review_at(raw: &str) -> Result<NaiveDateTime> {
    raw.parse()
        .map_err(|_| miette!("invalid review datetime: \"{raw}\" (expected ISO format)"))
}

fn command_init(review_at: &str, prev: Option<&Path>, output: &Path) -> Result<()> {
    let prev_bundle = prev.map(load_bundle).transpose()?;
    let review_at = parse_review_at(review_at)?;
    let bundle = init_week_report(review_at, prev_bundle.as_ref(), Local::now().naive_local());
    save_bundle(&bundle, output)?;
    println!("Initialized week report: {}", output.display());
    Ok(())
}

fn command_finalize(
    input: &Path,
    output_dir: &Path,
    bundle_output: &Path,
    no_document: bool,
) -> Result<()> {
    let bundle = load_bundle(input)?;
    let finalized = finalize_week_report(&bundle, Local::now().naive_local());

    std::fs::create_dir_all(output_dir).into_diagnostic()?;
    let week_id = &finalized.report.week_id;
    let document_path = output_dir.join(format!("{week_id}_weekly_report.md"));
    let json_path = output_dir.join(format!("{week_id}_snapshot.json"));

    if !no_document {
        MarkdownRenderer.render(&finalized, &document_path)?;
        println!("Generated document: {}", document_path.display());
    }

    let snapshot = build_snapshot(
        &finalized,
        &document_path.display().to_string(),
        &json_path.display().to_string(),
    );
    std::fs::write(&json_path, snapshot_json(&snapshot)).into_diagnostic()?;
    save_bundle(&finalized, bundle_output)?;
    println!("Generated snapshot: {}", json_path.display());
    Ok(())
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitWeek {
            review_at,
            prev,
            output,
        } => command_init(&review_at, prev.as_deref(), &output),
        Commands::Finalize {
            input,
            output_dir,
            bundle_output,
            no_document,
        } => command_finalize(&input, &output_dir, &bundle_output, no_document),
        Commands::Health => {
            println!("ok {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
