//! Program builder command-line driver.
//!
//! Builds the program for one event from a request file and a submission
//! manifest, then writes the markup, the compiled program, the presentation
//! order and the booklet into the output directory.
//!
//! # Usage
//!
//! ```bash
//! build-program request.json manifest.json [out-dir]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)
//! - `PROGRAM_LATEX_ENGINE`, `PROGRAM_PDF_CONVERTER`,
//!   `PROGRAM_COMPILE_TIMEOUT_SECS`, `PROGRAM_PRESENTATION_MINUTES`:
//!   configuration overrides (see `program.toml`)

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use program_builder::api::{LocalSubmissionStore, ProgramBuilder, ProgramConfig, ProgramRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (request_path, manifest_path, out_dir) = match args.as_slice() {
        [request, manifest] => (request, manifest, PathBuf::from(".")),
        [request, manifest, out] => (request, manifest, PathBuf::from(out)),
        _ => bail!("usage: build-program <request.json> <manifest.json> [out-dir]"),
    };

    let config = ProgramConfig::load()?;
    let raw_request = fs::read_to_string(request_path)
        .with_context(|| format!("reading request {}", request_path))?;
    let request: ProgramRequest = serde_json::from_str(&raw_request)
        .with_context(|| format!("parsing request {}", request_path))?;

    let store = Arc::new(LocalSubmissionStore::new());
    let manifest_event = store.load_manifest(manifest_path)?;
    if manifest_event != request.event {
        warn!(
            "Manifest event {} differs from request event {}",
            manifest_event, request.event
        );
    }

    let builder = ProgramBuilder::with_platex(store, config);
    let outcome = builder.build(&request).await?;

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    fs::write(out_dir.join("program.tex"), &outcome.plan.markup)?;
    fs::write(
        out_dir.join(&outcome.program.filename),
        &outcome.program.bytes,
    )?;
    fs::write(
        out_dir.join("presentation_order.json"),
        serde_json::to_vec_pretty(&outcome.plan.presentation_order)?,
    )?;
    info!(
        "Wrote program with {} presentations to {}",
        outcome.plan.presentation_order.len(),
        out_dir.display()
    );

    let order = &outcome.plan.presentation_order;
    let booklet = builder
        .build_booklet(&outcome.program, order, request.title())
        .await?;
    fs::write(
        out_dir.join(&booklet.document.filename),
        &booklet.document.bytes,
    )?;
    info!(
        "Wrote {} ({} sources included, {} skipped)",
        booklet.document.filename,
        booklet.report.included.len(),
        booklet.report.skipped.len()
    );

    Ok(())
}
