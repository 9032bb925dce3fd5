//! Batch command - extract acts from every file matching a glob.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use extracto_core::models::{ExtractoConfig, ParseOutcome};
use extracto_core::notarial::ClassificationOrchestrator;

use super::{is_supported, load_config, load_patterns, read_document};

const SUMMARY_HEADER: [&str; 10] = [
    "file",
    "status",
    "acts",
    "act_types",
    "confidence",
    "source",
    "issues",
    "processing_time_ms",
    "processed_at",
    "error",
];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern selecting the extracts (PDF or plain text)
    #[arg(required = true)]
    input: String,

    /// Directory receiving one `<stem>.json` outcome per file
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write `summary.csv` next to the outputs
    #[arg(long)]
    summary: bool,

    /// Reference pattern directory (overrides the configured one)
    #[arg(long)]
    patterns: Option<PathBuf>,

    /// Keep going after a file fails
    #[arg(long)]
    continue_on_error: bool,
}

enum FileStatus {
    Done(ParseOutcome),
    Failed(String),
}

struct FileResult {
    path: PathBuf,
    status: FileStatus,
    elapsed: Duration,
}

impl FileResult {
    fn file_name(&self) -> &str {
        self.path.file_name().and_then(|s| s.to_str()).unwrap_or("")
    }

    fn summary_row(&self, processed_at: &str) -> Vec<String> {
        let elapsed_ms = self.elapsed.as_millis().to_string();
        match &self.status {
            FileStatus::Done(outcome) => vec![
                self.file_name().to_string(),
                "success".to_string(),
                outcome.acts.len().to_string(),
                outcome
                    .acts
                    .iter()
                    .map(|a| a.act_type.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
                format!("{:.2}", outcome.confidence),
                outcome.source.clone(),
                outcome.validation.issues.join("; "),
                elapsed_ms,
                processed_at.to_string(),
                String::new(),
            ],
            FileStatus::Failed(reason) => vec![
                self.file_name().to_string(),
                "error".to_string(),
                "0".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                elapsed_ms,
                processed_at.to_string(),
                reason.clone(),
            ],
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let started = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob::glob(&args.input)?
        .flatten()
        .filter(|p| is_supported(p))
        .collect();
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }
    println!("{} Found {} files to process", style("ℹ").blue(), files.len());

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)?;
    }

    let patterns = load_patterns(args.patterns.as_deref(), &config);
    let orchestrator = ClassificationOrchestrator::new(config.clone(), patterns);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        pb.set_message(path.display().to_string());
        let file_started = Instant::now();
        let status = match extract_file(&path, &orchestrator, &config) {
            Ok(outcome) => FileStatus::Done(outcome),
            Err(e) if args.continue_on_error => {
                warn!("Skipping {}: {}", path.display(), e);
                FileStatus::Failed(e.to_string())
            }
            Err(e) => {
                pb.abandon();
                error!("Failed to process {}: {}", path.display(), e);
                anyhow::bail!("Processing failed for {}: {}", path.display(), e);
            }
        };

        if let (Some(dir), FileStatus::Done(outcome)) = (&args.output_dir, &status) {
            write_outcome(dir, &path, outcome)?;
        }

        results.push(FileResult {
            path,
            status,
            elapsed: file_started.elapsed(),
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    if args.summary {
        let summary_path = match &args.output_dir {
            Some(dir) => dir.join("summary.csv"),
            None => PathBuf::from("summary.csv"),
        };
        write_summary(&summary_path, &results)?;
        println!("{} Summary written to {}", style("✓").green(), summary_path.display());
    }

    report(&results, started.elapsed());
    Ok(())
}

fn extract_file(
    path: &Path,
    orchestrator: &ClassificationOrchestrator,
    config: &ExtractoConfig,
) -> anyhow::Result<ParseOutcome> {
    let text = read_document(path, config)?;
    Ok(orchestrator.parse_document(&text, None))
}

fn write_outcome(dir: &Path, input: &Path, outcome: &ParseOutcome) -> anyhow::Result<()> {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("extract");
    let target = dir.join(format!("{}.json", stem));
    fs::write(&target, serde_json::to_string_pretty(outcome)?)?;
    debug!("Wrote {}", target.display());
    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let processed_at = Local::now().to_rfc3339();
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(SUMMARY_HEADER)?;
    for result in results {
        wtr.write_record(result.summary_row(&processed_at))?;
    }
    wtr.flush()?;
    Ok(())
}

fn report(results: &[FileResult], elapsed: Duration) {
    let failures: Vec<(&Path, &str)> = results
        .iter()
        .filter_map(|r| match &r.status {
            FileStatus::Failed(reason) => Some((r.path.as_path(), reason.as_str())),
            FileStatus::Done(_) => None,
        })
        .collect();
    let extracted = results.len() - failures.len();

    println!();
    println!("{} Processed {} files in {:?}", style("✓").green(), results.len(), elapsed);
    println!(
        "   {} extracted, {} failed",
        style(extracted).green(),
        style(failures.len()).red()
    );

    if !failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, reason) in failures {
            println!("  - {}: {}", path.display(), reason);
        }
    }
}
