//! Process command - extract acts from a single extract.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use extracto_core::models::{Act, Entity, ExtractoConfig, ParseOutcome};
use extracto_core::notarial::{
    ClassificationOrchestrator, HttpExtractionProvider, HybridAggregator, HybridOutcome, ProviderDocument,
    SideOutcome,
};
use extracto_core::render::TemplateEngine;
use extracto_core::load_tokens;

use super::{load_config, load_patterns, read_document};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Positioned token file (JSON list of {page, text, x, y, width, height})
    #[arg(long)]
    tokens: Option<PathBuf>,

    /// Reference pattern directory (overrides the configured one)
    #[arg(long)]
    patterns: Option<PathBuf>,

    /// Cross-check with the external extraction provider
    #[arg(long)]
    hybrid: bool,

    /// Append the rendered certified-copy text of the first act
    #[arg(long)]
    render: bool,

    /// Show extraction confidence
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per act
    Csv,
    /// Plain text summary
    Text,
}

/// Flattened view of a parse or hybrid outcome.
#[derive(Debug, Clone)]
pub struct Report {
    pub acts: Vec<Act>,
    pub confidence: f32,
    pub source: String,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

impl From<&ParseOutcome> for Report {
    fn from(outcome: &ParseOutcome) -> Self {
        Self {
            acts: outcome.acts.clone(),
            confidence: outcome.confidence,
            source: outcome.source.clone(),
            issues: outcome.validation.issues.clone(),
            warnings: outcome.validation.warnings.clone(),
        }
    }
}

impl From<&HybridOutcome> for Report {
    fn from(outcome: &HybridOutcome) -> Self {
        let mut issues = Vec::new();
        if let SideOutcome::Failed(reason) = &outcome.local {
            issues.push(format!("local pipeline failed: {}", reason));
        }
        if let SideOutcome::Failed(reason) = &outcome.external {
            issues.push(format!("external provider failed: {}", reason));
        }
        Self {
            acts: outcome.acts.clone(),
            confidence: outcome.confidence,
            source: "hybrid".to_string(),
            issues,
            warnings: Vec::new(),
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);

    pb.set_message("Reading document...");
    let text = read_document(&args.input, &config)?;
    let tokens = match &args.tokens {
        Some(path) => Some(load_tokens(path)?),
        None => None,
    };
    let patterns = load_patterns(args.patterns.as_deref(), &config);
    debug!("Loaded {} reference pattern(s)", patterns.len());
    let orchestrator = ClassificationOrchestrator::new(config.clone(), patterns);

    let (json, report) = if args.hybrid {
        pb.set_message("Running local and external extraction...");
        let provider = HttpExtractionProvider::from_config(&config.hybrid)?;
        let document = ProviderDocument::new(file_name(&args.input), fs::read(&args.input)?);
        let aggregator = HybridAggregator::new(Arc::new(orchestrator), provider);
        let outcome = aggregator.process(text, tokens, &document).await;
        (serde_json::to_value(&outcome)?, Report::from(&outcome))
    } else {
        pb.set_message("Extracting acts...");
        let outcome = orchestrator.parse_document(&text, tokens.as_deref());
        (serde_json::to_value(&outcome)?, Report::from(&outcome))
    };

    pb.finish_and_clear();

    let rendered = if args.render {
        render_first(&report.acts, &config)?
    } else {
        None
    };

    let output = format_report(json, &report, rendered.as_deref(), args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!("{} Output written to {}", style("✓").green(), output_path.display());
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}% ({})",
            style("ℹ").blue(),
            report.confidence * 100.0,
            report.source
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string()
}

fn render_first(acts: &[Act], config: &ExtractoConfig) -> anyhow::Result<Option<String>> {
    let Some(act) = acts.first() else {
        return Ok(None);
    };
    let engine = TemplateEngine::from_config(config)?;
    Ok(Some(engine.render(act).text))
}

/// Format a report; JSON output carries the full outcome.
pub fn format_report(
    mut json: serde_json::Value,
    report: &Report,
    rendered: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            if let (Some(text), Some(object)) = (rendered, json.as_object_mut()) {
                object.insert("rendered".to_string(), serde_json::Value::String(text.to_string()));
            }
            Ok(serde_json::to_string_pretty(&json)?)
        }
        OutputFormat::Csv => {
            let mut output = format_csv(report)?;
            if let Some(text) = rendered {
                output.push('\n');
                output.push_str(text);
            }
            Ok(output)
        }
        OutputFormat::Text => {
            let mut output = format_text(report);
            if let Some(text) = rendered {
                output.push('\n');
                output.push_str(text);
            }
            Ok(output)
        }
    }
}

fn names(entities: &[Entity]) -> String {
    entities
        .iter()
        .map(|e| e.name.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_csv(report: &Report) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "act_type",
        "grantors",
        "beneficiaries",
        "notary",
        "notary_district",
        "source",
        "confidence",
    ])?;

    for act in &report.acts {
        wtr.write_record([
            act.act_type.as_str(),
            names(&act.grantors).as_str(),
            names(&act.beneficiaries).as_str(),
            act.notary_name.as_deref().unwrap_or(""),
            act.notary_district_number.as_deref().unwrap_or(""),
            report.source.as_str(),
            format!("{:.2}", report.confidence).as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &Report) -> String {
    let mut output = String::new();

    if report.acts.is_empty() {
        output.push_str("No act could be extracted.\n");
    }

    for (i, act) in report.acts.iter().enumerate() {
        output.push_str(&format!("Act {}: {}\n", i + 1, act.act_type));

        output.push_str("  Grantors:\n");
        for entity in &act.grantors {
            let kind = if entity.person_type.is_juridical() { "juridical" } else { "natural" };
            output.push_str(&format!("    - {} ({})\n", entity.name, kind));
            for rep in &entity.representatives {
                output.push_str(&format!("      represented by {}\n", rep));
            }
        }

        if !act.beneficiaries.is_empty() {
            output.push_str("  Beneficiaries:\n");
            for entity in &act.beneficiaries {
                output.push_str(&format!("    - {}\n", entity.name));
            }
        }

        if let Some(notary) = &act.notary_name {
            let district = act
                .notary_district_label
                .as_deref()
                .or(act.notary_district_number.as_deref())
                .unwrap_or("?");
            let alternate = if act.notary_is_alternate { ", alternate" } else { "" };
            output.push_str(&format!("  Notary: {} (NOTARIA {}{})\n", notary, district, alternate));
        }
        output.push('\n');
    }

    output.push_str(&format!("Source: {}\n", report.source));
    output.push_str(&format!("Confidence: {:.1}%\n", report.confidence * 100.0));

    for issue in &report.issues {
        output.push_str(&format!("Issue: {}\n", issue));
    }
    for warning in &report.warnings {
        output.push_str(&format!("Warning: {}\n", warning));
    }

    output
}
