//! Render command - certified-copy text from extracted acts.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::Value;

use extracto_core::models::Act;
use extracto_core::render::TemplateEngine;

use super::load_config;

/// Arguments for the render command.
#[derive(Args)]
pub struct RenderArgs {
    /// JSON file: a process outcome, a list of acts or a single act
    #[arg(required = true)]
    input: PathBuf,

    /// Number of numbered copies (1-10, default from config)
    #[arg(short = 'n', long)]
    copies: Option<usize>,

    /// Template file with {{PLACEHOLDER}} variables
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: RenderArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(template) = args.template {
        config.render.template_path = Some(template);
    }

    let content = fs::read_to_string(&args.input)?;
    let acts = acts_from_json(&content)?;
    let Some(act) = acts.first() else {
        anyhow::bail!("No act found in {}", args.input.display());
    };

    let engine = TemplateEngine::from_config(&config)?;
    let copies = args.copies.unwrap_or(config.render.copies);
    let output = engine
        .render_copies(act, copies)
        .into_iter()
        .map(|doc| doc.text)
        .collect::<Vec<_>>()
        .join("\n---\n\n");

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!("{} Output written to {}", style("✓").green(), output_path.display());
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Accept `{acts: [...]}` (parse or hybrid outcome), `[...]` or a bare act.
fn acts_from_json(content: &str) -> anyhow::Result<Vec<Act>> {
    let value: Value = serde_json::from_str(content)?;
    let acts = match value {
        Value::Object(mut object) if object.contains_key("acts") => {
            serde_json::from_value(object.remove("acts").unwrap_or(Value::Null))?
        }
        Value::Array(_) => serde_json::from_value(value)?,
        Value::Object(_) => vec![serde_json::from_value(value)?],
        _ => anyhow::bail!("Expected a JSON object or array of acts"),
    };
    Ok(acts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACT: &str = r#"{
        "act_type": "PODER GENERAL",
        "grantors": [{"name": "JUAN PEREZ GOMEZ", "person_type": "natural"}],
        "beneficiaries": [],
        "source": "linear",
        "confidence": 0.4
    }"#;

    #[test]
    fn test_acts_from_json_shapes() {
        assert_eq!(acts_from_json(ACT).unwrap().len(), 1);
        assert_eq!(acts_from_json(&format!("[{}, {}]", ACT, ACT)).unwrap().len(), 2);

        let outcome = format!(r#"{{"acts": [{}], "confidence": 0.4}}"#, ACT);
        let acts = acts_from_json(&outcome).unwrap();
        assert_eq!(acts[0].act_type, "PODER GENERAL");

        assert!(acts_from_json("42").is_err());
    }
}
