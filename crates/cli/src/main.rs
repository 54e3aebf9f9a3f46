use anyhow::Context;
use clap::{Parser, Subcommand};
use rxscan_core::{
    canonical_lines, medicine_info, parse_payload, resolve_rules, PrescriptionRecord, Warning,
    WarningEngine, WarningReport,
};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rxscan")]
#[command(about = "rxscan prescription review CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a prescription JSON file for warnings
    Analyze {
        /// Prescription JSON file, or `-` for stdin
        input: PathBuf,
        /// Print one line per warning instead of JSON
        #[arg(long)]
        text: bool,
        /// YAML file overriding the warning rules
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Print one canonical line per treatment item
    Canonical {
        /// Prescription JSON file, or `-` for stdin
        input: PathBuf,
    },
    /// Print the explanation card for each treatment item
    Medicines {
        /// Prescription JSON file, or `-` for stdin
        input: PathBuf,
    },
    /// Print the warning rules as YAML
    Rules {
        /// YAML file to validate and print instead of the built-in rules
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn read_payload(input: &Path) -> anyhow::Result<Value> {
    let text = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read prescription from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?
    };
    Ok(parse_payload(&text)?)
}

fn format_warning(warning: &Warning) -> String {
    format!(
        "[{}] {} {}: {}",
        warning.severity.as_str().to_uppercase(),
        warning.code,
        warning.field.as_deref().unwrap_or("-"),
        warning.message
    )
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Analyze { input, text, rules }) => {
            let engine = WarningEngine::new(resolve_rules(rules)?);
            let report = WarningReport::from(engine.analyze(&read_payload(&input)?));
            if text {
                if report.warnings.is_empty() {
                    println!("No warnings.");
                }
                for warning in &report.warnings {
                    println!("{}", format_warning(warning));
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Some(Commands::Canonical { input }) => {
            let payload = read_payload(&input)?;
            let record = PrescriptionRecord::from_json(&payload)
                .context("prescription must be a JSON object")?;
            for line in canonical_lines(&record) {
                println!("{}", line);
            }
        }
        Some(Commands::Medicines { input }) => {
            let payload = read_payload(&input)?;
            let record = PrescriptionRecord::from_json(&payload)
                .context("prescription must be a JSON object")?;
            println!("{}", serde_json::to_string_pretty(&medicine_info(&record))?);
        }
        Some(Commands::Rules { rules }) => {
            print!("{}", resolve_rules(rules)?.to_yaml()?);
        }
        None => {
            println!("Use 'rxscan --help' for commands");
        }
    }

    Ok(())
}
