//! Command-line interface and subcommand handlers

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use piiscrub_core::{
    mask_for_display, policy, Detector, PiiCategory, Redactor, SafeLogger, SanitizerConfig,
    SanitizerPolicy, TracingSink,
};
use serde_json::{json, Value};

/// Redact, detect and mask PII in JSON documents
#[derive(Parser, Debug)]
#[command(name = "piiscrub")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a sanitizer configuration file (TOML)
    #[arg(short, long, global = true, env = "PIISCRUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn", env = "PIISCRUB_LOG_LEVEL")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Redact a JSON document and print the result
    Redact {
        /// Input file; stdin when omitted or "-"
        input: Option<PathBuf>,

        /// Print on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Report the fields of a JSON document that contain PII
    Detect {
        /// Input file; stdin when omitted or "-"
        input: Option<PathBuf>,

        /// Exit with status 1 when any PII is found
        #[arg(long)]
        fail_on_pii: bool,
    },

    /// Mask a single value for display
    Mask {
        /// email, phone, card, name, address, auth_secret or generic
        category: PiiCategory,

        value: String,
    },
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let policy = load_policy(cli.config.as_deref())?;
    let logger = SafeLogger::with_redactor(TracingSink, Redactor::new(Arc::clone(&policy)));

    match cli.command {
        Commands::Redact { input, compact } => {
            let (source, document) = read_document(input.as_deref())?;
            let redacted = Redactor::new(policy).redact(&document);
            println!("{}", render(&redacted, compact)?);
            logger.info("redacted document", Some(&json!({"source": source})));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Detect { input, fail_on_pii } => {
            let (source, document) = read_document(input.as_deref())?;
            let result = Detector::new(policy).detect(&document);
            println!("{}", render(&serde_json::to_value(&result)?, false)?);
            logger.info(
                "detection finished",
                Some(&json!({"source": source, "flagged": result.fields.len()})),
            );
            if fail_on_pii && result.has_pii {
                Ok(ExitCode::from(1))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Commands::Mask { category, value } => {
            println!("{}", mask_for_display(&value, category));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_policy(path: Option<&Path>) -> Result<Arc<SanitizerPolicy>> {
    let Some(path) = path else {
        return Ok(policy::shared_default());
    };
    let config = SanitizerConfig::from_file(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    let policy = config
        .to_policy()
        .with_context(|| format!("invalid sanitizer policy in {}", path.display()))?;
    Ok(Arc::new(policy))
}

/// Read and parse JSON from a file, or stdin for `None` / `-`.
fn read_document(input: Option<&Path>) -> Result<(String, Value)> {
    let (source, content) = match input {
        Some(path) if path != Path::new("-") => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            (path.display().to_string(), content)
        }
        _ => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("failed to read stdin")?;
            ("stdin".to_string(), content)
        }
    };
    let document = serde_json::from_str(&content)
        .with_context(|| format!("{source} is not valid JSON"))?;
    Ok((source, document))
}

fn render(value: &Value, compact: bool) -> Result<String> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(rendered)
}
