//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use glob::glob;
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use trackless_core::{
    census, AcceptReport, AcceptSettings, PartStatus, RevisionAccepter, RevisionCensus,
    DEFAULT_CONFIG_FILE,
};
use trackless_ooxml::WmlDocument;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "trackless")]
#[command(author, version, about = "Accept all tracked changes in Word documents", long_about = None)]
struct Cli {
    /// More logging (-v for debug, -vv for trace); overrides RUST_LOG
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Accept every tracked change in a DOCX file
    Accept {
        /// Input DOCX or DOTX file
        input: PathBuf,

        /// Output file (defaults to <stem>.accepted.<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Skip the structural cleanup after accepting
        #[arg(long)]
        no_normalize: bool,

        /// Process parts in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Report which documents carry tracked changes
    Check {
        /// Files or glob patterns
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Strict mode: exit with an error if any document has tracked changes
        #[arg(long)]
        strict: bool,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Accept {
            input,
            output,
            config,
            format,
            no_normalize,
            parallel,
        } => {
            let mut settings = load_settings(config.as_deref())?;
            if no_normalize {
                settings.normalize = false;
            }
            if parallel {
                settings.parallel = true;
            }
            accept_command(&input, output.as_deref(), &settings, format)?;
        }
        Commands::Check {
            patterns,
            format,
            strict,
        } => {
            check_command(&patterns, format, strict)?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber, logging to stderr
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    // A subscriber may already be installed when run from tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Default output path: `<stem>.accepted.<ext>` next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let extension = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "docx".to_string());
    input.with_file_name(format!("{stem}.accepted.{extension}"))
}

/// Execute the accept command
///
/// The accepted document is written even when some parts failed; those
/// parts keep their original content and the command returns an error.
pub fn accept_command(
    input: &Path,
    output: Option<&Path>,
    settings: &AcceptSettings,
    format: OutputFormat,
) -> Result<AcceptReport> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let document = WmlDocument::open(input)
        .with_context(|| format!("Failed to open DOCX file: {}", input.display()))?;
    debug!(parts = document.parts().len(), "document opened");

    let outcome = RevisionAccepter::with_settings(settings.clone()).accept(&document);

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    outcome
        .document
        .save(&output_path)
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

    let report = outcome.report;
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "input": input.display().to_string(),
                "output": output_path.display().to_string(),
                "report": &report,
            });
            let json = serde_json::to_string_pretty(&json).context("Failed to serialize report to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => print_accept_report(input, &output_path, &report),
    }

    let failed = report.failed_parts().count();
    if failed > 0 {
        anyhow::bail!(
            "{} part(s) of {} could not be accepted and were left unchanged",
            failed,
            input.display()
        );
    }

    Ok(report)
}

fn print_accept_report(input: &Path, output: &Path, report: &AcceptReport) {
    println!("trackless v{}", trackless_core::VERSION);
    println!("Accepting: {}", input.display());
    for part in &report.parts {
        let status = match &part.status {
            PartStatus::Unchanged => "no tracked changes".to_string(),
            PartStatus::Accepted => format!("{} change(s) accepted", part.stats.resolved()),
            PartStatus::Skipped => "skipped".to_string(),
            PartStatus::Failed { error } => format!("FAILED: {}", error),
        };
        println!("  {}: {}", part.path, status);
    }

    let diagnostics: Vec<_> = report.all_diagnostics().collect();
    if !diagnostics.is_empty() {
        println!();
        for diag in &diagnostics {
            println!("{}", diag);
        }
    }

    let totals = report.totals();
    println!();
    println!("Accept complete!");
    println!("  Output: {}", output.display());
    println!(
        "  Accepted: {} change(s), {} paragraph(s) merged",
        totals.resolved(),
        totals.merged_paragraphs
    );
    if totals.malformed > 0 {
        println!("  Left in place: {} malformed revision(s)", totals.malformed);
    }
}

/// Result of checking one document
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Document path
    pub path: String,
    /// Whether any part carries tracked changes
    pub has_revisions: bool,
    /// Revision counts over all parts
    pub census: RevisionCensus,
    /// Why the document could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    fn for_document(path: &Path, document: &WmlDocument) -> Self {
        let mut total = RevisionCensus::default();
        for part in document.parts() {
            total.add(&census(&part.content));
        }
        Self {
            path: path.display().to_string(),
            has_revisions: !total.is_clean(),
            census: total,
            error: None,
        }
    }

    fn unreadable(path: &Path, error: &anyhow::Error) -> Self {
        Self {
            path: path.display().to_string(),
            has_revisions: false,
            census: RevisionCensus::default(),
            error: Some(format!("{:#}", error)),
        }
    }
}

/// Execute the check command
pub fn check_command(patterns: &[String], format: OutputFormat, strict: bool) -> Result<Vec<CheckResult>> {
    let paths = expand_patterns(patterns)?;
    if paths.is_empty() {
        anyhow::bail!("No documents match: {}", patterns.join(", "));
    }

    let results: Vec<CheckResult> = paths
        .iter()
        .map(|path| {
            let opened = WmlDocument::open(path)
                .with_context(|| format!("Failed to open DOCX file: {}", path.display()));
            match opened {
                Ok(document) => CheckResult::for_document(path, &document),
                Err(err) => {
                    warn!(path = %path.display(), "{:#}", err);
                    CheckResult::unreadable(path, &err)
                }
            }
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&results)
                .context("Failed to serialize results to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => print_check_results(&results),
    }

    let unreadable = results.iter().filter(|r| r.error.is_some()).count();
    if unreadable > 0 {
        anyhow::bail!("{} document(s) could not be read", unreadable);
    }
    let revised = results.iter().filter(|r| r.has_revisions).count();
    if strict && revised > 0 {
        anyhow::bail!("{} document(s) carry tracked changes", revised);
    }

    Ok(results)
}

fn print_check_results(results: &[CheckResult]) {
    for result in results {
        if let Some(error) = &result.error {
            println!("✗ {}: {}", result.path, error);
        } else if result.has_revisions {
            let c = &result.census;
            println!(
                "✗ {}: {} tracked change(s) ({} insertion(s), {} deletion(s), {} move(s), {} paragraph mark(s), {} property change(s), {} table change(s))",
                result.path,
                c.total(),
                c.insertions,
                c.deletions,
                c.moves,
                c.paragraph_marks,
                c.property_changes,
                c.table_changes
            );
        } else {
            println!("✓ {}: no tracked changes", result.path);
        }
        if result.census.malformed > 0 {
            println!("  {} malformed revision(s)", result.census.malformed);
        }
    }
}

/// Expand file names and glob patterns, keeping the order given
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        for entry in glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
            match entry {
                Ok(path) if path.is_file() => {
                    if !paths.contains(&path) {
                        paths.push(path);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Could not read {}", e),
            }
        }
    }
    Ok(paths)
}

/// Load settings from a config file or use defaults
///
/// Without an explicit path, `trackless.toml` in the working directory is
/// used when present.
pub fn load_settings(config_path: Option<&Path>) -> Result<AcceptSettings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            AcceptSettings::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => {
            let candidate = Path::new(DEFAULT_CONFIG_FILE);
            if candidate.exists() {
                match AcceptSettings::load(candidate) {
                    Ok(settings) => return Ok(settings),
                    Err(err) => warn!("Ignoring {}: {}", DEFAULT_CONFIG_FILE, err),
                }
            }
            Ok(AcceptSettings::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_accept() {
        let args = vec!["trackless", "accept", "in.docx", "--output", "out.docx"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Accept {
                input,
                output,
                config,
                format,
                no_normalize,
                parallel,
            } => {
                assert_eq!(input, PathBuf::from("in.docx"));
                assert_eq!(output, Some(PathBuf::from("out.docx")));
                assert_eq!(config, None);
                assert_eq!(format, OutputFormat::Text);
                assert!(!no_normalize);
                assert!(!parallel);
            }
            _ => panic!("Expected Accept command"),
        }
    }

    #[test]
    fn test_cli_parse_accept_options() {
        let args = vec![
            "trackless",
            "-vv",
            "accept",
            "in.docx",
            "--config",
            "custom.toml",
            "--format",
            "json",
            "--no-normalize",
            "--parallel",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 2);

        match cli.command {
            Commands::Accept {
                config,
                format,
                no_normalize,
                parallel,
                ..
            } => {
                assert_eq!(config, Some(PathBuf::from("custom.toml")));
                assert_eq!(format, OutputFormat::Json);
                assert!(no_normalize);
                assert!(parallel);
            }
            _ => panic!("Expected Accept command"),
        }
    }

    #[test]
    fn test_cli_parse_check() {
        let args = vec!["trackless", "check", "a.docx", "docs/*.docx", "--strict"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Check {
                patterns,
                format,
                strict,
            } => {
                assert_eq!(patterns, vec!["a.docx", "docs/*.docx"]);
                assert_eq!(format, OutputFormat::Text);
                assert!(strict);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_check_requires_pattern() {
        assert!(Cli::try_parse_from(vec!["trackless", "check"]).is_err());
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("dir/report.docx")),
            PathBuf::from("dir/report.accepted.docx")
        );
        assert_eq!(
            default_output_path(Path::new("template.dotx")),
            PathBuf::from("template.accepted.dotx")
        );
        assert_eq!(
            default_output_path(Path::new("noext")),
            PathBuf::from("noext.accepted.docx")
        );
    }
}
