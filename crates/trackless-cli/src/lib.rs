//! trackless CLI - Command-line interface library
//!
//! This library provides the CLI functionality for trackless:
//! - Accept: accept every tracked change in a DOCX file
//! - Check: report which documents still carry tracked changes
//!
//! # Library Usage
//!
//! ```ignore
//! use trackless_cli::{accept_command, check_command, OutputFormat};
//! use trackless_core::AcceptSettings;
//!
//! accept_command(&input, None, &AcceptSettings::default(), OutputFormat::Text)?;
//! check_command(&["drafts/*.docx".to_string()], OutputFormat::Json, false)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Accept all changes, writing report.accepted.docx
//! trackless accept report.docx
//!
//! # Fail a CI job when any document still has tracked changes
//! trackless check "docs/**/*.docx" --strict
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{accept_command, check_command, load_settings, run_cli};
pub use app::{default_output_path, CheckResult, OutputFormat};
