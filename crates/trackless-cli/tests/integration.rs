//! Integration tests for the trackless CLI
//!
//! These tests write generated packages to a temporary directory and drive
//! the command functions the binary dispatches to.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use trackless_cli::{accept_command, check_command, load_settings, OutputFormat};
use trackless_core::{document_has_tracked_revisions, AcceptSettings, PartStatus};
use trackless_ooxml::test_utils::DocxBuilder;
use trackless_ooxml::WmlDocument;

const REVISED_BODY: &str = concat!(
    r#"<w:p><w:pPr><w:rPr><w:del w:id="1"/></w:rPr></w:pPr><w:r><w:t>Hello</w:t></w:r></w:p>"#,
    r#"<w:p><w:ins w:id="2"><w:r><w:t>World</w:t></w:r></w:ins><w:del w:id="3"><w:r><w:delText>!</w:delText></w:r></w:del></w:p>"#,
);

fn write_docx(dir: &Path, name: &str, builder: DocxBuilder) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, builder.build().unwrap()).unwrap();
    path
}

#[test]
fn test_accept_writes_default_output() {
    let dir = TempDir::new().unwrap();
    let input = write_docx(
        dir.path(),
        "report.docx",
        DocxBuilder::new(REVISED_BODY).header(r#"<w:p><w:ins w:id="9"><w:r><w:t>Draft</w:t></w:r></w:ins></w:p>"#),
    );

    let report = accept_command(&input, None, &AcceptSettings::default(), OutputFormat::Text).unwrap();
    assert!(report.is_success());
    assert_eq!(report.parts[0].status, PartStatus::Accepted);

    let output = dir.path().join("report.accepted.docx");
    assert!(output.exists());

    let accepted = WmlDocument::open(&output).unwrap();
    assert!(!document_has_tracked_revisions(&accepted));
    assert_eq!(
        accepted.main_document().unwrap().content.root.text(),
        "HelloWorld"
    );
    let header = accepted.part("word/header1.xml").unwrap();
    assert_eq!(header.content.root.text(), "Draft");

    // The input is left as it was
    let original = WmlDocument::open(&input).unwrap();
    assert!(document_has_tracked_revisions(&original));
}

#[test]
fn test_accept_explicit_output_and_json() {
    let dir = TempDir::new().unwrap();
    let input = write_docx(dir.path(), "in.docx", DocxBuilder::new(REVISED_BODY));
    let output = dir.path().join("nested-out.docx");

    let report = accept_command(&input, Some(output.as_path()), &AcceptSettings::default(), OutputFormat::Json).unwrap();
    assert!(output.exists());
    assert!(!dir.path().join("in.accepted.docx").exists());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["parts"][0]["stats"]["merged_paragraphs"], 1);
}

#[test]
fn test_accept_fails_on_structural_error_but_writes_output() {
    let dir = TempDir::new().unwrap();
    let input = write_docx(
        dir.path(),
        "broken.docx",
        DocxBuilder::new(
            r#"<w:tbl><w:tblGrid><w:gridCol/></w:tblGrid><w:tr><w:tc><w:tcPr><w:cellDel w:id="1"/></w:tcPr><w:p/></w:tc></w:tr></w:tbl><w:p/>"#,
        )
        .footer(r#"<w:p><w:del w:id="2"><w:r><w:delText>x</w:delText></w:r></w:del></w:p>"#),
    );

    let err = accept_command(&input, None, &AcceptSettings::default(), OutputFormat::Text).unwrap_err();
    assert!(err.to_string().contains("1 part(s)"));

    let accepted = WmlDocument::open(dir.path().join("broken.accepted.docx")).unwrap();
    let footer = accepted.part("word/footer1.xml").unwrap();
    assert!(!trackless_core::part_has_tracked_revisions(footer));
    assert!(trackless_core::part_has_tracked_revisions(accepted.main_document().unwrap()));
}

#[test]
fn test_accept_missing_input() {
    let dir = TempDir::new().unwrap();
    let err = accept_command(
        &dir.path().join("absent.docx"),
        None,
        &AcceptSettings::default(),
        OutputFormat::Text,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
}

#[test]
fn test_accept_respects_part_selection() {
    let dir = TempDir::new().unwrap();
    let input = write_docx(
        dir.path(),
        "comments.docx",
        DocxBuilder::new("<w:p/>").comments(
            r#"<w:comment w:id="0"><w:p><w:ins w:id="1"><w:r><w:t>note</w:t></w:r></w:ins></w:p></w:comment>"#,
        ),
    );
    let config = dir.path().join("trackless.toml");
    fs::write(&config, "[parts]\ncomments = false\n").unwrap();

    let settings = load_settings(Some(config.as_path())).unwrap();
    let report = accept_command(&input, None, &settings, OutputFormat::Text).unwrap();
    assert_eq!(report.parts[1].status, PartStatus::Skipped);

    let accepted = WmlDocument::open(dir.path().join("comments.accepted.docx")).unwrap();
    assert!(document_has_tracked_revisions(&accepted));
}

#[test]
fn test_load_settings_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");
    assert!(load_settings(Some(missing.as_path())).is_err());

    let invalid = dir.path().join("invalid.toml");
    fs::write(&invalid, "normalize = 3").unwrap();
    let err = load_settings(Some(invalid.as_path())).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load config"));
}

#[test]
fn test_check_reports_each_document() {
    let dir = TempDir::new().unwrap();
    write_docx(dir.path(), "a-revised.docx", DocxBuilder::new(REVISED_BODY));
    write_docx(dir.path(), "b-clean.docx", DocxBuilder::new("<w:p><w:r><w:t>done</w:t></w:r></w:p>"));

    let pattern = dir.path().join("*.docx").display().to_string();
    let results = check_command(&[pattern.clone()], OutputFormat::Text, false).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].path.ends_with("a-revised.docx"));
    assert!(results[0].has_revisions);
    assert_eq!(results[0].census.insertions, 1);
    assert_eq!(results[0].census.deletions, 1);
    assert_eq!(results[0].census.paragraph_marks, 1);
    assert!(!results[1].has_revisions);

    let err = check_command(&[pattern], OutputFormat::Json, true).unwrap_err();
    assert!(err.to_string().contains("1 document(s)"));
}

#[test]
fn test_check_strict_passes_on_clean_documents() {
    let dir = TempDir::new().unwrap();
    let clean = write_docx(dir.path(), "clean.docx", DocxBuilder::new("<w:p/>"));
    let results = check_command(&[clean.display().to_string()], OutputFormat::Text, true).unwrap();
    assert_eq!(results.len(), 1);
    assert!(!results[0].has_revisions);
}

#[test]
fn test_check_unreadable_and_unmatched() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("bogus.docx");
    fs::write(&bogus, b"not a zip").unwrap();
    let err = check_command(&[bogus.display().to_string()], OutputFormat::Text, false).unwrap_err();
    assert!(err.to_string().contains("could not be read"));

    let nothing = dir.path().join("*.none").display().to_string();
    let err = check_command(&[nothing], OutputFormat::Text, false).unwrap_err();
    assert!(err.to_string().contains("No documents match"));
}
