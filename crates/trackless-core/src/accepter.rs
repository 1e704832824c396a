//! Document-level entry point
//!
//! [`RevisionAccepter`] runs detection, processing and normalization over
//! every selected part of a document and collects a per-part report. The
//! input document is never modified; the accepted document is a new
//! snapshot in which processed parts replace the originals.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};
use trackless_ooxml::{Part, PartKind, WmlDocument};

use crate::context::AcceptContext;
use crate::detector::{has_revisions, malformed_markup};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::normalizer::normalize;
use crate::processor::{AcceptStats, RevisionProcessor};
use crate::settings::AcceptSettings;

/// Outcome of processing one part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartStatus {
    /// The part had no tracked revisions
    Unchanged,
    /// Revisions were accepted
    Accepted,
    /// The part kind is not selected in the settings
    Skipped,
    /// Processing failed; the original content was kept
    Failed {
        /// Error message
        error: String,
    },
}

/// Report for one part
#[derive(Debug, Clone, Serialize)]
pub struct PartReport {
    /// Package path of the part
    pub path: String,
    /// Kind of part
    pub kind: PartKind,
    /// What happened to it
    pub status: PartStatus,
    /// Revision counts; an unchanged part only counts malformed markup
    pub stats: AcceptStats,
    /// Diagnostics recorded for this part
    pub diagnostics: Diagnostics,
}

impl PartReport {
    fn new(part: &Part, status: PartStatus) -> Self {
        Self {
            path: part.path.clone(),
            kind: part.kind,
            status,
            stats: AcceptStats::default(),
            diagnostics: Diagnostics::new(),
        }
    }
}

/// Report for a whole document
#[derive(Debug, Clone, Default, Serialize)]
pub struct AcceptReport {
    /// One entry per part, in document order
    pub parts: Vec<PartReport>,
    /// Diagnostics not tied to a part
    pub diagnostics: Diagnostics,
}

impl AcceptReport {
    /// Whether every part was processed without failure
    pub fn is_success(&self) -> bool {
        self.failed_parts().next().is_none()
    }

    /// Parts whose processing failed
    pub fn failed_parts(&self) -> impl Iterator<Item = &PartReport> {
        self.parts
            .iter()
            .filter(|p| matches!(p.status, PartStatus::Failed { .. }))
    }

    /// Statistics summed over all parts
    pub fn totals(&self) -> AcceptStats {
        let mut totals = AcceptStats::default();
        for part in &self.parts {
            totals.add(&part.stats);
        }
        totals
    }

    /// Every diagnostic in the report, document-level first
    pub fn all_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .chain(self.parts.iter().flat_map(|p| p.diagnostics.iter()))
    }
}

/// Accepted document together with its report
#[derive(Debug, Clone)]
pub struct AcceptOutcome {
    /// The document with all revisions accepted
    pub document: WmlDocument,
    /// What happened to each part
    pub report: AcceptReport,
}

/// Result of accepting a single part
#[derive(Debug, Clone)]
pub struct PartAcceptance {
    /// The processed part (a copy of the input when nothing changed)
    pub part: Part,
    /// What was resolved
    pub stats: AcceptStats,
    /// Warnings and notes recorded while processing
    pub diagnostics: Diagnostics,
    /// Whether the part had revisions to accept
    pub changed: bool,
}

/// Accepts all tracked revisions of a document
///
/// # Example
///
/// ```
/// use trackless_core::RevisionAccepter;
/// use trackless_ooxml::test_utils::DocxBuilder;
///
/// let document = DocxBuilder::new(
///     r#"<w:p><w:ins w:id="1"><w:r><w:t>foo</w:t></w:r></w:ins></w:p>"#,
/// )
/// .into_document()?;
///
/// let outcome = RevisionAccepter::new().normalize(true).accept(&document);
/// assert!(outcome.report.is_success());
/// assert!(!trackless_core::document_has_tracked_revisions(&outcome.document));
/// assert!(trackless_core::document_has_tracked_revisions(&document));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RevisionAccepter {
    settings: AcceptSettings,
}

impl RevisionAccepter {
    /// Create an accepter with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accepter with the given settings
    pub fn with_settings(settings: AcceptSettings) -> Self {
        Self { settings }
    }

    /// Enable or disable the structural normalizer
    pub fn normalize(mut self, enabled: bool) -> Self {
        self.settings.normalize = enabled;
        self
    }

    /// Enable or disable parallel processing of parts
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.settings.parallel = enabled;
        self
    }

    /// Current settings
    pub fn settings(&self) -> &AcceptSettings {
        &self.settings
    }

    /// Accept every revision in the selected parts of a document
    pub fn accept(&self, document: &WmlDocument) -> AcceptOutcome {
        let mut diagnostics = Diagnostics::new();
        let context = match AcceptContext::from_document(document) {
            Ok(context) => context,
            Err(err) => {
                diagnostics.push(
                    Diagnostic::warning(format!("style and numbering definitions unavailable: {err}"))
                        .with_note("style and numbering references are not checked"),
                );
                AcceptContext::new()
            }
        };

        let process = |part: &Part| self.process_part(part, &context);
        let results: Vec<(PartReport, Option<Part>)> = if self.settings.parallel {
            document.parts().par_iter().map(process).collect()
        } else {
            document.parts().iter().map(process).collect()
        };

        let mut accepted = document.clone();
        let mut parts = Vec::with_capacity(results.len());
        for (report, replacement) in results {
            if let Some(part) = replacement {
                accepted.replace_part(part);
            }
            parts.push(report);
        }

        AcceptOutcome {
            document: accepted,
            report: AcceptReport { parts, diagnostics },
        }
    }

    /// Accept every revision in one part
    ///
    /// The input part is not modified. Parts without revisions are returned
    /// as an unchanged copy, with any malformed revision markup reported.
    pub fn accept_part(&self, part: &Part, context: &AcceptContext) -> Result<PartAcceptance> {
        if !has_revisions(&part.content) {
            debug!(part = %part.path, "no tracked revisions");
            let mut stats = AcceptStats::default();
            let mut diagnostics = Diagnostics::new();
            for markup in malformed_markup(&part.content) {
                stats.malformed += 1;
                diagnostics.push(markup.diagnostic().in_part(part.path.as_str()));
            }
            return Ok(PartAcceptance {
                part: part.clone(),
                stats,
                diagnostics,
                changed: false,
            });
        }

        debug!(part = %part.path, "accepting revisions");
        let mut accepted = part.clone();
        let mut processor = RevisionProcessor::new(context);
        let stats = processor.accept(&mut accepted.content)?;
        if self.settings.normalize {
            normalize(&mut accepted.content);
        }

        let mut diagnostics = processor.into_diagnostics();
        diagnostics.assign_part(&part.path);
        Ok(PartAcceptance {
            part: accepted,
            stats,
            diagnostics,
            changed: true,
        })
    }

    /// Whether a selected part of the document carries tracked revisions
    pub fn document_has_tracked_revisions(&self, document: &WmlDocument) -> bool {
        document
            .parts()
            .iter()
            .filter(|p| self.settings.parts.includes(p.kind))
            .any(part_has_tracked_revisions)
    }

    fn process_part(&self, part: &Part, context: &AcceptContext) -> (PartReport, Option<Part>) {
        if !self.settings.parts.includes(part.kind) {
            debug!(part = %part.path, kind = %part.kind, "part not selected");
            return (PartReport::new(part, PartStatus::Skipped), None);
        }

        match self.accept_part(part, context) {
            Ok(acceptance) if !acceptance.changed => {
                let mut report = PartReport::new(part, PartStatus::Unchanged);
                report.stats = acceptance.stats;
                report.diagnostics = acceptance.diagnostics;
                (report, None)
            }
            Ok(acceptance) => {
                let mut report = PartReport::new(part, PartStatus::Accepted);
                report.stats = acceptance.stats;
                report.diagnostics = acceptance.diagnostics;
                (report, Some(acceptance.part))
            }
            Err(err) => {
                warn!(part = %part.path, error = %err, "part left unchanged");
                let mut report = PartReport::new(
                    part,
                    PartStatus::Failed {
                        error: err.to_string(),
                    },
                );
                report
                    .diagnostics
                    .push(Diagnostic::error(err.to_string()).in_part(part.path.as_str()));
                (report, None)
            }
        }
    }
}

/// Accept all revisions of a document with default settings
pub fn accept_revisions(document: &WmlDocument) -> AcceptOutcome {
    RevisionAccepter::new().accept(document)
}

/// Whether a part carries at least one well-formed tracked revision
pub fn part_has_tracked_revisions(part: &Part) -> bool {
    has_revisions(&part.content)
}

/// Whether any part of a document carries tracked revisions
pub fn document_has_tracked_revisions(document: &WmlDocument) -> bool {
    document.parts().iter().any(part_has_tracked_revisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Code;
    use trackless_ooxml::test_utils::{document_part, DocxBuilder};

    #[test]
    fn test_clean_part_is_returned_unchanged() {
        let part = document_part("<w:p><w:r><w:t>plain</w:t></w:r></w:p>").unwrap();
        let acceptance = RevisionAccepter::new()
            .accept_part(&part, &AcceptContext::new())
            .unwrap();
        assert!(!acceptance.changed);
        assert_eq!(acceptance.part, part);
    }

    #[test]
    fn test_malformed_only_part_is_reported() {
        let part = document_part(r#"<w:ins w:id="1"><w:p><w:r><w:t>x</w:t></w:r></w:p></w:ins>"#).unwrap();
        let acceptance = RevisionAccepter::new()
            .accept_part(&part, &AcceptContext::new())
            .unwrap();
        assert!(!acceptance.changed);
        assert_eq!(acceptance.part, part);
        assert_eq!(acceptance.stats.malformed, 1);

        let warnings: Vec<_> = acceptance.diagnostics.iter().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].has_code(Code::MalformedRevision));
        assert_eq!(warnings[0].part.as_deref(), Some("word/document.xml"));
        assert_eq!(warnings[0].location.as_deref(), Some("document/body/ins"));
    }

    #[test]
    fn test_input_part_is_not_modified() {
        let part = document_part(r#"<w:p><w:del w:id="1"><w:r><w:delText>x</w:delText></w:r></w:del></w:p>"#).unwrap();
        let before = part.clone();
        let acceptance = RevisionAccepter::new()
            .accept_part(&part, &AcceptContext::new())
            .unwrap();
        assert!(acceptance.changed);
        assert_eq!(acceptance.stats.deletions, 1);
        assert_eq!(part, before);
        assert!(!part_has_tracked_revisions(&acceptance.part));
    }

    #[test]
    fn test_unselected_parts_are_skipped() {
        let document = DocxBuilder::new("<w:p/>")
            .comments(r#"<w:comment w:id="0"><w:p><w:ins w:id="1"><w:r><w:t>c</w:t></w:r></w:ins></w:p></w:comment>"#)
            .into_document()
            .unwrap();
        let mut settings = AcceptSettings::default();
        settings.parts.comments = false;
        let accepter = RevisionAccepter::with_settings(settings);

        assert!(!accepter.document_has_tracked_revisions(&document));
        assert!(document_has_tracked_revisions(&document));

        let outcome = accepter.accept(&document);
        let statuses: Vec<_> = outcome.report.parts.iter().map(|p| p.status.clone()).collect();
        assert_eq!(statuses, vec![PartStatus::Unchanged, PartStatus::Skipped]);
        assert!(document_has_tracked_revisions(&outcome.document));
    }

    #[test]
    fn test_diagnostics_carry_the_part_path() {
        let document = DocxBuilder::new(r#"<w:ins w:id="1"><w:p/></w:ins><w:p><w:ins w:id="2"><w:r><w:t>a</w:t></w:r></w:ins></w:p>"#)
            .into_document()
            .unwrap();
        let outcome = accept_revisions(&document);
        let warning = outcome.report.all_diagnostics().next().unwrap();
        assert_eq!(warning.part.as_deref(), Some("word/document.xml"));
        assert!(warning.is_warning());
    }
}
