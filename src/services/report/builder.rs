//! Report builder
//!
//! Collects the record lists of one cycle and assembles the report text and
//! one document per category.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::{ReportError, ReportResult};
use super::narrative::format_narrative;
use crate::models::{DiagnosticRecords, DiagnosticSnapshot, ReportDocument, ReportType};

/// Horizontal rule under each section header
const SECTION_RULE_WIDTH: usize = 80;

/// One-line section header: "Found {N} {label}."
pub fn section_header(label: &str, count: usize) -> String {
    format!("Found {} {}.", count, label)
}

/// Report text plus the documents to persist
#[derive(Debug, Clone)]
pub struct Report {
    pub text: String,
    pub documents: Vec<ReportDocument>,
}

struct Section {
    report_type: ReportType,
    label: String,
    records: DiagnosticRecords,
}

/// Accumulates categories for one reporting cycle.
///
/// Sections come out in category order no matter the order they were added.
#[derive(Default)]
pub struct ReportBuilder {
    sections: Vec<Section>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the records of one category
    ///
    /// Fails when the records belong to another category or the category is
    /// already present.
    pub fn add(
        &mut self,
        report_type: ReportType,
        label: impl Into<String>,
        records: impl Into<DiagnosticRecords>,
    ) -> ReportResult<&mut Self> {
        let records = records.into();
        if records.report_type() != report_type {
            return Err(ReportError::CategoryMismatch {
                expected: report_type,
                found: records.report_type(),
            });
        }
        if self.sections.iter().any(|s| s.report_type == report_type) {
            return Err(ReportError::DuplicateCategory(report_type));
        }

        tracing::debug!("Adding {} {} to report", records.len(), report_type.plural_noun());
        self.sections.push(Section { report_type, label: label.into(), records });
        Ok(self)
    }

    /// Add the given categories of a snapshot under their default labels
    pub fn add_snapshot(
        &mut self,
        snapshot: &DiagnosticSnapshot,
        categories: &[ReportType],
    ) -> ReportResult<&mut Self> {
        for &report_type in categories {
            self.add(report_type, report_type.default_label(), snapshot.records_for(report_type))?;
        }
        Ok(self)
    }

    pub fn build(self) -> Report {
        self.build_at(Utc::now())
    }

    /// Build with an explicit creation timestamp for every document
    pub fn build_at(mut self, created_at: DateTime<Utc>) -> Report {
        self.sections.sort_by_key(|s| s.report_type);

        let rule = "-".repeat(SECTION_RULE_WIDTH);
        let mut text = String::new();
        let mut documents = Vec::with_capacity(self.sections.len());

        for section in self.sections {
            let narrative = format_narrative(&section.records);

            text.push_str(&section_header(&section.label, section.records.len()));
            text.push('\n');
            text.push_str(&rule);
            text.push('\n');
            text.push_str(&narrative);
            text.push_str("\n\n");

            documents.push(ReportDocument {
                id: Uuid::new_v4(),
                created_at,
                report_type: section.report_type,
                label: section.label,
                narrative,
                records: section.records,
            });
        }

        Report { text, documents }
    }
}
