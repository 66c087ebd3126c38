//! Report categories and persisted report documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::diagnostics::{BadQueryInfo, LongRunningQueryInfo, MissingIndexInfo};

/// A category name or tag that names none of the report categories
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown report category: '{0}'")]
pub struct UnknownReportType(pub String);

/// Diagnostic category of a report section.
///
/// Variant order is the order sections appear in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    LongRunningQuery = 1,
    MissingIndex = 2,
    BadQuery = 3,
}

impl ReportType {
    pub const ALL: [ReportType; 3] =
        [ReportType::LongRunningQuery, ReportType::MissingIndex, ReportType::BadQuery];

    /// Numeric tag stored with documents (1, 2, 3)
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::LongRunningQuery => "long_running_query",
            ReportType::MissingIndex => "missing_index",
            ReportType::BadQuery => "bad_query",
        }
    }

    /// Section heading used when the caller has no label of its own
    pub fn default_label(self) -> &'static str {
        match self {
            ReportType::LongRunningQuery => "Long running queries",
            ReportType::MissingIndex => "Missing indexes",
            ReportType::BadQuery => "Top bad queries",
        }
    }

    pub fn singular_noun(self) -> &'static str {
        match self {
            ReportType::LongRunningQuery => "long running query",
            ReportType::MissingIndex => "missing index",
            ReportType::BadQuery => "bad query",
        }
    }

    pub fn plural_noun(self) -> &'static str {
        match self {
            ReportType::LongRunningQuery => "long running queries",
            ReportType::MissingIndex => "missing indexes",
            ReportType::BadQuery => "bad queries",
        }
    }

    pub fn noun(self, count: usize) -> &'static str {
        if count == 1 { self.singular_noun() } else { self.plural_noun() }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = UnknownReportType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "1" | "long_running_query" | "long_running_queries" | "long_running" => {
                Ok(ReportType::LongRunningQuery)
            },
            "2" | "missing_index" | "missing_indexes" => Ok(ReportType::MissingIndex),
            "3" | "bad_query" | "bad_queries" | "top_bad_queries" => Ok(ReportType::BadQuery),
            _ => Err(UnknownReportType(s.to_string())),
        }
    }
}

impl TryFrom<u8> for ReportType {
    type Error = UnknownReportType;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(ReportType::LongRunningQuery),
            2 => Ok(ReportType::MissingIndex),
            3 => Ok(ReportType::BadQuery),
            other => Err(UnknownReportType(other.to_string())),
        }
    }
}

/// The record list of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum DiagnosticRecords {
    LongRunningQuery(Vec<LongRunningQueryInfo>),
    MissingIndex(Vec<MissingIndexInfo>),
    BadQuery(Vec<BadQueryInfo>),
}

impl DiagnosticRecords {
    pub fn report_type(&self) -> ReportType {
        match self {
            DiagnosticRecords::LongRunningQuery(_) => ReportType::LongRunningQuery,
            DiagnosticRecords::MissingIndex(_) => ReportType::MissingIndex,
            DiagnosticRecords::BadQuery(_) => ReportType::BadQuery,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DiagnosticRecords::LongRunningQuery(rows) => rows.len(),
            DiagnosticRecords::MissingIndex(rows) => rows.len(),
            DiagnosticRecords::BadQuery(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<LongRunningQueryInfo>> for DiagnosticRecords {
    fn from(rows: Vec<LongRunningQueryInfo>) -> Self {
        DiagnosticRecords::LongRunningQuery(rows)
    }
}

impl From<Vec<MissingIndexInfo>> for DiagnosticRecords {
    fn from(rows: Vec<MissingIndexInfo>) -> Self {
        DiagnosticRecords::MissingIndex(rows)
    }
}

impl From<Vec<BadQueryInfo>> for DiagnosticRecords {
    fn from(rows: Vec<BadQueryInfo>) -> Self {
        DiagnosticRecords::BadQuery(rows)
    }
}

/// The three result sets collected in one monitoring cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSnapshot {
    pub long_running_queries: Vec<LongRunningQueryInfo>,
    pub missing_indexes: Vec<MissingIndexInfo>,
    pub bad_queries: Vec<BadQueryInfo>,
}

impl DiagnosticSnapshot {
    pub fn records_for(&self, report_type: ReportType) -> DiagnosticRecords {
        match report_type {
            ReportType::LongRunningQuery => self.long_running_queries.clone().into(),
            ReportType::MissingIndex => self.missing_indexes.clone().into(),
            ReportType::BadQuery => self.bad_queries.clone().into(),
        }
    }
}

/// A finished report section as handed to the document sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub report_type: ReportType,
    pub label: String,
    pub narrative: String,
    pub records: DiagnosticRecords,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_type_order_is_fixed() {
        let mut types =
            vec![ReportType::BadQuery, ReportType::LongRunningQuery, ReportType::MissingIndex];
        types.sort();
        assert_eq!(types, ReportType::ALL.to_vec());
    }

    #[test]
    fn test_report_type_parse() {
        assert_eq!("missing-index".parse::<ReportType>().unwrap(), ReportType::MissingIndex);
        assert_eq!(
            "Long_Running_Queries".parse::<ReportType>().unwrap(),
            ReportType::LongRunningQuery
        );
        assert_eq!(ReportType::try_from(3).unwrap(), ReportType::BadQuery);
        assert_eq!(ReportType::BadQuery.tag(), 3);
    }

    #[test]
    fn test_report_type_unknown_tag() {
        assert_eq!(
            "deadlocks".parse::<ReportType>(),
            Err(UnknownReportType("deadlocks".to_string()))
        );
        assert_eq!(ReportType::try_from(9), Err(UnknownReportType("9".to_string())));
    }

    #[test]
    fn test_noun_plurality() {
        assert_eq!(ReportType::MissingIndex.noun(1), "missing index");
        assert_eq!(ReportType::MissingIndex.noun(2), "missing indexes");
        assert_eq!(ReportType::BadQuery.noun(0), "bad queries");
    }

    #[test]
    fn test_snapshot_records_for_matches_category() {
        let snapshot = DiagnosticSnapshot::default();
        for report_type in ReportType::ALL {
            let records = snapshot.records_for(report_type);
            assert_eq!(records.report_type(), report_type);
            assert!(records.is_empty());
        }
    }

    #[test]
    fn test_document_serializes_camel_case() {
        let doc = ReportDocument {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            report_type: ReportType::MissingIndex,
            label: "Missing indexes".to_string(),
            narrative: "No missing indexes found.".to_string(),
            records: DiagnosticRecords::MissingIndex(vec![]),
        };

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["reportType"], "missing_index");
        assert_eq!(value["records"]["kind"], "missing_index");
        assert!(value.get("createdAt").is_some());

        let back: ReportDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc);
    }
}
