//! Operator parser for showplan XML
//!
//! Extracts the cost estimates of every `<RelOp>` element.

use super::attribute_parser::{AttributeParser, Attributes};
use crate::services::plan_analyzer::models::OperatorCostRecord;
use crate::services::plan_analyzer::parser::error::ParseResult;
use once_cell::sync::Lazy;
use regex::Regex;

const ELEMENT: &str = "RelOp";

static RELOP_REGEX: Lazy<Regex> = Lazy::new(|| AttributeParser::element_regex(ELEMENT));

/// Parser for plan operators
pub struct OperatorParser;

impl OperatorParser {
    /// Extract every well-formed operator in document order.
    ///
    /// Operators missing a required attribute, or carrying a value that is not
    /// a non-negative number, are skipped.
    pub fn extract_operators(plan: &str) -> Vec<OperatorCostRecord> {
        AttributeParser::scan_elements(plan, &RELOP_REGEX)
            .iter()
            .enumerate()
            .filter_map(|(index, attrs)| match Self::parse_operator(attrs) {
                Ok(op) => Some(op),
                Err(e) => {
                    tracing::trace!("Skipping RelOp #{}: {}", index, e);
                    None
                },
            })
            .collect()
    }

    /// Build an operator record from the attributes of one `<RelOp>` tag
    pub fn parse_operator(attrs: &Attributes) -> ParseResult<OperatorCostRecord> {
        Ok(OperatorCostRecord {
            physical_op: AttributeParser::text(attrs, ELEMENT, &["PhysicalOp"])?.to_string(),
            logical_op: AttributeParser::text(attrs, ELEMENT, &["LogicalOp"])?.to_string(),
            estimate_rows: AttributeParser::metric(attrs, ELEMENT, &["EstimateRows"])?,
            estimate_rows_read: AttributeParser::metric(
                attrs,
                ELEMENT,
                &["EstimatedRowsRead", "EstimateRowsRead"],
            )?,
            estimate_io: AttributeParser::metric(attrs, ELEMENT, &["EstimateIO"])?,
            estimate_cpu: AttributeParser::metric(attrs, ELEMENT, &["EstimateCPU"])?,
            avg_row_size: AttributeParser::metric(attrs, ELEMENT, &["AvgRowSize"])?,
            estimated_subtree_cost: AttributeParser::metric(
                attrs,
                ELEMENT,
                &["EstimatedTotalSubtreeCost"],
            )?,
            execution_mode: AttributeParser::text(attrs, ELEMENT, &["EstimatedExecutionMode"])?
                .to_string(),
            is_above_average_cost: false,
        })
    }
}
