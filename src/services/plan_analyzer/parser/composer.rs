//! Plan composer
//!
//! Runs the element parsers over one plan document.

use crate::services::plan_analyzer::models::{OperatorCostRecord, PlanStatement};
use crate::services::plan_analyzer::parser::core::{OperatorParser, StatementParser};

/// Unclassified records of one plan, in document order
#[derive(Debug, Clone, Default)]
pub struct ParsedPlan {
    pub statements: Vec<PlanStatement>,
    pub operators: Vec<OperatorCostRecord>,
}

pub struct PlanComposer;

impl PlanComposer {
    /// Parse a raw showplan document.
    ///
    /// Blank input yields an empty plan; so does text with no recognizable
    /// elements.
    pub fn parse(plan: &str) -> ParsedPlan {
        if plan.trim().is_empty() {
            return ParsedPlan::default();
        }

        let statements = StatementParser::extract_statements(plan);
        let operators = OperatorParser::extract_operators(plan);
        tracing::trace!(
            "Parsed plan: {} statements, {} operators",
            statements.len(),
            operators.len()
        );

        ParsedPlan { statements, operators }
    }
}
