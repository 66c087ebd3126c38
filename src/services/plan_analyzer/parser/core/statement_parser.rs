//! Statement parser for showplan XML
//!
//! Extracts the text and estimated cost of each `<StmtSimple>` in a batch plan.

use super::attribute_parser::{AttributeParser, Attributes};
use crate::services::plan_analyzer::models::PlanStatement;
use crate::services::plan_analyzer::parser::error::ParseResult;
use once_cell::sync::Lazy;
use regex::Regex;

const ELEMENT: &str = "StmtSimple";

static STMT_REGEX: Lazy<Regex> = Lazy::new(|| AttributeParser::element_regex(ELEMENT));

/// Parser for plan statements
pub struct StatementParser;

impl StatementParser {
    /// Extract every statement that carries both text and a numeric cost
    pub fn extract_statements(plan: &str) -> Vec<PlanStatement> {
        AttributeParser::scan_elements(plan, &STMT_REGEX)
            .iter()
            .filter_map(|attrs| {
                Self::parse_statement(attrs)
                    .inspect_err(|e| tracing::trace!("Skipping StmtSimple: {}", e))
                    .ok()
            })
            .collect()
    }

    pub fn parse_statement(attrs: &Attributes) -> ParseResult<PlanStatement> {
        Ok(PlanStatement {
            text: AttributeParser::text(attrs, ELEMENT, &["StatementText"])?.trim().to_string(),
            estimated_cost: AttributeParser::metric(
                attrs,
                ELEMENT,
                &["StatementSubTreeCost", "EstimatedSubtreeCost"],
            )?,
            is_above_average_cost: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_statements() {
        let plan = r#"
            <Statements>
              <StmtSimple StatementCompId="1" StatementEstRows="1" StatementId="1" StatementSubTreeCost="0.0032831" StatementText="SELECT * FROM dbo.Orders WHERE Id = @p0 AND Total &gt; 10" StatementType="SELECT">
              </StmtSimple>
              <StmtSimple StatementId="2" StatementText="SET NOCOUNT ON" StatementType="SET ON/OFF" />
            </Statements>"#;

        let statements = StatementParser::extract_statements(plan);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].text, "SELECT * FROM dbo.Orders WHERE Id = @p0 AND Total > 10");
        assert_eq!(statements[0].estimated_cost, 0.0032831);
    }

    #[test]
    fn test_legacy_cost_attribute() {
        let plan = r#"<StmtSimple StatementText="SELECT 1" EstimatedSubtreeCost="2.5"></StmtSimple>"#;
        let statements = StatementParser::extract_statements(plan);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].estimated_cost, 2.5);
    }
}
