//! SQL Server Plan Analyzer
//!
//! Parses showplan XML into per-operator and per-statement cost records and
//! flags the ones whose cost is at or above the plan's mean.
//!
//! # Architecture
//!
//! ```text
//!   raw showplan text
//!          │
//!          ▼
//!   ┌──────────────┐   AttributeParser  (<Element Name="value" ...>)
//!   │ PlanComposer │── OperatorParser   (<RelOp>)
//!   └──────────────┘   StatementParser  (<StmtSimple>)
//!          │
//!          ▼
//!   ┌────────────────┐
//!   │ CostClassifier │  mean cost, >= mean flag, descending stable sort
//!   └────────────────┘
//!          │
//!          ▼
//!     PlanAnalysis
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use sqlmon::services::plan_analyzer::analyze_plan;
//!
//! let analysis = analyze_plan(&bad_query.query_plan);
//! for op in analysis.costly_operators() {
//!     println!("{} ({})", op.physical_op, op.estimated_subtree_cost);
//! }
//! ```
//!
//! Malformed elements are dropped rather than reported; a plan with nothing
//! usable produces an empty analysis.

pub mod analyzer;
pub mod models;
pub mod parser;


pub use analyzer::CostClassifier;
pub use models::*;
pub use parser::PlanComposer;

/// Parse and classify a plan document
pub fn analyze_plan(plan: &str) -> PlanAnalysis {
    let parsed = PlanComposer::parse(plan);
    PlanAnalysis {
        statements: CostClassifier::classify(parsed.statements),
        operators: CostClassifier::classify(parsed.operators),
    }
}

/// Operators of a plan, classified and ordered by descending subtree cost
pub fn extract_operators(plan: &str) -> Vec<OperatorCostRecord> {
    CostClassifier::classify(PlanComposer::parse(plan).operators)
}
