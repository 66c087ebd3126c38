//! Plan analysis data models
//!
//! Records extracted from a SQL Server showplan document. They are immutable:
//! the above-average flag is filled in when the classifier rebuilds the set.

use serde::{Deserialize, Serialize};

/// Anything the cost classifier can rank
pub trait CostedItem: Sized {
    /// Estimated cost used for ranking and the mean
    fn cost(&self) -> f64;

    /// Return a copy carrying the given above-average flag
    fn with_above_average(self, above_average: bool) -> Self;
}

// ============================================================================
// Operator (RelOp)
// ============================================================================

/// Cost estimates of one plan operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorCostRecord {
    pub physical_op: String,
    pub logical_op: String,
    pub estimate_rows: f64,
    pub estimate_rows_read: f64,
    pub estimate_io: f64,
    pub estimate_cpu: f64,
    pub avg_row_size: f64,
    pub estimated_subtree_cost: f64,
    /// Row or Batch
    pub execution_mode: String,
    #[serde(default)]
    pub is_above_average_cost: bool,
}

impl CostedItem for OperatorCostRecord {
    fn cost(&self) -> f64 {
        self.estimated_subtree_cost
    }

    fn with_above_average(self, above_average: bool) -> Self {
        Self { is_above_average_cost: above_average, ..self }
    }
}

// ============================================================================
// Statement (StmtSimple)
// ============================================================================

/// One statement of a batch plan with its estimated cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatement {
    pub text: String,
    pub estimated_cost: f64,
    #[serde(default)]
    pub is_above_average_cost: bool,
}

impl CostedItem for PlanStatement {
    fn cost(&self) -> f64 {
        self.estimated_cost
    }

    fn with_above_average(self, above_average: bool) -> Self {
        Self { is_above_average_cost: above_average, ..self }
    }
}

// ============================================================================
// Analysis result
// ============================================================================

/// Classified statements and operators of one plan, each ordered by
/// descending cost
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAnalysis {
    pub statements: Vec<PlanStatement>,
    pub operators: Vec<OperatorCostRecord>,
}

impl PlanAnalysis {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.operators.is_empty()
    }

    /// Operators flagged at or above the mean subtree cost
    pub fn costly_operators(&self) -> impl Iterator<Item = &OperatorCostRecord> {
        self.operators.iter().filter(|op| op.is_above_average_cost)
    }

    /// Statements flagged at or above the mean statement cost
    pub fn costly_statements(&self) -> impl Iterator<Item = &PlanStatement> {
        self.statements.iter().filter(|stmt| stmt.is_above_average_cost)
    }
}
