//! Narrative formatter
//!
//! Renders one text block per diagnostic category: a count sentence, the
//! top-by-metric lines and, for bad queries, the execution-count callout and
//! the costly operators of each rendered plan.

use crate::models::{
    BadQueryInfo, DiagnosticRecords, LongRunningQueryInfo, MissingIndexInfo, ReportType,
};
use crate::services::plan_analyzer::{OperatorCostRecord, PlanStatement, analyze_plan};
use crate::utils::StringExt;

/// Query and index text rendered inline is cut to this many characters
pub const INLINE_TEXT_LIMIT: usize = 100;

/// Upper bound of top-by-metric lines per category
pub const MAX_TOP_LINES: usize = 3;

pub const NO_PLAN_FOUND: &str = "No query plan found.";

pub const MOST_EXECUTED_IS_TOP_CPU: &str =
    "The most executed query is also the query with the highest average CPU time.";

// ============================================================================
// Ranking metrics
// ============================================================================

/// A ranking metric: display label and unit paired with the accessor
pub struct MetricDescriptor<T> {
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub value: fn(&T) -> f64,
}

impl<T> MetricDescriptor<T> {
    pub fn format_value(&self, row: &T) -> String {
        let value = (self.value)(row);
        match self.unit {
            Some(unit) => format!("{} {}", value, unit),
            None => value.to_string(),
        }
    }
}

fn cpu_time(q: &LongRunningQueryInfo) -> f64 {
    q.cpu_time as f64
}

fn wait_time(q: &LongRunningQueryInfo) -> f64 {
    q.wait_time as f64
}

fn total_elapsed_time(q: &LongRunningQueryInfo) -> f64 {
    q.total_elapsed_time as f64
}

fn avg_total_user_cost(ix: &MissingIndexInfo) -> f64 {
    ix.avg_total_user_cost
}

fn avg_cpu_time(q: &BadQueryInfo) -> f64 {
    q.avg_cpu_time as f64
}

fn execution_count(q: &BadQueryInfo) -> f64 {
    q.execution_count as f64
}

pub const LONG_RUNNING_METRICS: &[MetricDescriptor<LongRunningQueryInfo>] = &[
    MetricDescriptor { label: "CPU time", unit: Some("ms"), value: cpu_time },
    MetricDescriptor { label: "wait time", unit: Some("ms"), value: wait_time },
    MetricDescriptor { label: "total elapsed time", unit: Some("ms"), value: total_elapsed_time },
];

pub const MISSING_INDEX_METRICS: &[MetricDescriptor<MissingIndexInfo>] = &[MetricDescriptor {
    label: "average total user cost",
    unit: None,
    value: avg_total_user_cost,
}];

pub const BAD_QUERY_METRICS: &[MetricDescriptor<BadQueryInfo>] =
    &[MetricDescriptor { label: "average CPU time", unit: None, value: avg_cpu_time }];

const EXECUTION_COUNT: MetricDescriptor<BadQueryInfo> =
    MetricDescriptor { label: "execution count", unit: None, value: execution_count };

/// Rows ordered by descending metric value, paired with their input index.
/// Equal values keep input order.
pub fn rank_by<'a, T>(rows: &'a [T], metric: &MetricDescriptor<T>) -> Vec<(usize, &'a T)> {
    let mut ranked: Vec<(usize, &T)> = rows.iter().enumerate().collect();
    ranked.sort_by(|a, b| (metric.value)(b.1).total_cmp(&(metric.value)(a.1)));
    ranked
}

/// One top-by-metric selection
pub struct TopPick<'a, T> {
    /// 1-based rank within the metric's ordering
    pub rank: usize,
    pub index: usize,
    pub row: &'a T,
    pub metric: &'a MetricDescriptor<T>,
}

impl<T> TopPick<'_, T> {
    pub fn heading(&self) -> String {
        format!(
            "Query with {} max {} ({})",
            ordinal(self.rank),
            self.metric.label,
            self.metric.format_value(self.row)
        )
    }
}

/// The i-th line takes the i-th metric and reports the row holding rank i+1
/// for it. At most `MAX_TOP_LINES`, never more than rows or metrics.
pub fn top_picks<'a, T>(rows: &'a [T], metrics: &'a [MetricDescriptor<T>]) -> Vec<TopPick<'a, T>> {
    let count = MAX_TOP_LINES.min(rows.len()).min(metrics.len());
    metrics
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, metric)| {
            let (index, row) = rank_by(rows, metric)[i];
            TopPick { rank: i + 1, index, row, metric }
        })
        .collect()
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 21st ...
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

// ============================================================================
// Category narratives
// ============================================================================

/// Render the narrative block of one category
pub fn format_narrative(records: &DiagnosticRecords) -> String {
    let lines = match records {
        DiagnosticRecords::LongRunningQuery(rows) => long_running_lines(rows),
        DiagnosticRecords::MissingIndex(rows) => missing_index_lines(rows),
        DiagnosticRecords::BadQuery(rows) => bad_query_lines(rows),
    };
    lines.join("\n")
}

/// "Found N ..." or "No ... found."
pub fn count_sentence(report_type: ReportType, count: usize) -> String {
    if count == 0 {
        format!("No {} found.", report_type.plural_noun())
    } else {
        format!("Found {} {}.", count, report_type.noun(count))
    }
}

fn long_running_lines(rows: &[LongRunningQueryInfo]) -> Vec<String> {
    let mut lines = vec![count_sentence(ReportType::LongRunningQuery, rows.len())];
    for pick in top_picks(rows, LONG_RUNNING_METRICS) {
        lines.push(format!("{}: {}", pick.heading(), describe_long_running(pick.row)));
    }
    lines
}

fn describe_long_running(q: &LongRunningQueryInfo) -> String {
    format!(
        "session {} started at {}, status {}, command {}, wait type {}, \
         wait time {} ms, CPU time {} ms, elapsed {} ms. Text: {}",
        q.session_id,
        q.start_time.format("%Y-%m-%d %H:%M:%S"),
        q.status.or_placeholder("unknown"),
        q.command.or_placeholder("unknown"),
        q.wait_type.or_placeholder("none"),
        q.wait_time,
        q.cpu_time,
        q.total_elapsed_time,
        q.text.inline_preview(INLINE_TEXT_LIMIT),
    )
}

fn missing_index_lines(rows: &[MissingIndexInfo]) -> Vec<String> {
    let mut lines = vec![count_sentence(ReportType::MissingIndex, rows.len())];
    for pick in top_picks(rows, MISSING_INDEX_METRICS) {
        let ix = pick.row;
        lines.push(format!(
            "{}: table {} (equality: {}, inequality: {}, included: {}). Suggested index: {}",
            pick.heading(),
            ix.fully_qualified_table_name,
            ix.equality_columns.or_placeholder("none"),
            ix.inequality_columns.or_placeholder("none"),
            ix.included_columns.or_placeholder("none"),
            ix.create_statement.inline_preview(INLINE_TEXT_LIMIT),
        ));
        lines.push(ix.create_statement.trim().to_string());
    }
    lines
}

fn bad_query_lines(rows: &[BadQueryInfo]) -> Vec<String> {
    let mut lines = vec![count_sentence(ReportType::BadQuery, rows.len())];
    let picks = top_picks(rows, BAD_QUERY_METRICS);
    for pick in &picks {
        lines.push(format!("{}: {}", pick.heading(), describe_bad_query(pick.row)));
        lines.extend(plan_lines(&pick.row.query_plan));
    }

    // Cross-check the costliest query against the most executed one
    let (Some(top_cpu), Some(&(most_executed_idx, most_executed))) =
        (picks.first(), rank_by(rows, &EXECUTION_COUNT).first())
    else {
        return lines;
    };

    if most_executed_idx == top_cpu.index {
        lines.push(MOST_EXECUTED_IS_TOP_CPU.to_string());
    } else {
        lines.push(format!(
            "Most executed query ({} executions): {}",
            most_executed.execution_count,
            describe_bad_query(most_executed)
        ));
        lines.extend(plan_lines(&most_executed.query_plan));
    }
    lines
}

fn describe_bad_query(q: &BadQueryInfo) -> String {
    format!(
        "executed {} times, total CPU time {}, average CPU time {}. SQL: {}",
        q.execution_count,
        q.total_cpu_time,
        q.avg_cpu_time,
        q.sql_text.inline_preview(INLINE_TEXT_LIMIT),
    )
}

/// Costly statements (multi-statement plans only) and costly operators of a
/// plan, or the no-plan line when it has no operators
pub fn plan_lines(plan: &str) -> Vec<String> {
    let analysis = analyze_plan(plan);
    let mut lines = Vec::new();

    if analysis.statements.len() > 1 {
        lines.push("Costliest statements in this plan:".to_string());
        lines.extend(analysis.costly_statements().map(format_statement));
    }

    if analysis.operators.is_empty() {
        lines.push(NO_PLAN_FOUND.to_string());
    } else {
        lines.push("Operators at or above the average cost:".to_string());
        lines.extend(analysis.costly_operators().map(format_operator));
    }
    lines
}

/// Bullet line of one costly operator
pub fn format_operator(op: &OperatorCostRecord) -> String {
    format!(
        "- PhysicalOp: {} / LogicalOp: {} / Cost: {} / Exec Mode: {} / \
         Estimated Rows Read {} / Estimated Rows: {} \
         (avg size: {} / Estimated IO: {} / Estimated CPU: {})",
        op.physical_op,
        op.logical_op,
        op.estimated_subtree_cost,
        op.execution_mode,
        op.estimate_rows_read,
        op.estimate_rows,
        op.avg_row_size,
        op.estimate_io,
        op.estimate_cpu,
    )
}

fn format_statement(stmt: &PlanStatement) -> String {
    format!("* Cost: {} / {}", stmt.estimated_cost, stmt.text.inline_preview(INLINE_TEXT_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal() {
        let got: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 101, 111].iter().map(|n| ordinal(*n)).collect();
        assert_eq!(
            got,
            vec!["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "101st", "111th"]
        );
    }

    #[test]
    fn test_count_sentence() {
        assert_eq!(count_sentence(ReportType::LongRunningQuery, 0), "No long running queries found.");
        assert_eq!(count_sentence(ReportType::MissingIndex, 1), "Found 1 missing index.");
        assert_eq!(count_sentence(ReportType::BadQuery, 4), "Found 4 bad queries.");
    }

    #[test]
    fn test_metric_value_formatting() {
        let ix = MissingIndexInfo {
            database_id: 1,
            object_id: 2,
            fully_qualified_table_name: "[db].[dbo].[t]".into(),
            equality_columns: None,
            inequality_columns: None,
            included_columns: None,
            avg_total_user_cost: 42.5,
            create_statement: "CREATE INDEX ix ON t (a)".into(),
        };
        assert_eq!(MISSING_INDEX_METRICS[0].format_value(&ix), "42.5");
    }

    #[test]
    fn test_rank_by_is_stable() {
        let rows = [
            BadQueryInfo { total_cpu_time: 1, execution_count: 5, avg_cpu_time: 1, sql_text: "a".into(), query_plan: String::new() },
            BadQueryInfo { total_cpu_time: 1, execution_count: 9, avg_cpu_time: 1, sql_text: "b".into(), query_plan: String::new() },
            BadQueryInfo { total_cpu_time: 1, execution_count: 9, avg_cpu_time: 1, sql_text: "c".into(), query_plan: String::new() },
        ];
        let order: Vec<usize> = rank_by(&rows, &EXECUTION_COUNT).iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_plan_lines_without_plan() {
        assert_eq!(plan_lines(""), vec![NO_PLAN_FOUND.to_string()]);
    }
}
