//! Diagnostic result rows
//!
//! One struct per DMV result set. Field names deserialize from the column
//! aliases used by the monitoring queries (PascalCase).

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Text column that may be NULL (plan evicted from cache, text not
/// captured): NULL and a missing key both read as an empty string
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A request that has been running longer than the configured threshold
/// (`sys.dm_exec_requests` joined with `sys.dm_exec_sql_text`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LongRunningQueryInfo {
    pub session_id: i32,
    pub start_time: NaiveDateTime,
    pub status: String,
    pub command: String,
    #[serde(default)]
    pub wait_type: Option<String>,
    /// Milliseconds
    pub wait_time: i64,
    /// Milliseconds
    pub cpu_time: i64,
    /// Milliseconds
    pub total_elapsed_time: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
}

/// An index suggested by the missing-index DMVs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MissingIndexInfo {
    pub database_id: i32,
    pub object_id: i32,
    pub fully_qualified_table_name: String,
    #[serde(default)]
    pub equality_columns: Option<String>,
    #[serde(default)]
    pub inequality_columns: Option<String>,
    #[serde(default)]
    pub included_columns: Option<String>,
    pub avg_total_user_cost: f64,
    /// The CREATE INDEX statement that can be used to create the missing index
    pub create_statement: String,
}

/// A cached query ranked by CPU consumption (`sys.dm_exec_query_stats`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BadQueryInfo {
    pub total_cpu_time: i64,
    pub execution_count: i64,
    pub avg_cpu_time: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sql_text: String,
    /// Raw showplan XML, parsed only when the query is rendered in detail
    #[serde(default, deserialize_with = "null_as_empty")]
    pub query_plan: String,
}
