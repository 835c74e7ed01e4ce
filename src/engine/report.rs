use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of one executed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    Pass,
    Fail,
}

/// Record of one executed check, produced by the test runner and kept only
/// for this run's report.
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    /// Monotonic sequence number across all phases, starting at 0.
    pub sequence: u32,
    /// "host" or "mic<N>".
    pub scope: String,
    pub description: String,
    pub result: TestResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Ok,
    Fail,
}

/// Aggregate of a whole run. Recomputed each invocation; nothing persists.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub tool_version: String,
    pub generated_at: DateTime<Utc>,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub tests_run: u32,
    pub outcomes: Vec<TestOutcome>,
}

impl RunReport {
    pub fn failed(&self) -> bool {
        self.status == RunStatus::Fail
    }
}
