// Copyright (c) 2026 - present Allure MCP contributors
// SPDX-License-Identifier: MIT

//! Normalized suite/test-case/step tree
//!
//! Both on-disk layouts (generated report and raw results) are parsed into
//! this single structure. The tree is built fresh on every parse and is
//! read-only once handed to the projection stage.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fallback grouping name when a result carries no suite information
pub const DEFAULT_SUITE: &str = "Default Suite";

/// Severity assigned to a test case with no `severity` label
pub const DEFAULT_SEVERITY: &str = "normal";

/// A named grouping of test cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    /// Grouping key (suite node name or inferred group name)
    pub name: String,
    /// Suite description (often empty)
    pub description: String,
    /// Aggregated status (failed > broken > skipped > passed > unknown)
    pub status: String,
    /// Minimum start timestamp of contained cases (empty when none)
    pub start: String,
    /// Maximum stop timestamp of contained cases (empty when none)
    pub stop: String,
    /// Test cases in this suite, in source order
    #[serde(rename = "test-cases")]
    pub test_cases: Vec<TestCase>,
}

/// One executed test with a final status and optional nested steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Fully-qualified identifier
    pub name: String,
    /// Human-readable label
    pub title: String,
    /// Test description (often empty)
    pub description: String,
    /// Severity classification, `"normal"` when unlabelled
    pub severity: String,
    /// Final status; unknown raw values flow through unmodified
    pub status: String,
    /// String-encoded integer timestamp, possibly empty
    pub start: String,
    /// String-encoded integer timestamp, possibly empty
    pub stop: String,
    /// Labels in source order
    pub labels: Vec<Label>,
    /// Parameters in source order
    pub parameters: Vec<Parameter>,
    /// Top-level steps, possibly empty
    pub steps: Vec<Step>,
}

/// A sub-action within a test case, nesting as deep as the source data does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub title: String,
    pub status: String,
    pub start: String,
    pub stop: String,
    /// Opaque pass-through attachment records
    pub attachments: Vec<Value>,
    pub steps: Vec<Step>,
}

/// A key/value classification attached to a test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A key/value parameter attached to a test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Extract the severity from a label list
///
/// The first label named `severity` wins; a case with no such label (or a
/// severity label with no value) gets [`DEFAULT_SEVERITY`].
#[must_use]
pub fn severity_from_labels(labels: &[Label]) -> String {
    labels
        .iter()
        .find(|l| l.name == "severity")
        .and_then(|l| l.value.clone())
        .unwrap_or_else(|| DEFAULT_SEVERITY.to_string())
}

/// Aggregate a suite status from its case statuses
///
/// Fixed priority, first match wins: any `failed` makes the suite `failed`,
/// else any `broken`, else any `skipped`, else `passed` when every case
/// passed, else `unknown`.
#[must_use]
pub fn aggregate_status(cases: &[TestCase]) -> String {
    if cases.is_empty() {
        return "unknown".to_string();
    }
    for candidate in ["failed", "broken", "skipped"] {
        if cases.iter().any(|tc| tc.status == candidate) {
            return candidate.to_string();
        }
    }
    if cases.iter().all(|tc| tc.status == "passed") {
        return "passed".to_string();
    }
    "unknown".to_string()
}

/// Min start / max stop over a suite's cases
///
/// Only values that are pure non-negative integer strings participate;
/// empty or non-numeric timestamps are excluded. Returns empty strings when
/// no case carries a usable timestamp.
#[must_use]
pub fn aggregate_times(cases: &[TestCase]) -> (String, String) {
    let starts = numeric_timestamps(cases.iter().map(|tc| tc.start.as_str()));
    let stops = numeric_timestamps(cases.iter().map(|tc| tc.stop.as_str()));

    let start = starts
        .iter()
        .min()
        .map(u64::to_string)
        .unwrap_or_default();
    let stop = stops.iter().max().map(u64::to_string).unwrap_or_default();
    (start, stop)
}

fn numeric_timestamps<'a>(values: impl Iterator<Item = &'a str>) -> Vec<u64> {
    values.filter_map(|v| v.parse::<u64>().ok()).collect()
}

/// Coerce a raw JSON timestamp value to its string form
///
/// Source documents carry timestamps as integers; the normalized tree keeps
/// them as strings, with absent or null values becoming empty.
#[must_use]
pub fn coerce_timestamp(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn case_with_status(status: &str) -> TestCase {
        TestCase {
            name: format!("test_{status}"),
            title: String::new(),
            description: String::new(),
            severity: DEFAULT_SEVERITY.to_string(),
            status: status.to_string(),
            start: String::new(),
            stop: String::new(),
            labels: Vec::new(),
            parameters: Vec::new(),
            steps: Vec::new(),
        }
    }

    #[test]
    fn test_severity_default() {
        assert_eq!(severity_from_labels(&[]), "normal");
        let labels = vec![Label {
            name: "feature".to_string(),
            value: Some("login".to_string()),
        }];
        assert_eq!(severity_from_labels(&labels), "normal");
    }

    #[test]
    fn test_severity_first_match_wins() {
        let labels = vec![
            Label {
                name: "severity".to_string(),
                value: Some("critical".to_string()),
            },
            Label {
                name: "severity".to_string(),
                value: Some("minor".to_string()),
            },
        ];
        assert_eq!(severity_from_labels(&labels), "critical");
    }

    #[test]
    fn test_severity_label_without_value() {
        let labels = vec![Label {
            name: "severity".to_string(),
            value: None,
        }];
        assert_eq!(severity_from_labels(&labels), "normal");
    }

    #[test]
    fn test_aggregate_status_priority() {
        let cases = vec![
            case_with_status("passed"),
            case_with_status("broken"),
            case_with_status("failed"),
        ];
        assert_eq!(aggregate_status(&cases), "failed");

        let cases = vec![case_with_status("broken"), case_with_status("skipped")];
        assert_eq!(aggregate_status(&cases), "broken");

        let cases = vec![case_with_status("skipped"), case_with_status("passed")];
        assert_eq!(aggregate_status(&cases), "skipped");
    }

    #[test]
    fn test_aggregate_status_all_passed() {
        let cases = vec![case_with_status("passed"), case_with_status("passed")];
        assert_eq!(aggregate_status(&cases), "passed");
    }

    #[test]
    fn test_aggregate_status_unknown() {
        assert_eq!(aggregate_status(&[]), "unknown");
        let cases = vec![case_with_status("passed"), case_with_status("pending")];
        assert_eq!(aggregate_status(&cases), "unknown");
    }

    #[test]
    fn test_aggregate_times() {
        let mut a = case_with_status("passed");
        a.start = "100".to_string();
        a.stop = "200".to_string();
        let mut b = case_with_status("passed");
        b.start = "50".to_string();
        b.stop = "300".to_string();

        let (start, stop) = aggregate_times(&[a, b]);
        assert_eq!(start, "50");
        assert_eq!(stop, "300");
    }

    #[test]
    fn test_aggregate_times_ignores_non_numeric() {
        let mut a = case_with_status("passed");
        a.start = "not-a-number".to_string();
        a.stop = String::new();
        let mut b = case_with_status("passed");
        b.start = "-5".to_string();
        b.stop = "12".to_string();

        let (start, stop) = aggregate_times(&[a, b]);
        assert_eq!(start, "");
        assert_eq!(stop, "12");
    }

    #[test]
    fn test_coerce_timestamp() {
        use serde_json::json;
        assert_eq!(coerce_timestamp(None), "");
        assert_eq!(coerce_timestamp(Some(&Value::Null)), "");
        assert_eq!(coerce_timestamp(Some(&json!(1700000000123u64))), "1700000000123");
        assert_eq!(coerce_timestamp(Some(&json!("42"))), "42");
    }

    #[test]
    fn test_suite_serializes_with_wire_names() {
        let suite = Suite {
            name: "api".to_string(),
            description: String::new(),
            status: "passed".to_string(),
            start: String::new(),
            stop: String::new(),
            test_cases: Vec::new(),
        };
        let value = serde_json::to_value(&suite).expect("serialize");
        assert!(value.get("test-cases").is_some());
    }
}
