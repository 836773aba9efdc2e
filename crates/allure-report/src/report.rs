// Copyright (c) 2026 - present Allure MCP contributors
// SPDX-License-Identifier: MIT

//! Parser for the generated-report layout
//!
//! A generated report carries a pre-built hierarchy: `data/suites.json` is a
//! tree of named nodes where internal nodes are suites and leaves reference
//! per-case detail documents under `data/test-cases/<uid>.json`.
//!
//! Nested sub-suites are flattened: every sub-suite discovered at any depth
//! becomes an independent top-level entry in the output list, keeping only
//! the leaf-case grouping of its original parent node. Leaves whose detail
//! document is missing or unreadable are skipped silently.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::ReportError;
use crate::layout::SUITES_INDEX;
use crate::model::{
    self, Label, Parameter, Step, Suite, TestCase, coerce_timestamp, severity_from_labels,
};

// ============================================================================
// Raw document shapes
// ============================================================================

/// The `data/suites.json` index document
#[derive(Debug, Deserialize)]
struct SuitesIndex {
    #[serde(default)]
    children: Vec<SuiteNode>,
}

/// One node in the index tree
///
/// A node with a `children` key (even an empty one) is a sub-suite; a node
/// without it is a leaf referencing a test case by `uid`.
#[derive(Debug, Deserialize)]
struct SuiteNode {
    #[serde(default)]
    name: String,
    uid: Option<String>,
    children: Option<Vec<SuiteNode>>,
}

/// A `data/test-cases/<uid>.json` detail document
#[derive(Debug, Deserialize)]
struct CaseDetail {
    #[serde(default, rename = "fullName")]
    full_name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    time: TimeBlock,
    #[serde(default)]
    labels: Vec<Label>,
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default, rename = "testStage")]
    test_stage: TestStage,
}

#[derive(Debug, Default, Deserialize)]
struct TestStage {
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Debug, Default, Deserialize)]
struct TimeBlock {
    start: Option<Value>,
    stop: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    #[serde(default)]
    name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    time: TimeBlock,
    #[serde(default)]
    attachments: Vec<Value>,
    #[serde(default)]
    steps: Vec<RawStep>,
}

// ============================================================================
// Parser
// ============================================================================

/// Parser for a generated-report directory
pub struct ReportParser {
    suites_file: PathBuf,
    test_cases_dir: PathBuf,
}

impl ReportParser {
    /// Create a parser for the given report directory
    ///
    /// # Errors
    ///
    /// Returns `ReportError::NotFound` if the directory does not contain the
    /// `data/suites.json` index.
    pub fn new(report_dir: &Path) -> Result<Self, ReportError> {
        let suites_file = report_dir.join(SUITES_INDEX);
        if !suites_file.exists() {
            return Err(ReportError::NotFound(suites_file));
        }
        Ok(Self {
            suites_file,
            test_cases_dir: report_dir.join("data").join("test-cases"),
        })
    }

    /// Parse the index and all resolvable case detail documents
    ///
    /// # Errors
    ///
    /// Returns an IO or JSON error if the index document itself cannot be
    /// read or parsed. Individual case documents never abort the parse.
    pub fn parse(&self) -> Result<Vec<Suite>, ReportError> {
        let text = std::fs::read_to_string(&self.suites_file)?;
        let index: SuitesIndex = serde_json::from_str(&text)?;
        Ok(self.collect_suites(&index.children))
    }

    /// Walk a list of index nodes, flattening sub-suites into the output
    fn collect_suites(&self, nodes: &[SuiteNode]) -> Vec<Suite> {
        let mut suites = Vec::new();

        for node in nodes {
            let mut cases: Vec<TestCase> = Vec::new();

            if let Some(children) = &node.children {
                for child in children {
                    if child.children.is_some() {
                        // Sub-suite: promote to a top-level sibling.
                        suites.extend(self.collect_suites(std::slice::from_ref(child)));
                    } else if let Some(case) = self.parse_test_case(child) {
                        cases.push(case);
                    }
                }
            }

            if !cases.is_empty() {
                let (start, stop) = report_times(&cases);
                let status = model::aggregate_status(&cases);
                suites.push(Suite {
                    name: node.name.clone(),
                    description: String::new(),
                    status,
                    start,
                    stop,
                    test_cases: cases,
                });
            }
        }

        suites
    }

    /// Resolve a leaf node's uid to its detail document
    ///
    /// Leaves without a uid and documents that are missing or malformed are
    /// dropped silently (with a diagnostic).
    fn parse_test_case(&self, node: &SuiteNode) -> Option<TestCase> {
        let uid = node.uid.as_deref().filter(|u| !u.is_empty())?;

        let case_file = self.test_cases_dir.join(format!("{uid}.json"));
        let text = match std::fs::read_to_string(&case_file) {
            Ok(text) => text,
            Err(err) => {
                warn!(uid, error = %err, "skipping unreadable test case document");
                return None;
            }
        };
        let detail: CaseDetail = match serde_json::from_str(&text) {
            Ok(detail) => detail,
            Err(err) => {
                warn!(uid, error = %err, "skipping malformed test case document");
                return None;
            }
        };

        Some(TestCase {
            name: detail.full_name,
            title: detail.title,
            description: detail.description,
            severity: severity_from_labels(&detail.labels),
            status: detail.status,
            start: coerce_timestamp(detail.time.start.as_ref()),
            stop: coerce_timestamp(detail.time.stop.as_ref()),
            labels: detail.labels,
            parameters: detail.parameters,
            steps: parse_steps(detail.test_stage.steps),
        })
    }
}

/// Convert raw report steps to normalized steps, recursively
fn parse_steps(steps: Vec<RawStep>) -> Vec<Step> {
    steps
        .into_iter()
        .map(|step| Step {
            name: step.name,
            title: step.title,
            status: step.status,
            start: coerce_timestamp(step.time.start.as_ref()),
            stop: coerce_timestamp(step.time.stop.as_ref()),
            attachments: step.attachments,
            steps: parse_steps(step.steps),
        })
        .collect()
}

/// Suite start/stop from the direct child cases, integer-coerced
fn report_times(cases: &[TestCase]) -> (String, String) {
    let mut start: Option<i64> = None;
    let mut stop: Option<i64> = None;

    for case in cases {
        if let Ok(value) = case.start.parse::<i64>() {
            start = Some(start.map_or(value, |s| s.min(value)));
        }
        if let Ok(value) = case.stop.parse::<i64>() {
            stop = Some(stop.map_or(value, |s| s.max(value)));
        }
    }

    (
        start.map(|v| v.to_string()).unwrap_or_default(),
        stop.map(|v| v.to_string()).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn node(json: serde_json::Value) -> SuiteNode {
        serde_json::from_value(json).expect("node")
    }

    #[test]
    fn test_node_with_empty_children_is_a_suite() {
        let n = node(serde_json::json!({"name": "empty", "children": []}));
        assert!(n.children.is_some());

        let n = node(serde_json::json!({"name": "leaf", "uid": "abc"}));
        assert!(n.children.is_none());
        assert_eq!(n.uid.as_deref(), Some("abc"));
    }

    #[test]
    fn test_report_times_skips_empty() {
        let mk = |start: &str, stop: &str| TestCase {
            name: "t".to_string(),
            title: String::new(),
            description: String::new(),
            severity: "normal".to_string(),
            status: "passed".to_string(),
            start: start.to_string(),
            stop: stop.to_string(),
            labels: Vec::new(),
            parameters: Vec::new(),
            steps: Vec::new(),
        };

        let (start, stop) = report_times(&[mk("", ""), mk("20", "90"), mk("10", "80")]);
        assert_eq!(start, "10");
        assert_eq!(stop, "90");

        let (start, stop) = report_times(&[mk("", "")]);
        assert_eq!(start, "");
        assert_eq!(stop, "");
    }

    #[test]
    fn test_parse_steps_recursive() {
        let raw: Vec<RawStep> = serde_json::from_value(serde_json::json!([
            {
                "name": "outer",
                "status": "failed",
                "time": {"start": 1, "stop": 2},
                "steps": [
                    {"name": "inner", "status": "failed", "time": {"start": 1, "stop": 2}}
                ]
            }
        ]))
        .expect("steps");

        let steps = parse_steps(raw);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].name, "outer");
        assert_eq!(steps[0].start, "1");
        assert_eq!(steps[0].steps.len(), 1);
        assert_eq!(steps[0].steps[0].name, "inner");
    }
}
