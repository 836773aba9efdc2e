// Copyright (c) 2026 - present Allure MCP contributors
// SPDX-License-Identifier: MIT

//! Parser for the raw-results layout
//!
//! Raw executor output has no pre-built hierarchy: the directory holds an
//! unordered, flat set of `*-result.json` documents (one per executed test)
//! and `*-container.json` documents (fixture setup/teardown data). Suite
//! grouping must be inferred from each result's metadata via a fixed
//! fallback chain.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ReportError;
use crate::layout::{CONTAINER_SUFFIX, RESULT_SUFFIX};
use crate::model::{
    self, DEFAULT_SUITE, Label, Parameter, Step, Suite, TestCase, coerce_timestamp,
    severity_from_labels,
};

/// Label names consulted for suite grouping, in priority order
const SUITE_LABELS: [&str; 3] = ["suite", "parentSuite", "package"];

// ============================================================================
// Raw document shapes
// ============================================================================

/// A `*-result.json` document
#[derive(Debug, Deserialize)]
struct RawResult {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "fullName")]
    full_name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    status: String,
    start: Option<Value>,
    stop: Option<Value>,
    #[serde(default)]
    labels: Vec<Label>,
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    steps: Vec<RawResultStep>,
}

/// A step inside a raw result; unlike report steps there is no separate
/// title and timestamps sit at the top level rather than in a time object
#[derive(Debug, Deserialize)]
struct RawResultStep {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    start: Option<Value>,
    stop: Option<Value>,
    #[serde(default)]
    attachments: Vec<Value>,
    #[serde(default)]
    steps: Vec<RawResultStep>,
}

/// A `*-container.json` fixture document, keyed by uuid
#[derive(Debug, Deserialize)]
struct RawContainer {
    uuid: Option<String>,
}

// ============================================================================
// Parser
// ============================================================================

/// Parser for a raw-results directory
pub struct ResultsParser {
    results_dir: PathBuf,
    status_filter: Option<String>,
}

impl ResultsParser {
    /// Create a parser for the given results directory
    ///
    /// # Errors
    ///
    /// Returns `ReportError::NotFound` if the directory does not exist, and
    /// `ReportError::InvalidLayout` if it contains no result documents.
    pub fn new(results_dir: &Path, status_filter: Option<&str>) -> Result<Self, ReportError> {
        if !results_dir.exists() {
            return Err(ReportError::NotFound(results_dir.to_path_buf()));
        }

        let parser = Self {
            results_dir: results_dir.to_path_buf(),
            status_filter: status_filter.map(str::to_string),
        };
        if parser.files_with_suffix(RESULT_SUFFIX)?.is_empty() {
            return Err(ReportError::InvalidLayout(results_dir.to_path_buf()));
        }
        Ok(parser)
    }

    /// Read every result and container document, then group into suites
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be listed. Individual
    /// malformed documents are logged and skipped.
    pub fn parse(&self) -> Result<Vec<Suite>, ReportError> {
        let results = self.read_result_files()?;
        let containers = self.read_container_files()?;
        debug!(
            results = results.len(),
            containers = containers.len(),
            "loaded raw allure documents"
        );

        Ok(self.build_suites(results))
    }

    fn files_with_suffix(&self, suffix: &str) -> Result<Vec<PathBuf>, ReportError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.results_dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().ends_with(suffix) {
                files.push(entry.path());
            }
        }
        Ok(files)
    }

    fn read_result_files(&self) -> Result<Vec<RawResult>, ReportError> {
        let mut results = Vec::new();
        for path in self.files_with_suffix(RESULT_SUFFIX)? {
            match read_document::<RawResult>(&path) {
                Ok(result) => results.push(result),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping result file"),
            }
        }
        Ok(results)
    }

    /// Containers hold fixture data keyed by uuid; they are read so a broken
    /// one surfaces in the logs, but grouping does not depend on them.
    fn read_container_files(&self) -> Result<HashMap<String, RawContainer>, ReportError> {
        let mut containers = HashMap::new();
        for path in self.files_with_suffix(CONTAINER_SUFFIX)? {
            match read_document::<RawContainer>(&path) {
                Ok(container) => {
                    if let Some(uuid) = container.uuid.clone() {
                        containers.insert(uuid, container);
                    }
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping container file");
                }
            }
        }
        Ok(containers)
    }

    /// Group filtered results into suites, preserving first-seen order
    fn build_suites(&self, results: Vec<RawResult>) -> Vec<Suite> {
        let mut groups: Vec<(String, Vec<TestCase>)> = Vec::new();

        for result in results {
            if let Some(filter) = &self.status_filter {
                if result.status != *filter {
                    continue;
                }
            }

            let key = suite_key(&result);
            let case = parse_test_result(result);
            match groups.iter_mut().find(|(name, _)| *name == key) {
                Some((_, cases)) => cases.push(case),
                None => groups.push((key, vec![case])),
            }
        }

        groups
            .into_iter()
            .filter(|(_, cases)| !cases.is_empty())
            .map(|(name, cases)| {
                let (start, stop) = model::aggregate_times(&cases);
                Suite {
                    name,
                    description: String::new(),
                    status: model::aggregate_status(&cases),
                    start,
                    stop,
                    test_cases: cases,
                }
            })
            .collect()
    }
}

fn read_document<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ReportError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Determine a result's suite-grouping key
///
/// Fixed fallback chain, first match wins: `suite` label, `parentSuite`
/// label, `package` label, the fully-qualified name minus its final
/// dot-separated segment, then the literal default group name.
fn suite_key(result: &RawResult) -> String {
    for label_name in SUITE_LABELS {
        if let Some(label) = result.labels.iter().find(|l| l.name == label_name) {
            return label
                .value
                .clone()
                .unwrap_or_else(|| DEFAULT_SUITE.to_string());
        }
    }

    if let Some(idx) = result.full_name.rfind('.') {
        return result.full_name[..idx].to_string();
    }

    DEFAULT_SUITE.to_string()
}

/// Convert a raw result document to a normalized test case
fn parse_test_result(result: RawResult) -> TestCase {
    TestCase {
        name: result.full_name,
        title: result.name,
        description: result.description,
        severity: severity_from_labels(&result.labels),
        status: result.status,
        start: coerce_timestamp(result.start.as_ref()),
        stop: coerce_timestamp(result.stop.as_ref()),
        labels: result.labels,
        parameters: result.parameters,
        steps: parse_steps(result.steps),
    }
}

/// Raw results carry no separate step title, so the name is duplicated
fn parse_steps(steps: Vec<RawResultStep>) -> Vec<Step> {
    steps
        .into_iter()
        .map(|step| Step {
            title: step.name.clone(),
            name: step.name,
            status: step.status,
            start: coerce_timestamp(step.start.as_ref()),
            stop: coerce_timestamp(step.stop.as_ref()),
            attachments: step.attachments,
            steps: parse_steps(step.steps),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn raw(json: serde_json::Value) -> RawResult {
        serde_json::from_value(json).expect("raw result")
    }

    #[test]
    fn test_suite_key_label_chain() {
        let result = raw(serde_json::json!({
            "fullName": "a.b.Test",
            "labels": [
                {"name": "package", "value": "from-package"},
                {"name": "suite", "value": "from-suite"}
            ]
        }));
        assert_eq!(suite_key(&result), "from-suite");

        let result = raw(serde_json::json!({
            "fullName": "a.b.Test",
            "labels": [{"name": "parentSuite", "value": "from-parent"}]
        }));
        assert_eq!(suite_key(&result), "from-parent");

        let result = raw(serde_json::json!({
            "fullName": "a.b.Test",
            "labels": [{"name": "package", "value": "from-package"}]
        }));
        assert_eq!(suite_key(&result), "from-package");
    }

    #[test]
    fn test_suite_key_from_full_name() {
        let result = raw(serde_json::json!({"fullName": "a.b.Test1"}));
        assert_eq!(suite_key(&result), "a.b");

        let result = raw(serde_json::json!({"fullName": "c.Test3"}));
        assert_eq!(suite_key(&result), "c");
    }

    #[test]
    fn test_suite_key_default() {
        let result = raw(serde_json::json!({"fullName": "NoDotsHere"}));
        assert_eq!(suite_key(&result), DEFAULT_SUITE);

        let result = raw(serde_json::json!({}));
        assert_eq!(suite_key(&result), DEFAULT_SUITE);
    }

    #[test]
    fn test_suite_key_label_without_value() {
        let result = raw(serde_json::json!({
            "fullName": "a.b.Test",
            "labels": [{"name": "suite"}]
        }));
        assert_eq!(suite_key(&result), DEFAULT_SUITE);
    }

    #[test]
    fn test_parse_test_result_fields() {
        let case = parse_test_result(raw(serde_json::json!({
            "name": "displays the login page",
            "fullName": "auth.LoginTest",
            "status": "failed",
            "start": 1000,
            "stop": 2000,
            "labels": [{"name": "severity", "value": "critical"}],
            "steps": [
                {"name": "open browser", "status": "passed", "start": 1000, "stop": 1100}
            ]
        })));

        assert_eq!(case.name, "auth.LoginTest");
        assert_eq!(case.title, "displays the login page");
        assert_eq!(case.severity, "critical");
        assert_eq!(case.start, "1000");
        assert_eq!(case.stop, "2000");
        assert_eq!(case.steps.len(), 1);
        // Step title duplicates the name in this layout.
        assert_eq!(case.steps[0].title, "open browser");
        assert_eq!(case.steps[0].name, "open browser");
    }
}
