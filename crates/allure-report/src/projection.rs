// Copyright (c) 2026 - present Allure MCP contributors
// SPDX-License-Identifier: MIT

//! Size-bounded projections of the normalized tree
//!
//! Callers of the report tool have a limited response budget, so the full
//! tree is rarely what they want. Four deterministic, pure views are
//! offered, in increasing verbosity: `summary` (counts only), `compact`
//! (failures with failed step names), `detailed` (capped cases with
//! truncated steps), and `full` (the entire tree, falling back to a wider
//! detailed view past a serialized-size threshold). None of them mutate
//! the input tree.

use serde_json::{Value, json};

use crate::layout::Layout;
use crate::model::{Step, Suite};

/// Serialized-size threshold past which `full` degrades to `detailed`
pub const FULL_SIZE_LIMIT: usize = 50_000;

/// Default global case cap for the detailed view
pub const DEFAULT_MAX_TESTS: usize = 50;

/// Default step nesting depth for the detailed view
pub const DEFAULT_MAX_STEP_DEPTH: usize = 2;

/// Failed/broken cases listed by the summary view
const MAX_FAILED_TESTS: usize = 20;

/// Failed step names listed per case by the compact view
const MAX_FAILED_STEPS: usize = 5;

/// Sibling steps kept per nesting level by the detailed view
const MAX_STEPS_PER_LEVEL: usize = 10;

/// Output mode of the report tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Statistics only, the most compact view
    #[default]
    Summary,
    /// Failures with minimal detail
    Compact,
    /// Capped cases with truncated steps
    Detailed,
    /// The entire tree, size permitting
    Full,
}

impl Mode {
    /// Parse a mode string; unrecognized values fall back to `Summary`
    #[must_use]
    pub fn parse(mode: &str) -> Self {
        match mode {
            "compact" => Mode::Compact,
            "detailed" => Mode::Detailed,
            "full" => Mode::Full,
            _ => Mode::Summary,
        }
    }

    /// Stable string tag used in response metadata
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Summary => "summary",
            Mode::Compact => "compact",
            Mode::Detailed => "detailed",
            Mode::Full => "full",
        }
    }
}

/// Apply the requested projection and attach the response metadata block
#[must_use]
pub fn project(
    suites: &[Suite],
    mode: Mode,
    status_filter: Option<&str>,
    layout: Layout,
    source_path: &str,
) -> Value {
    let mut output = match mode {
        Mode::Summary => create_summary(suites),
        Mode::Compact => create_compact(suites, status_filter == Some("passed")),
        Mode::Detailed => create_detailed(suites, DEFAULT_MAX_TESTS, DEFAULT_MAX_STEP_DEPTH),
        Mode::Full => create_full(suites),
    };

    output["_metadata"] = json!({
        "source_type": layout.as_str(),
        "source_path": source_path,
        "mode": mode.as_str(),
        "status_filter": status_filter,
    });
    output
}

/// Statistics-only view: counts, histogram, pass rate, failure shortlist
#[must_use]
pub fn create_summary(suites: &[Suite]) -> Value {
    let mut total_tests = 0usize;
    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut broken = 0usize;
    let mut skipped = 0usize;
    let mut unknown = 0usize;
    let mut failed_tests = Vec::new();

    for suite in suites {
        for tc in &suite.test_cases {
            total_tests += 1;
            match tc.status.as_str() {
                "passed" => passed += 1,
                "failed" => failed += 1,
                "broken" => broken += 1,
                "skipped" => skipped += 1,
                // Any other raw status lands in the unknown bucket.
                _ => unknown += 1,
            }

            if (tc.status == "failed" || tc.status == "broken")
                && failed_tests.len() < MAX_FAILED_TESTS
            {
                failed_tests.push(json!({
                    "suite": suite.name,
                    "name": tc.title,
                    "status": tc.status,
                }));
            }
        }
    }

    let pass_rate = if total_tests == 0 {
        "0%".to_string()
    } else {
        format!("{:.1}%", passed as f64 / total_tests as f64 * 100.0)
    };

    let suite_lines: Vec<Value> = suites
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "status": s.status,
                "test_count": s.test_cases.len(),
            })
        })
        .collect();

    json!({
        "summary": {
            "total_suites": suites.len(),
            "total_tests": total_tests,
            "passed": passed,
            "failed": failed,
            "broken": broken,
            "skipped": skipped,
            "unknown": unknown,
            "pass_rate": pass_rate,
        },
        "failed_tests": failed_tests,
        "suites": suite_lines,
    })
}

/// Failure-focused view with minimal per-case detail
///
/// Passed cases are skipped unless `include_passed` is set; the overview
/// counts cover all cases, emitted or not.
#[must_use]
pub fn create_compact(suites: &[Suite], include_passed: bool) -> Value {
    let mut compact_suites = Vec::new();
    let mut total_passed = 0usize;
    let mut total_failed = 0usize;

    for suite in suites {
        let mut compact_cases = Vec::new();

        for tc in &suite.test_cases {
            if tc.status == "passed" {
                total_passed += 1;
                if !include_passed {
                    continue;
                }
            } else {
                total_failed += 1;
            }

            let mut case = json!({
                "name": tc.title,
                "status": tc.status,
            });

            if tc.status != "passed" {
                let failed_steps: Vec<&str> = tc
                    .steps
                    .iter()
                    .filter(|s| s.status != "passed")
                    .take(MAX_FAILED_STEPS)
                    .map(|s| s.name.as_str())
                    .collect();
                if !failed_steps.is_empty() {
                    case["failed_steps"] = json!(failed_steps);
                }
            }

            compact_cases.push(case);
        }

        if !compact_cases.is_empty() {
            compact_suites.push(json!({
                "name": suite.name,
                "status": suite.status,
                "test-cases": compact_cases,
            }));
        }
    }

    json!({
        "overview": {
            "total_passed": total_passed,
            "total_failed": total_failed,
            "showing": if include_passed { "all" } else { "failed_only" },
        },
        "test-suites": compact_suites,
    })
}

/// Capped view: at most `max_tests` cases across all suites, steps cut at
/// `max_step_depth` levels and ten siblings per level
#[must_use]
pub fn create_detailed(suites: &[Suite], max_tests: usize, max_step_depth: usize) -> Value {
    let mut detailed_suites = Vec::new();
    let mut test_count = 0usize;

    for suite in suites {
        if test_count >= max_tests {
            break;
        }

        let mut detailed_cases = Vec::new();
        for tc in &suite.test_cases {
            if test_count >= max_tests {
                break;
            }

            let mut case = json!({
                "name": tc.name,
                "title": tc.title,
                "status": tc.status,
                "severity": tc.severity,
            });
            if !tc.steps.is_empty() {
                case["steps"] = Value::Array(truncate_steps(&tc.steps, 0, max_step_depth));
            }

            detailed_cases.push(case);
            test_count += 1;
        }

        if !detailed_cases.is_empty() {
            detailed_suites.push(json!({
                "name": suite.name,
                "status": suite.status,
                "test-cases": detailed_cases,
            }));
        }
    }

    json!({
        "note": format!(
            "Showing {test_count} tests (max {max_tests}), step depth limited to {max_step_depth}"
        ),
        "test-suites": detailed_suites,
    })
}

/// Recursively truncate steps to the depth and sibling limits
///
/// When a level is cut at ten siblings, a synthetic marker step reports how
/// many were dropped. At the final permitted depth a step's own `steps`
/// list is left out entirely.
fn truncate_steps(steps: &[Step], depth: usize, max_step_depth: usize) -> Vec<Value> {
    if depth >= max_step_depth || steps.is_empty() {
        return Vec::new();
    }

    let mut truncated = Vec::new();
    for step in steps.iter().take(MAX_STEPS_PER_LEVEL) {
        let mut entry = json!({
            "name": step.name,
            "status": step.status,
        });
        if depth < max_step_depth - 1 && !step.steps.is_empty() {
            entry["steps"] = Value::Array(truncate_steps(&step.steps, depth + 1, max_step_depth));
        }
        truncated.push(entry);
    }

    if steps.len() > MAX_STEPS_PER_LEVEL {
        truncated.push(json!({
            "name": format!("... and {} more steps", steps.len() - MAX_STEPS_PER_LEVEL),
            "status": "truncated",
        }));
    }

    truncated
}

/// The entire normalized tree, or a wider detailed view past the size limit
#[must_use]
pub fn create_full(suites: &[Suite]) -> Value {
    let tree = json!({ "test-suites": suites });

    let serialized_len = serde_json::to_string(&tree).map_or(0, |s| s.len());
    if serialized_len > FULL_SIZE_LIMIT {
        let mut output = create_detailed(suites, 100, 3);
        output["warning"] = json!(
            "Response truncated due to size. Use mode=\"compact\" or mode=\"summary\" \
             for large test suites."
        );
        return output;
    }

    tree
}
