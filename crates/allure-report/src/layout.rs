// Copyright (c) 2026 - present Allure MCP contributors
// SPDX-License-Identifier: MIT

//! Directory classification and parser dispatch
//!
//! An Allure artifact directory is one of two incompatible layouts:
//!
//! - `report`: a generated HTML report with a hierarchical index at
//!   `data/suites.json` plus one detail document per test case
//! - `results`: raw executor output, a flat set of `*-result.json` and
//!   `*-container.json` files with no pre-built hierarchy
//!
//! Detection order is fixed: the report index is checked first and takes
//! priority when a directory could nominally match both layouts.

use std::path::Path;

use crate::error::ReportError;
use crate::model::Suite;
use crate::report::ReportParser;
use crate::results::ResultsParser;

/// Relative location of the report layout's index document
pub const SUITES_INDEX: &str = "data/suites.json";

/// Filename suffix of raw result documents
pub const RESULT_SUFFIX: &str = "-result.json";

/// Filename suffix of raw fixture container documents
pub const CONTAINER_SUFFIX: &str = "-container.json";

/// One of the two supported on-disk artifact layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Generated HTML report backing data
    Report,
    /// Raw per-test result files
    Results,
}

impl Layout {
    /// Stable string tag used in response metadata
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Report => "report",
            Layout::Results => "results",
        }
    }
}

/// Classify a directory as one of the two supported layouts
///
/// # Errors
///
/// Returns `ReportError::NotFound` if the path does not exist, and
/// `ReportError::InvalidLayout` if it matches neither layout signature.
pub fn detect_layout(path: &Path) -> Result<Layout, ReportError> {
    if !path.exists() {
        return Err(ReportError::NotFound(path.to_path_buf()));
    }

    // Report signature first: data/suites.json wins over loose result files.
    if path.join(SUITES_INDEX).exists() {
        return Ok(Layout::Report);
    }

    if has_result_files(path)? {
        return Ok(Layout::Results);
    }

    Err(ReportError::InvalidLayout(path.to_path_buf()))
}

fn has_result_files(path: &Path) -> Result<bool, ReportError> {
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().ends_with(RESULT_SUFFIX) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Classify the directory and parse it with the matching parser
///
/// The optional status filter excludes non-matching cases in the results
/// layout; the report layout carries no per-case filtering.
///
/// # Errors
///
/// Returns `ReportError::NotFound` / `ReportError::InvalidLayout` from
/// classification, or an IO/JSON error if the index document cannot be read.
pub fn parse_tree(
    path: &Path,
    status_filter: Option<&str>,
) -> Result<Vec<Suite>, ReportError> {
    match detect_layout(path)? {
        Layout::Report => ReportParser::new(path)?.parse(),
        Layout::Results => ResultsParser::new(path, status_filter)?.parse(),
    }
}
