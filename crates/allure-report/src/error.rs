// Copyright (c) 2026 - present Allure MCP contributors
// SPDX-License-Identifier: MIT

//! Error types for allure-report

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while classifying or parsing an artifact directory
///
/// Individual malformed documents are not errors at this level: they are
/// logged and skipped so one bad file cannot abort a directory scan.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The given path does not exist
    #[error("directory not found: {0}")]
    NotFound(PathBuf),

    /// The path exists but matches neither supported layout
    #[error(
        "not an allure directory: {0} (expected data/suites.json or *-result.json files)"
    )]
    InvalidLayout(PathBuf),

    /// Error reading a required file or listing the directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing a required document (the suites index)
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
