// Copyright (c) 2026 - present Allure MCP contributors
// SPDX-License-Identifier: MIT

//! allure-report: Allure test artifact parsing for allure-mcp
//!
//! This library crate ingests the two on-disk artifact layouts produced by
//! the Allure test-reporting tool (a generated report's backing data, or
//! raw per-test result files), normalizes both into a single
//! suite/test-case/step tree, and produces size-bounded projections of
//! that tree for consumers with a limited response budget.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use allure_report::layout::{detect_layout, parse_tree};
//! use allure_report::projection::{Mode, project};
//!
//! let dir = Path::new("./allure-results");
//! let layout = detect_layout(dir).unwrap();
//! let suites = parse_tree(dir, None).unwrap();
//! let output = project(&suites, Mode::Summary, None, layout, "./allure-results");
//! println!("{output}");
//! ```

pub mod error;
pub mod layout;
pub mod model;
pub mod projection;
pub mod report;
pub mod results;

pub use error::ReportError;
pub use layout::{Layout, detect_layout, parse_tree};
pub use model::{Label, Parameter, Step, Suite, TestCase};
pub use projection::{Mode, project};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::ReportError;
    pub use crate::layout::{Layout, detect_layout, parse_tree};
    pub use crate::model::{Suite, TestCase};
    pub use crate::projection::{Mode, project};
}
