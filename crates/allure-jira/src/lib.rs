// Copyright (c) 2026 - present Allure MCP contributors
// SPDX-License-Identifier: MIT

//! allure-jira: Jira REST client for allure-mcp
//!
//! A thin authenticated wrapper over the Jira Cloud REST v3 API, used to
//! turn test failures into tracked bugs. Configuration comes from
//! environment variables and is validated lazily at first use.
//!
//! # Example
//!
//! ```no_run
//! use allure_jira::JiraClient;
//!
//! # async fn example() -> Result<(), allure_jira::JiraError> {
//! let client = JiraClient::from_env()?;
//! let issue = client.get_issue("PROJ-123", None).await?;
//! println!("{issue}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{JiraClient, NewIssue};
pub use config::JiraConfig;
pub use error::JiraError;
