// Copyright (c) 2026 - present Allure MCP contributors
// SPDX-License-Identifier: MIT

//! Error types for allure-jira

use thiserror::Error;

/// Errors that can occur when talking to the Jira REST API
#[derive(Debug, Error)]
pub enum JiraError {
    /// Required environment variables are missing
    #[error("missing Jira environment variables: {}", .0.join(", "))]
    Config(Vec<String>),

    /// The API returned a non-2xx response
    #[error("Jira API error ({status_code}): {message}")]
    Api {
        /// HTTP status code of the response
        status_code: u16,
        /// Best-effort extracted error message
        message: String,
    },

    /// The HTTP request itself failed (connection, TLS, body decoding)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials could not be encoded into an Authorization header
    #[error("invalid credential header: {0}")]
    Credentials(#[from] reqwest::header::InvalidHeaderValue),
}
