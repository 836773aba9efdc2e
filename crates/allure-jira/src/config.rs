// Copyright (c) 2026 - present Allure MCP contributors
// SPDX-License-Identifier: MIT

//! Jira configuration from environment variables
//!
//! Credentials are read lazily at first client use, not at server startup,
//! so a deployment without Jira access can still serve report tools.

use crate::error::JiraError;

/// Environment variable holding the Jira instance base URL
pub const ENV_BASE_URL: &str = "JIRA_BASE_URL";

/// Environment variable holding the account email
pub const ENV_EMAIL: &str = "JIRA_EMAIL";

/// Environment variable holding the API token
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";

/// Jira connection settings
#[derive(Debug, Clone)]
pub struct JiraConfig {
    /// Instance base URL without a trailing slash
    pub base_url: String,
    /// Account email used for Basic auth
    pub email: String,
    /// API token used for Basic auth
    pub api_token: String,
}

impl JiraConfig {
    /// Read the configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns `JiraError::Config` naming every missing variable when one
    /// or more of them is absent or empty.
    pub fn from_env() -> Result<Self, JiraError> {
        let base_url = std::env::var(ENV_BASE_URL).unwrap_or_default();
        let email = std::env::var(ENV_EMAIL).unwrap_or_default();
        let api_token = std::env::var(ENV_API_TOKEN).unwrap_or_default();

        let mut missing = Vec::new();
        if base_url.is_empty() {
            missing.push(ENV_BASE_URL.to_string());
        }
        if email.is_empty() {
            missing.push(ENV_EMAIL.to_string());
        }
        if api_token.is_empty() {
            missing.push(ENV_API_TOKEN.to_string());
        }
        if !missing.is_empty() {
            return Err(JiraError::Config(missing));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            api_token,
        })
    }

    /// Check whether all required variables are present
    #[must_use]
    pub fn is_configured() -> bool {
        [ENV_BASE_URL, ENV_EMAIL, ENV_API_TOKEN]
            .iter()
            .all(|name| std::env::var(name).is_ok_and(|v| !v.is_empty()))
    }
}
