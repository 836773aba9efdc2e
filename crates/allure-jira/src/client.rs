// Copyright (c) 2026 - present Allure MCP contributors
// SPDX-License-Identifier: MIT

//! Authenticated Jira REST v3 client
//!
//! A thin wrapper: Basic auth from email + API token, JSON in and out,
//! sequential calls with no retry or backoff. A failed call surfaces
//! immediately as a [`JiraError`].

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::JiraConfig;
use crate::error::JiraError;

/// Fields requested by issue searches when the caller names none
const DEFAULT_SEARCH_FIELDS: [&str; 6] = [
    "summary", "status", "priority", "assignee", "created", "updated",
];

/// Fields for a new issue, deserializable straight from tool arguments
#[derive(Debug, Clone, Deserialize)]
pub struct NewIssue {
    /// Project key, e.g. `PROJ`
    pub project_key: String,
    /// Issue summary/title
    pub summary: String,
    /// Plain-text description, wrapped into an ADF paragraph
    #[serde(default)]
    pub description: String,
    /// Issue type name
    #[serde(default = "default_issue_type")]
    pub issue_type: String,
    /// Priority name, e.g. `High`
    pub priority: Option<String>,
    /// Labels to attach
    #[serde(default)]
    pub labels: Vec<String>,
    /// Component names to attach
    #[serde(default)]
    pub components: Vec<String>,
}

fn default_issue_type() -> String {
    "Bug".to_string()
}

/// Jira REST API client with token authentication
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
}

impl JiraClient {
    /// Create a client from an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns `JiraError::Credentials` if the email/token pair cannot be
    /// encoded into an Authorization header, or `JiraError::Http` if the
    /// HTTP client cannot be built.
    pub fn new(config: &JiraConfig) -> Result<Self, JiraError> {
        let credentials = STANDARD.encode(format!("{}:{}", config.email, config.api_token));
        let mut auth = HeaderValue::from_str(&format!("Basic {credentials}"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Create a client from the environment variables
    ///
    /// # Errors
    ///
    /// Returns `JiraError::Config` when required variables are missing.
    pub fn from_env() -> Result<Self, JiraError> {
        Self::new(&JiraConfig::from_env()?)
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/rest/api/3/{}",
            self.base_url,
            endpoint.trim_start_matches('/')
        )
    }

    /// GET request to the Jira API
    ///
    /// # Errors
    ///
    /// Returns `JiraError::Api` for non-2xx responses and `JiraError::Http`
    /// for transport failures.
    pub async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, JiraError> {
        debug!(endpoint, "jira GET");
        let response = self.http.get(self.url(endpoint)).query(params).send().await?;
        Self::into_json(response).await
    }

    /// POST request to the Jira API
    ///
    /// # Errors
    ///
    /// Returns `JiraError::Api` for non-2xx responses and `JiraError::Http`
    /// for transport failures.
    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, JiraError> {
        debug!(endpoint, "jira POST");
        let response = self.http.post(self.url(endpoint)).json(body).send().await?;
        Self::into_json(response).await
    }

    async fn into_json(response: reqwest::Response) -> Result<Value, JiraError> {
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(json!({}));
        }
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(JiraError::Api {
            status_code: status.as_u16(),
            message: extract_error_message(&body),
        })
    }

    // ==================== High-level operations ====================

    /// Test the connection and return the current user
    ///
    /// # Errors
    ///
    /// See [`JiraClient::get`].
    pub async fn test_connection(&self) -> Result<Value, JiraError> {
        self.get("myself", &[]).await
    }

    /// Get issue details by key (e.g. `PROJ-123`)
    ///
    /// # Errors
    ///
    /// See [`JiraClient::get`].
    pub async fn get_issue(
        &self,
        issue_key: &str,
        fields: Option<&[String]>,
    ) -> Result<Value, JiraError> {
        let mut params = Vec::new();
        if let Some(fields) = fields {
            params.push(("fields", fields.join(",")));
        }
        self.get(&format!("issue/{issue_key}"), &params).await
    }

    /// Search issues with a JQL query
    ///
    /// # Errors
    ///
    /// See [`JiraClient::get`].
    pub async fn search_issues(
        &self,
        jql: &str,
        max_results: usize,
        fields: Option<&[String]>,
    ) -> Result<Value, JiraError> {
        let fields = fields
            .map(|f| f.join(","))
            .unwrap_or_else(|| DEFAULT_SEARCH_FIELDS.join(","));
        let params = [
            ("jql", jql.to_string()),
            ("maxResults", max_results.to_string()),
            ("fields", fields),
        ];
        self.get("search/jql", &params).await
    }

    /// Create a new issue, returning the created issue data (including key)
    ///
    /// # Errors
    ///
    /// See [`JiraClient::post`].
    pub async fn create_issue(&self, issue: &NewIssue) -> Result<Value, JiraError> {
        self.post("issue", &create_issue_payload(issue)).await
    }

    /// Add a plain-text comment to an issue
    ///
    /// # Errors
    ///
    /// See [`JiraClient::post`].
    pub async fn add_comment(&self, issue_key: &str, comment: &str) -> Result<Value, JiraError> {
        let body = json!({ "body": adf_paragraph(comment) });
        self.post(&format!("issue/{issue_key}/comment"), &body).await
    }

    /// Get the transitions currently available for an issue
    ///
    /// # Errors
    ///
    /// See [`JiraClient::get`].
    pub async fn get_transitions(&self, issue_key: &str) -> Result<Value, JiraError> {
        self.get(&format!("issue/{issue_key}/transitions"), &[]).await
    }

    /// Move an issue through a workflow transition
    ///
    /// # Errors
    ///
    /// See [`JiraClient::post`].
    pub async fn transition_issue(
        &self,
        issue_key: &str,
        transition_id: &str,
        comment: Option<&str>,
    ) -> Result<Value, JiraError> {
        let mut body = json!({ "transition": { "id": transition_id } });
        if let Some(comment) = comment {
            body["update"] = json!({
                "comment": [{ "add": { "body": adf_paragraph(comment) } }]
            });
        }
        self.post(&format!("issue/{issue_key}/transitions"), &body)
            .await
    }

    /// List accessible projects
    ///
    /// # Errors
    ///
    /// See [`JiraClient::get`].
    pub async fn get_projects(&self) -> Result<Value, JiraError> {
        self.get("project", &[]).await
    }

    /// Get the issue types available in a project
    ///
    /// # Errors
    ///
    /// See [`JiraClient::get`].
    pub async fn get_issue_types(&self, project_key: &str) -> Result<Value, JiraError> {
        let project = self.get(&format!("project/{project_key}"), &[]).await?;
        Ok(extract_issue_types(&project))
    }
}

/// Pull the `issueTypes` list out of a project document, empty when absent
fn extract_issue_types(project: &Value) -> Value {
    project
        .get("issueTypes")
        .cloned()
        .unwrap_or_else(|| json!([]))
}

/// Wrap plain text into an Atlassian Document Format paragraph
fn adf_paragraph(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{ "type": "text", "text": text }]
        }]
    })
}

/// Build the `fields` payload for issue creation
fn create_issue_payload(issue: &NewIssue) -> Value {
    let mut fields = json!({
        "project": { "key": issue.project_key },
        "summary": issue.summary,
        "description": adf_paragraph(&issue.description),
        "issuetype": { "name": issue.issue_type },
    });

    if let Some(priority) = &issue.priority {
        fields["priority"] = json!({ "name": priority });
    }
    if !issue.labels.is_empty() {
        fields["labels"] = json!(issue.labels);
    }
    if !issue.components.is_empty() {
        let components: Vec<Value> = issue
            .components
            .iter()
            .map(|c| json!({ "name": c }))
            .collect();
        fields["components"] = json!(components);
    }

    json!({ "fields": fields })
}

/// Best-effort extraction of a human-readable message from an error body
///
/// Jira error bodies usually carry `errorMessages` (a string array) or
/// `errors` (a field-keyed object); anything else is returned verbatim.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(messages) = value.get("errorMessages").and_then(Value::as_array) {
            let joined: Vec<&str> = messages.iter().filter_map(Value::as_str).collect();
            if !joined.is_empty() {
                return joined.join("; ");
            }
        }
        if let Some(errors) = value.get("errors") {
            if errors.as_object().is_some_and(|o| !o.is_empty()) {
                return errors.to_string();
            }
        }
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_adf_paragraph_shape() {
        let adf = adf_paragraph("something broke");
        assert_eq!(adf["type"], "doc");
        assert_eq!(adf["version"], 1);
        assert_eq!(adf["content"][0]["type"], "paragraph");
        assert_eq!(adf["content"][0]["content"][0]["text"], "something broke");
    }

    #[test]
    fn test_create_issue_payload_minimal() {
        let issue: NewIssue = serde_json::from_value(json!({
            "project_key": "QA",
            "summary": "Login test failed"
        }))
        .expect("issue");

        assert_eq!(issue.issue_type, "Bug");

        let payload = create_issue_payload(&issue);
        assert_eq!(payload["fields"]["project"]["key"], "QA");
        assert_eq!(payload["fields"]["issuetype"]["name"], "Bug");
        assert!(payload["fields"].get("priority").is_none());
        assert!(payload["fields"].get("labels").is_none());
        assert!(payload["fields"].get("components").is_none());
    }

    #[test]
    fn test_create_issue_payload_full() {
        let issue = NewIssue {
            project_key: "QA".to_string(),
            summary: "Flaky checkout".to_string(),
            description: "Fails once per ten runs".to_string(),
            issue_type: "Task".to_string(),
            priority: Some("High".to_string()),
            labels: vec!["flaky".to_string()],
            components: vec!["checkout".to_string()],
        };

        let payload = create_issue_payload(&issue);
        assert_eq!(payload["fields"]["priority"]["name"], "High");
        assert_eq!(payload["fields"]["labels"][0], "flaky");
        assert_eq!(payload["fields"]["components"][0]["name"], "checkout");
        assert_eq!(
            payload["fields"]["description"]["content"][0]["content"][0]["text"],
            "Fails once per ten runs"
        );
    }

    #[test]
    fn test_extract_error_messages_array() {
        let body = r#"{"errorMessages": ["Issue does not exist", "No permission"]}"#;
        assert_eq!(
            extract_error_message(body),
            "Issue does not exist; No permission"
        );
    }

    #[test]
    fn test_extract_errors_object() {
        let body = r#"{"errorMessages": [], "errors": {"summary": "is required"}}"#;
        assert_eq!(extract_error_message(body), r#"{"summary":"is required"}"#);
    }

    #[test]
    fn test_extract_falls_back_to_raw_body() {
        assert_eq!(extract_error_message("Service Unavailable"), "Service Unavailable");
        assert_eq!(extract_error_message("{}"), "{}");
    }

    #[test]
    fn test_extract_issue_types_from_project() {
        let project = json!({
            "key": "QA",
            "issueTypes": [
                {"id": "1", "name": "Bug"},
                {"id": "2", "name": "Task"}
            ]
        });
        let types = extract_issue_types(&project);
        assert_eq!(types.as_array().map(Vec::len), Some(2));
        assert_eq!(types[0]["name"], "Bug");
    }

    #[test]
    fn test_extract_issue_types_missing_key() {
        let types = extract_issue_types(&json!({"key": "QA"}));
        assert_eq!(types, json!([]));
    }

    #[test]
    fn test_client_builds_with_config() {
        let config = JiraConfig {
            base_url: "https://example.atlassian.net".to_string(),
            email: "qa@example.com".to_string(),
            api_token: "token-123".to_string(),
        };
        let client = JiraClient::new(&config).expect("client");
        assert_eq!(
            client.url("issue/QA-1"),
            "https://example.atlassian.net/rest/api/3/issue/QA-1"
        );
        assert_eq!(client.url("/myself"), "https://example.atlassian.net/rest/api/3/myself");
    }
}
