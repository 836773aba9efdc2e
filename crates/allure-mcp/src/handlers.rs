//! Tool handlers for the MCP server
//!
//! This module implements the handlers for each MCP tool, bridging MCP
//! requests to the artifact parsers and the Jira client. Every handler
//! returns the response payload as a compact JSON string; the server
//! boundary turns handler errors into a JSON error payload so a tool call
//! never raises past the MCP boundary.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

use allure_jira::{JiraClient, JiraError, NewIssue};
use allure_report::projection::{Mode, project};
use allure_report::{ReportError, detect_layout, parse_tree};

// ============================================================================
// Error Types
// ============================================================================

/// Handler errors
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Invalid input - missing or malformed parameters
    #[error("Invalid input: {0}. Check the tool's required parameters.")]
    InvalidInput(String),

    /// Classification or parse failure for an artifact directory
    #[error("{source}")]
    Report {
        /// The directory the caller asked for
        path: String,
        /// The underlying failure
        #[source]
        source: ReportError,
    },

    /// Jira configuration or API failure
    #[error("{0}")]
    Jira(#[from] JiraError),
}

/// Render a handler error as the JSON payload returned to the caller
///
/// Report failures carry the requested path; Jira API failures carry the
/// HTTP status code.
#[must_use]
pub fn error_payload(err: &HandlerError) -> String {
    let mut payload = json!({ "error": err.to_string() });
    match err {
        HandlerError::Report { path, .. } => {
            payload["path"] = json!(path);
        }
        HandlerError::Jira(JiraError::Api { status_code, .. }) => {
            payload["status_code"] = json!(status_code);
        }
        _ => {}
    }
    payload.to_string()
}

// ============================================================================
// Input Types
// ============================================================================

/// Input for the get_allure_report tool
#[derive(Debug, Clone, Deserialize)]
pub struct ReportInput {
    /// Path to an allure-report or allure-results directory
    pub results_dir: String,
    /// Output mode: "summary", "compact", "detailed", or "full"
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Optional status filter: "failed", "passed", "broken", "skipped"
    pub status_filter: Option<String>,
}

fn default_mode() -> String {
    "summary".to_string()
}

/// Input for the jira_get_issue tool
#[derive(Debug, Clone, Deserialize)]
pub struct GetIssueInput {
    /// Issue key, e.g. "PROJ-123"
    pub issue_key: String,
    /// Optional list of fields to return
    pub fields: Option<Vec<String>>,
}

/// Input for the jira_search_issues tool
#[derive(Debug, Clone, Deserialize)]
pub struct SearchIssuesInput {
    /// JQL query string
    pub jql: String,
    /// Maximum number of results
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Optional list of fields to return
    pub fields: Option<Vec<String>>,
}

fn default_max_results() -> usize {
    50
}

/// Input for the jira_add_comment tool
#[derive(Debug, Clone, Deserialize)]
pub struct AddCommentInput {
    /// Issue key, e.g. "PROJ-123"
    pub issue_key: String,
    /// Plain-text comment body
    pub comment: String,
}

// ============================================================================
// Handler Functions
// ============================================================================

/// Parse input from MCP arguments into a typed struct
fn parse_input<T: for<'de> Deserialize<'de>>(
    args: Option<Map<String, Value>>,
) -> Result<T, HandlerError> {
    let value = args
        .map(Value::Object)
        .unwrap_or(Value::Object(serde_json::Map::new()));
    serde_json::from_value(value).map_err(|e| HandlerError::InvalidInput(e.to_string()))
}

/// Handle the get_allure_report tool
///
/// Classifies the directory, parses it with the matching layout parser,
/// and applies the requested projection. The status filter is ignored in
/// summary mode, where it would only distort the counts.
pub fn handle_report(args: Option<Map<String, Value>>) -> Result<String, HandlerError> {
    let input: ReportInput = parse_input(args)?;
    let mode = Mode::parse(&input.mode);

    let status_filter = if mode == Mode::Summary {
        None
    } else {
        input.status_filter.as_deref()
    };

    let path = Path::new(&input.results_dir);
    let output = (|| -> Result<Value, ReportError> {
        let layout = detect_layout(path)?;
        let suites = parse_tree(path, status_filter)?;
        Ok(project(&suites, mode, status_filter, layout, &input.results_dir))
    })()
    .map_err(|source| HandlerError::Report {
        path: input.results_dir.clone(),
        source,
    })?;

    Ok(output.to_string())
}

/// Handle the jira_get_issue tool
pub async fn handle_jira_get_issue(
    args: Option<Map<String, Value>>,
) -> Result<String, HandlerError> {
    let input: GetIssueInput = parse_input(args)?;
    if input.issue_key.is_empty() {
        return Err(HandlerError::InvalidInput(
            "Issue key is required. Provide a key like 'PROJ-123'.".to_string(),
        ));
    }

    let client = JiraClient::from_env()?;
    let issue = client
        .get_issue(&input.issue_key, input.fields.as_deref())
        .await?;
    Ok(issue.to_string())
}

/// Handle the jira_search_issues tool
pub async fn handle_jira_search_issues(
    args: Option<Map<String, Value>>,
) -> Result<String, HandlerError> {
    let input: SearchIssuesInput = parse_input(args)?;
    if input.jql.is_empty() {
        return Err(HandlerError::InvalidInput(
            "JQL query cannot be empty. Provide a query like 'project = QA AND status = Open'."
                .to_string(),
        ));
    }

    let client = JiraClient::from_env()?;
    let results = client
        .search_issues(&input.jql, input.max_results, input.fields.as_deref())
        .await?;
    Ok(results.to_string())
}

/// Handle the jira_create_issue tool
pub async fn handle_jira_create_issue(
    args: Option<Map<String, Value>>,
) -> Result<String, HandlerError> {
    let issue: NewIssue = parse_input(args)?;
    if issue.project_key.is_empty() || issue.summary.is_empty() {
        return Err(HandlerError::InvalidInput(
            "Both project_key and summary are required to create an issue.".to_string(),
        ));
    }

    let client = JiraClient::from_env()?;
    let created = client.create_issue(&issue).await?;
    Ok(created.to_string())
}

/// Handle the jira_add_comment tool
pub async fn handle_jira_add_comment(
    args: Option<Map<String, Value>>,
) -> Result<String, HandlerError> {
    let input: AddCommentInput = parse_input(args)?;
    if input.issue_key.is_empty() || input.comment.is_empty() {
        return Err(HandlerError::InvalidInput(
            "Both issue_key and comment are required.".to_string(),
        ));
    }

    let client = JiraClient::from_env()?;
    let comment = client.add_comment(&input.issue_key, &input.comment).await?;
    Ok(comment.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Helper to convert a JSON Value to a Map for testing
    fn to_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected JSON object"),
        }
    }

    #[test]
    fn test_parse_report_input_defaults() {
        let args = to_map(json!({ "results_dir": "/tmp/allure-results" }));
        let input: ReportInput = parse_input(Some(args)).expect("parse");
        assert_eq!(input.results_dir, "/tmp/allure-results");
        assert_eq!(input.mode, "summary");
        assert!(input.status_filter.is_none());
    }

    #[test]
    fn test_parse_report_input_with_values() {
        let args = to_map(json!({
            "results_dir": "/tmp/report",
            "mode": "compact",
            "status_filter": "failed"
        }));
        let input: ReportInput = parse_input(Some(args)).expect("parse");
        assert_eq!(input.mode, "compact");
        assert_eq!(input.status_filter, Some("failed".to_string()));
    }

    #[test]
    fn test_parse_report_input_missing_dir() {
        let result: Result<ReportInput, _> = parse_input(None);
        assert!(matches!(result, Err(HandlerError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_search_input_defaults() {
        let args = to_map(json!({ "jql": "project = QA" }));
        let input: SearchIssuesInput = parse_input(Some(args)).expect("parse");
        assert_eq!(input.max_results, 50);
        assert!(input.fields.is_none());
    }

    #[test]
    fn test_handle_report_missing_directory() {
        let args = to_map(json!({ "results_dir": "/nonexistent/allure/12345" }));
        let result = handle_report(Some(args));
        assert!(matches!(result, Err(HandlerError::Report { .. })));

        let payload = error_payload(&result.unwrap_err());
        let value: Value = serde_json::from_str(&payload).expect("payload is JSON");
        assert_eq!(value["path"], "/nonexistent/allure/12345");
        assert!(value["error"].as_str().expect("error").contains("not found"));
    }

    #[tokio::test]
    async fn test_handle_jira_get_issue_empty_key() {
        let args = to_map(json!({ "issue_key": "" }));
        let result = handle_jira_get_issue(Some(args)).await;
        assert!(matches!(result, Err(HandlerError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_handle_jira_search_empty_jql() {
        let args = to_map(json!({ "jql": "" }));
        let result = handle_jira_search_issues(Some(args)).await;
        assert!(matches!(result, Err(HandlerError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_handle_jira_create_requires_key_and_summary() {
        let args = to_map(json!({ "project_key": "", "summary": "" }));
        let result = handle_jira_create_issue(Some(args)).await;
        assert!(matches!(result, Err(HandlerError::InvalidInput(_))));
    }

    #[test]
    fn test_error_payload_includes_status_code() {
        let err = HandlerError::Jira(JiraError::Api {
            status_code: 404,
            message: "Issue does not exist".to_string(),
        });
        let value: Value = serde_json::from_str(&error_payload(&err)).expect("JSON");
        assert_eq!(value["status_code"], 404);
        assert!(
            value["error"]
                .as_str()
                .expect("error")
                .contains("Issue does not exist")
        );
    }

    #[test]
    fn test_error_payload_plain_error() {
        let err = HandlerError::InvalidInput("bad arguments".to_string());
        let value: Value = serde_json::from_str(&error_payload(&err)).expect("JSON");
        assert!(value.get("status_code").is_none());
        assert!(value.get("path").is_none());
    }
}
