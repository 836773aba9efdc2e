//! MCP server implementation for allure-mcp
//!
//! This module provides the core MCP server that exposes Allure test
//! artifacts (generated reports or raw results) and Jira issue operations
//! to LLMs via MCP tool calls.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_mcp_sdk::McpServer;
use rust_mcp_sdk::mcp_server::ServerHandler;
use rust_mcp_sdk::schema::{
    CallToolRequestParams, CallToolResult, ListToolsResult, PaginatedRequestParams, RpcError,
    TextContent, Tool, ToolInputSchema, schema_utils::CallToolError,
};
use serde_json::{Map, Value, json};

use crate::handlers;

/// Convert a JSON object into the properties format expected by ToolInputSchema.
///
/// ToolInputSchema expects `HashMap<String, Map<String, Value>>` for properties,
/// where each key maps to a JSON object describing that property's schema.
fn make_properties(json_obj: Value) -> HashMap<String, Map<String, Value>> {
    let mut properties = HashMap::new();
    if let Value::Object(obj) = json_obj {
        for (key, value) in obj {
            if let Value::Object(inner) = value {
                properties.insert(key, inner);
            }
        }
    }
    properties
}

/// The main allure MCP server handler
///
/// Stateless: every tool call re-reads the artifact directory or opens a
/// fresh Jira request, so repeated calls always see current data.
#[derive(Debug, Default)]
pub struct AllureServer;

impl AllureServer {
    /// Create a new allure server handler
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build the list of available tools
    pub fn build_tools() -> Vec<Tool> {
        vec![
            Self::report_tool(),
            Self::jira_get_issue_tool(),
            Self::jira_search_issues_tool(),
            Self::jira_create_issue_tool(),
            Self::jira_add_comment_tool(),
        ]
    }

    fn report_tool() -> Tool {
        Tool {
            name: "get_allure_report".into(),
            description: Some(
                "Read an allure-report or allure-results directory and return structured \
                 test data as JSON. The directory layout is detected automatically."
                    .into(),
            ),
            input_schema: ToolInputSchema::new(
                vec!["results_dir".into()],
                Some(make_properties(json!({
                    "results_dir": {
                        "type": "string",
                        "description": "Path to an allure-report (generated HTML report) or allure-results (raw test output) directory"
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["summary", "compact", "detailed", "full"],
                        "default": "summary",
                        "description": "Output mode: summary (counts only), compact (failure digest), detailed (bounded steps), full (complete tree)"
                    },
                    "status_filter": {
                        "type": "string",
                        "enum": ["failed", "broken", "passed", "skipped"],
                        "description": "Only include test cases with this status (ignored in summary mode)"
                    }
                }))),
                None,
            ),
            annotations: None,
            execution: None,
            icons: vec![],
            meta: None,
            output_schema: None,
            title: Some("Get Allure Report".into()),
        }
    }

    fn jira_get_issue_tool() -> Tool {
        Tool {
            name: "jira_get_issue".into(),
            description: Some("Fetch a Jira issue by key.".into()),
            input_schema: ToolInputSchema::new(
                vec!["issue_key".into()],
                Some(make_properties(json!({
                    "issue_key": {
                        "type": "string",
                        "description": "Issue key, e.g. 'PROJ-123'"
                    },
                    "fields": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Fields to return (defaults to a compact field set)"
                    }
                }))),
                None,
            ),
            annotations: None,
            execution: None,
            icons: vec![],
            meta: None,
            output_schema: None,
            title: Some("Get Jira Issue".into()),
        }
    }

    fn jira_search_issues_tool() -> Tool {
        Tool {
            name: "jira_search_issues".into(),
            description: Some("Search Jira issues with a JQL query.".into()),
            input_schema: ToolInputSchema::new(
                vec!["jql".into()],
                Some(make_properties(json!({
                    "jql": {
                        "type": "string",
                        "description": "JQL query, e.g. 'project = QA AND status = Open'"
                    },
                    "max_results": {
                        "type": "integer",
                        "default": 50,
                        "description": "Maximum number of issues to return"
                    },
                    "fields": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Fields to return (defaults to a compact field set)"
                    }
                }))),
                None,
            ),
            annotations: None,
            execution: None,
            icons: vec![],
            meta: None,
            output_schema: None,
            title: Some("Search Jira Issues".into()),
        }
    }

    fn jira_create_issue_tool() -> Tool {
        Tool {
            name: "jira_create_issue".into(),
            description: Some(
                "Create a Jira issue, typically a bug filed from a failing test.".into(),
            ),
            input_schema: ToolInputSchema::new(
                vec!["project_key".into(), "summary".into()],
                Some(make_properties(json!({
                    "project_key": {
                        "type": "string",
                        "description": "Project key, e.g. 'QA'"
                    },
                    "summary": {
                        "type": "string",
                        "description": "Issue summary line"
                    },
                    "description": {
                        "type": "string",
                        "description": "Plain-text issue description"
                    },
                    "issue_type": {
                        "type": "string",
                        "default": "Bug",
                        "description": "Issue type name"
                    },
                    "priority": {
                        "type": "string",
                        "description": "Priority name, e.g. 'High'"
                    },
                    "labels": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Labels to attach"
                    },
                    "components": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Component names"
                    }
                }))),
                None,
            ),
            annotations: None,
            execution: None,
            icons: vec![],
            meta: None,
            output_schema: None,
            title: Some("Create Jira Issue".into()),
        }
    }

    fn jira_add_comment_tool() -> Tool {
        Tool {
            name: "jira_add_comment".into(),
            description: Some("Add a plain-text comment to a Jira issue.".into()),
            input_schema: ToolInputSchema::new(
                vec!["issue_key".into(), "comment".into()],
                Some(make_properties(json!({
                    "issue_key": {
                        "type": "string",
                        "description": "Issue key, e.g. 'PROJ-123'"
                    },
                    "comment": {
                        "type": "string",
                        "description": "Comment text"
                    }
                }))),
                None,
            ),
            annotations: None,
            execution: None,
            icons: vec![],
            meta: None,
            output_schema: None,
            title: Some("Add Jira Comment".into()),
        }
    }
}

/// ServerHandler implementation for the MCP protocol
#[async_trait]
impl ServerHandler for AllureServer {
    /// Handle requests to list available tools
    async fn handle_list_tools_request(
        &self,
        _params: Option<PaginatedRequestParams>,
        _runtime: Arc<dyn McpServer>,
    ) -> Result<ListToolsResult, RpcError> {
        Ok(ListToolsResult {
            tools: Self::build_tools(),
            meta: None,
            next_cursor: None,
        })
    }

    /// Handle requests to call a specific tool
    ///
    /// Handler failures are rendered as a JSON error payload rather than a
    /// protocol error, so callers always receive a JSON string.
    async fn handle_call_tool_request(
        &self,
        params: CallToolRequestParams,
        _runtime: Arc<dyn McpServer>,
    ) -> Result<CallToolResult, CallToolError> {
        tracing::debug!(tool = %params.name, "Calling tool");

        let outcome = match params.name.as_str() {
            "get_allure_report" => handlers::handle_report(params.arguments),
            "jira_get_issue" => handlers::handle_jira_get_issue(params.arguments).await,
            "jira_search_issues" => handlers::handle_jira_search_issues(params.arguments).await,
            "jira_create_issue" => handlers::handle_jira_create_issue(params.arguments).await,
            "jira_add_comment" => handlers::handle_jira_add_comment(params.arguments).await,
            _ => return Err(CallToolError::unknown_tool(&params.name)),
        };

        let payload = outcome.unwrap_or_else(|err| {
            tracing::warn!(tool = %params.name, error = %err, "Tool call failed");
            handlers::error_payload(&err)
        });

        Ok(CallToolResult::text_content(vec![TextContent::new(
            payload, None, None,
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_tools() {
        let tools = AllureServer::build_tools();
        assert_eq!(tools.len(), 5);

        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"get_allure_report"));
        assert!(names.contains(&"jira_get_issue"));
        assert!(names.contains(&"jira_search_issues"));
        assert!(names.contains(&"jira_create_issue"));
        assert!(names.contains(&"jira_add_comment"));
    }

    #[test]
    fn test_tool_schemas_have_properties() {
        for tool in AllureServer::build_tools() {
            assert!(
                tool.input_schema.properties.is_some(),
                "Tool {} should have properties",
                tool.name
            );
        }
    }

    #[test]
    fn test_tools_have_descriptions() {
        for tool in AllureServer::build_tools() {
            assert!(
                tool.description.as_deref().is_some_and(|d| !d.is_empty()),
                "Tool {} should have a description",
                tool.name
            );
        }
    }

    #[test]
    fn test_make_properties_skips_non_objects() {
        let props = make_properties(json!({
            "good": { "type": "string" },
            "bad": "not an object"
        }));
        assert!(props.contains_key("good"));
        assert!(!props.contains_key("bad"));
    }
}
