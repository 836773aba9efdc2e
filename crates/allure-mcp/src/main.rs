//! allure-mcp: MCP server for Allure test reports and Jira tickets
//!
//! This binary serves parsed Allure test artifacts and a small set of Jira
//! issue operations over MCP stdio transport.

use anyhow::Result;
use clap::Parser;
use rust_mcp_sdk::ToMcpServerHandler;
use rust_mcp_sdk::mcp_server::{McpServerOptions, server_runtime};
use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, LATEST_PROTOCOL_VERSION, ServerCapabilities,
    ServerCapabilitiesTools,
};
use rust_mcp_sdk::{McpServer, StdioTransport, TransportOptions};
use tracing::info;

use allure_mcp::config::Config;
use allure_mcp::server::AllureServer;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries the MCP protocol.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    info!("Starting allure-mcp server...");

    let server_details = InitializeResult {
        server_info: Implementation {
            name: "allure-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: Some("Allure MCP Server".to_string()),
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            ..Default::default()
        },
        meta: None,
        instructions: Some(
            "Query Allure test reports with get_allure_report and manage Jira \
             issues with the jira_* tools. Jira tools require JIRA_BASE_URL, \
             JIRA_EMAIL and JIRA_API_TOKEN in the environment."
                .to_string(),
        ),
        protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
    };

    let transport = StdioTransport::new(TransportOptions::default())
        .map_err(|e| anyhow::anyhow!("failed to create stdio transport: {e}"))?;

    let server = server_runtime::create_server(McpServerOptions {
        server_details,
        transport,
        handler: AllureServer::new().to_mcp_server_handler(),
        task_store: None,
        client_task_store: None,
    });

    server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    info!("allure-mcp server stopped");
    Ok(())
}
