//! Configuration for the allure-mcp server
//!
//! Process-level settings come from the command line; Jira credentials are
//! environment-only and are read lazily by the Jira tools at first use
//! (see `allure_jira::JiraConfig`), so they are deliberately absent here.

use clap::Parser;

/// Allure MCP Server - test reports and Jira tickets for LLM consumption
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "allure-mcp")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Enable verbose logging (debug level)
    ///
    /// When enabled, logs detailed request/response information and
    /// debug messages. Logs are written to stderr to avoid interfering
    /// with MCP stdio transport.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Config {
    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}
