//! MCP tools for the debug cycle.
//!
//! Each tool is one stateless request/response unit; continuity between
//! calls lives in the marker convention embedded in source files and the
//! timestamped capture files on disk.

use std::path::{Path, PathBuf};

use debug_cycle_core::{
    analyze_capture, inject_logs, AnalyzeRequest, CaptureRequest, CaptureStore, DebugCycleError,
    Focus, LogLocation, LogStyle, DEFAULT_TIMEOUT_MS,
};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;

/// Debug Cycle MCP Service
#[derive(Clone)]
pub struct DebugCycleService {
    /// Capture storage shared by the runner and the analyzer
    store: CaptureStore,
    /// Tool router
    tool_router: ToolRouter<Self>,
}

impl DebugCycleService {
    pub fn new() -> Self {
        Self::with_store(CaptureStore::from_env())
    }

    pub fn with_store(store: CaptureStore) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_handler]
impl ServerHandler for DebugCycleService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Debug Cycle supports a temporary-instrumentation workflow: use 'debug_add_logs' to insert marker-tagged log statements, 'debug_capture_output' to run a command and persist its output, 'debug_analyze_output' to extract errors and execution flow from a capture, and 'debug_remove_logs' to strip the instrumentation back out.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Tool Input Schemas
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogPoint {
    /// Line number to insert log after
    #[schemars(description = "Line number to insert log after (1-based)")]
    pub line: usize,

    /// Log message
    #[schemars(description = "Log message (variables will be interpolated)")]
    pub message: String,

    /// Variable names to log values of
    #[schemars(description = "Variable names to log values of")]
    pub variables: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddLogsRequest {
    /// Path to the file to instrument
    #[schemars(description = "Path to the file to instrument")]
    pub file_path: String,

    /// Locations to add logging
    #[schemars(description = "Locations to add logging")]
    pub locations: Vec<LogPoint>,

    /// Logging style hint
    #[schemars(description = "Logging style: console, print, or logger (default: auto-detect)")]
    pub log_style: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveLogsRequest {
    /// Path to the file to clean up
    #[schemars(description = "Path to the file to clean up")]
    pub file_path: String,

    /// Preview without writing
    #[schemars(description = "If true, show what would be removed without making changes")]
    pub dry_run: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CaptureOutputRequest {
    /// Command to run
    #[schemars(description = "Command to run (e.g., 'npm'), executed without a shell")]
    pub command: String,

    /// Command arguments
    #[schemars(description = "Command arguments")]
    pub args: Option<Vec<String>>,

    /// Working directory
    #[schemars(description = "Working directory (default: current)")]
    pub cwd: Option<String>,

    /// Timeout in milliseconds
    #[schemars(description = "Timeout in milliseconds (default: 60000)")]
    pub timeout: Option<u64>,

    /// Restrict display to [DEBUG] lines
    #[schemars(description = "Only show lines containing [DEBUG] (default: false)")]
    pub filter_debug: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeOutputRequest {
    /// Capture file to analyze
    #[schemars(description = "Path to capture file (default: latest capture)")]
    pub capture_file: Option<String>,

    /// Focus selector
    #[schemars(description = "What to focus analysis on: errors, debug, flow, or all (default: all)")]
    pub focus: Option<String>,

    /// Free-text search
    #[schemars(description = "Regex pattern to search for in output (case-insensitive)")]
    pub search_pattern: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl DebugCycleService {
    /// Inject marker-tagged log statements
    #[tool(
        name = "debug_add_logs",
        description = "Add debug logging statements to a file at specified locations. Logs are marked with [DEBUG] prefix for easy removal."
    )]
    pub async fn add_logs(
        &self,
        Parameters(request): Parameters<AddLogsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let locations: Vec<LogLocation> = request
            .locations
            .iter()
            .map(|point| LogLocation {
                line: point.line,
                message: point.message.clone(),
                variables: point.variables.clone().unwrap_or_default(),
            })
            .collect();
        let style = request.log_style.as_deref().and_then(LogStyle::parse);

        match inject_logs(Path::new(&request.file_path), &locations, style) {
            Ok(report) => {
                let listing = report
                    .applied
                    .iter()
                    .map(|loc| format!("  Line {}: {}", loc.line, loc.message))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "Added {} debug log(s) to {}\n\nLocations:\n{}\n\nUse debug_remove_logs to clean up when done.",
                    report.applied.len(),
                    request.file_path,
                    listing
                ))]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to add logs: {e}"
            ))])),
        }
    }

    /// Strip marker-tagged log statements
    #[tool(
        name = "debug_remove_logs",
        description = "Remove all debug logging statements (marked with AUTO-DEBUG comment) from a file"
    )]
    pub async fn remove_logs(
        &self,
        Parameters(request): Parameters<RemoveLogsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let dry_run = request.dry_run.unwrap_or(false);

        match debug_cycle_core::remove_logs(Path::new(&request.file_path), dry_run) {
            Ok(report) if report.removed.is_empty() => {
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "No debug logs found in {}",
                    request.file_path
                ))]))
            }
            Ok(report) => {
                let verb = if report.dry_run {
                    "Would remove"
                } else {
                    "Removed"
                };
                let listing = report
                    .removed
                    .iter()
                    .map(|r| format!("  Line {}: {}", r.line, r.content))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "{verb} {} debug log(s) from {}:\n\n{listing}",
                    report.removed.len(),
                    request.file_path
                ))]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to remove logs: {e}"
            ))])),
        }
    }

    /// Run a command, persist its combined output
    #[tool(
        name = "debug_capture_output",
        description = "Run a command and capture its output (stdout, stderr) for analysis. Saves output to the capture directory."
    )]
    pub async fn capture_output(
        &self,
        Parameters(request): Parameters<CaptureOutputRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut capture = CaptureRequest::new(&request.command);
        capture.args = request.args.unwrap_or_default();
        capture.cwd = request.cwd.map(PathBuf::from);
        capture.timeout_ms = request.timeout.unwrap_or(DEFAULT_TIMEOUT_MS);
        capture.filter_debug = request.filter_debug.unwrap_or(false);

        match debug_cycle_core::capture_output(&self.store, &capture).await {
            Ok(report) => {
                let exit = if report.outcome.is_success() {
                    "success"
                } else {
                    "failed"
                };
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "Command: {}\nExit: {}\nSaved to: {}\n\n{}",
                    report.command_line,
                    exit,
                    report.capture_path.display(),
                    report.display
                ))]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to capture output: {e}"
            ))])),
        }
    }

    /// Analyze a persisted capture
    #[tool(
        name = "debug_analyze_output",
        description = "Analyze captured debug output to identify patterns, errors, and insights. Can analyze latest capture or a specific file."
    )]
    pub async fn analyze_output(
        &self,
        Parameters(request): Parameters<AnalyzeOutputRequest>,
    ) -> Result<CallToolResult, McpError> {
        let analyze = AnalyzeRequest {
            capture_file: request.capture_file.map(PathBuf::from),
            focus: request
                .focus
                .as_deref()
                .and_then(Focus::parse)
                .unwrap_or_default(),
            search_pattern: request.search_pattern,
        };

        match analyze_capture(&self.store, &analyze) {
            Ok(report) => Ok(CallToolResult::success(vec![Content::text(
                report.render(),
            )])),
            Err(DebugCycleError::NoCapture) => Ok(CallToolResult::error(vec![Content::text(
                "No capture file found. Run debug_capture_output first.",
            )])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to analyze: {e}"
            ))])),
        }
    }
}
