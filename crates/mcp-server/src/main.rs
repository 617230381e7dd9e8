//! Debug Cycle MCP Server
//!
//! Exposes the instrument / run / analyze / clean-up debugging loop to AI
//! agents via the MCP protocol.
//!
//! ## Tools
//!
//! - `debug_add_logs` - insert marker-tagged logging statements into a file
//! - `debug_remove_logs` - strip every marker-tagged statement back out
//! - `debug_capture_output` - run a command and persist its output
//! - `debug_analyze_output` - extract errors, debug lines, and flow from a capture
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "debug-cycle": {
//!       "command": "debug-cycle-mcp"
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use rmcp::transport::stdio;
use rmcp::ServiceExt;

mod tools;

use tools::DebugCycleService;

#[tokio::main]
async fn main() -> Result<()> {
    // Configure logging to stderr only (stdout is for MCP protocol)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("Starting Debug Cycle MCP server");

    let service = DebugCycleService::new();
    let server = service.serve(stdio()).await?;

    // Wait for shutdown
    server.waiting().await?;

    log::info!("Debug Cycle MCP server stopped");
    Ok(())
}
