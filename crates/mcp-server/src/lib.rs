//! # Codeintel MCP
//!
//! Agent-facing tool surface over the C# analysis engine and the rmcp adapter that
//! serves it over stdio.
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "codeintel": {
//!       "command": "codeintel-mcp",
//!       "args": ["/path/to/App.sln"]
//!     }
//!   }
//! }
//! ```

pub mod format;
pub mod server;
pub mod tools;

pub use server::{tool_inventory_json, CodeIntelServer};
pub use tools::{ToolOutput, ToolSurface, TOOL_NAMES};
