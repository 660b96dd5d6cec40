//! MCP adapter: one rmcp tool per [`ToolSurface`] operation.

use crate::tools::{ToolOutput, ToolSurface};
use codeintel_protocol::requests::{
    DetectConventionsRequest, GetDependencyGraphRequest, GetFileMetadataRequest,
    GetFileTreeRequest, GetInterfaceImplementationsRequest, GetNamespaceTypesRequest,
    GetProjectMetadataRequest, GetRecentlyModifiedFilesRequest, GetSolutionInfoRequest,
    GetTypeHierarchyRequest, GetTypeMembersRequest, LoadSolutionRequest, SearchSymbolsRequest,
    SymbolRequest,
};
use codeintel_search::AnalysisContext;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde_json::json;
use std::sync::Arc;

const INSTRUCTIONS: &str = "C# code intelligence over a loaded solution. Start with \
load_solution (a .sln, .slnx, .csproj or directory), then get_solution_info for the \
overview and search_symbols to find symbol ids. get_callers, get_callees and get_usages \
need a live semantic engine and report code \"unavailable\" without one.";

fn into_call_result(output: ToolOutput) -> CallToolResult {
    let text = output.to_json_string();
    if output.is_error() {
        CallToolResult::error(vec![Content::text(text)])
    } else {
        CallToolResult::success(vec![Content::text(text)])
    }
}

#[derive(Clone)]
pub struct CodeIntelServer {
    surface: ToolSurface,
    tool_router: ToolRouter<Self>,
}

impl CodeIntelServer {
    pub fn new(context: Arc<AnalysisContext>) -> Self {
        Self {
            surface: ToolSurface::new(context),
            tool_router: Self::tool_router(),
        }
    }

    pub fn surface(&self) -> &ToolSurface {
        &self.surface
    }

    /// Surface bound to one request, so a client cancellation stops its work.
    fn request_surface(&self, context: RequestContext<RoleServer>) -> ToolSurface {
        self.surface.for_request(context.ct)
    }
}

#[tool_router]
impl CodeIntelServer {
    #[tool(description = "Analyze a C# solution (.sln/.slnx), project (.csproj) or directory and make it the active solution. Replaces any previously loaded solution.")]
    async fn load_solution(
        &self,
        Parameters(req): Parameters<LoadSolutionRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).load_solution(req).await))
    }

    #[tool(description = "Overview of the loaded solution: projects, frameworks, statistics and conventions. format=\"markdown\" returns a readable summary.")]
    async fn get_solution_info(
        &self,
        Parameters(req): Parameters<GetSolutionInfoRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).get_solution_info(req).await))
    }

    #[tool(description = "Frameworks, package and project references, namespaces and statistics of one project.")]
    async fn get_project_metadata(
        &self,
        Parameters(req): Parameters<GetProjectMetadataRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).get_project_metadata(req).await))
    }

    #[tool(description = "ASCII tree of the files in the solution or one project, with depth and per-folder limits.")]
    async fn get_file_tree(
        &self,
        Parameters(req): Parameters<GetFileTreeRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).get_file_tree(req).await))
    }

    #[tool(description = "Size, line count, kind and declared types of one file.")]
    async fn get_file_metadata(
        &self,
        Parameters(req): Parameters<GetFileMetadataRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).get_file_metadata(req).await))
    }

    #[tool(description = "Coding conventions: nullable, implicit usings, namespace style, test framework, editorconfig and docs.")]
    async fn detect_conventions(
        &self,
        Parameters(req): Parameters<DetectConventionsRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).detect_conventions(req).await))
    }

    #[tool(description = "Most recently modified files, newest first.")]
    async fn get_recently_modified_files(
        &self,
        Parameters(req): Parameters<GetRecentlyModifiedFilesRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(
            self.request_surface(context).get_recently_modified_files(req).await,
        ))
    }

    #[tool(description = "Find types and members by name. Exact matches rank first, then prefix, substring, signature and summary matches.")]
    async fn search_symbols(
        &self,
        Parameters(req): Parameters<SearchSymbolsRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).search_symbols(req).await))
    }

    #[tool(description = "Full detail of one symbol: signature, location, documentation and type or member specifics.")]
    async fn get_symbol_detail(
        &self,
        Parameters(req): Parameters<SymbolRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).get_symbol_detail(req).await))
    }

    #[tool(description = "Members of a type, optionally filtered by kind and accessibility.")]
    async fn get_type_members(
        &self,
        Parameters(req): Parameters<GetTypeMembersRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).get_type_members(req).await))
    }

    #[tool(description = "Base class chain, implemented interfaces and derived types of a type.")]
    async fn get_type_hierarchy(
        &self,
        Parameters(req): Parameters<GetTypeHierarchyRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).get_type_hierarchy(req).await))
    }

    #[tool(description = "Types implementing an interface.")]
    async fn get_interface_implementations(
        &self,
        Parameters(req): Parameters<GetInterfaceImplementationsRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(
            self.request_surface(context).get_interface_implementations(req).await,
        ))
    }

    #[tool(description = "Methods that call a method or constructor. Needs a live semantic engine.")]
    async fn get_callers(
        &self,
        Parameters(req): Parameters<SymbolRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).get_callers(req).await))
    }

    #[tool(description = "Methods, constructors and properties called from a method body. Needs a live semantic engine.")]
    async fn get_callees(
        &self,
        Parameters(req): Parameters<SymbolRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).get_callees(req).await))
    }

    #[tool(description = "Every reference to a symbol with read/write classification and a source snippet. Needs a live semantic engine.")]
    async fn get_usages(
        &self,
        Parameters(req): Parameters<SymbolRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).get_usages(req).await))
    }

    #[tool(description = "Project and package dependency graph, from one project or the whole solution.")]
    async fn get_dependency_graph(
        &self,
        Parameters(req): Parameters<GetDependencyGraphRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).get_dependency_graph(req).await))
    }

    #[tool(description = "Types declared in a namespace, optionally including nested namespaces.")]
    async fn get_namespace_types(
        &self,
        Parameters(req): Parameters<GetNamespaceTypesRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(into_call_result(self.request_surface(context).get_namespace_types(req).await))
    }
}

#[tool_handler]
impl ServerHandler for CodeIntelServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "codeintel-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }
}

/// Tool names and descriptions as printed by `--print-tools`.
pub fn tool_inventory_json(version: &str) -> String {
    let tools: Vec<_> = CodeIntelServer::tool_router()
        .list_all()
        .into_iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
            })
        })
        .collect();
    let payload = json!({
        "server": "codeintel-mcp",
        "version": version,
        "tools": tools,
    });
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string())
}
