//! Tool argument contracts. Every tool takes primitive/string arguments only.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LoadSolutionRequest {
    #[schemars(description = "Path to a .sln/.slnx/.csproj file or a directory containing one")]
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetSolutionInfoRequest {
    #[schemars(description = "Output format: \"json\" (default) or \"markdown\"")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetProjectMetadataRequest {
    #[schemars(description = "Project name (as listed by get_solution_info)")]
    pub project_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetFileTreeRequest {
    #[schemars(description = "Restrict the tree to one project")]
    pub project_name: Option<String>,
    #[schemars(description = "Maximum directory depth to render (default 4)")]
    pub max_depth: Option<usize>,
    #[schemars(description = "Maximum entries rendered per folder (default 30)")]
    pub max_entries_per_folder: Option<usize>,
    #[schemars(description = "Case-insensitive substrings; matching paths are left out")]
    pub exclude_patterns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetFileMetadataRequest {
    #[schemars(description = "Solution-relative file path")]
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DetectConventionsRequest {
    #[schemars(description = "Project name; omit for solution-wide conventions")]
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetRecentlyModifiedFilesRequest {
    #[schemars(description = "Number of files to return (1-100, default 10)")]
    pub count: Option<usize>,
    #[schemars(description = "Restrict to one project")]
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchSymbolsRequest {
    #[schemars(description = "Name or fragment to look for")]
    pub query: String,
    #[schemars(description = "Exact symbol kind filter (Class, Method, Property, ...)")]
    pub kind: Option<String>,
    #[schemars(description = "File path or namespace substring restricting the search")]
    pub scope: Option<String>,
    #[schemars(description = "Maximum results (1-100, default 20)")]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SymbolRequest {
    #[schemars(description = "Stable symbol id (e.g. T:App.UserService) or unambiguous name")]
    pub symbol_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetTypeMembersRequest {
    #[schemars(description = "Stable type id or unambiguous type name")]
    pub type_id: String,
    #[schemars(description = "Member kind filter (Method, Property, Field, ...)")]
    pub kind: Option<String>,
    #[schemars(description = "Accessibility filter (Public, Internal, ...)")]
    pub accessibility: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetTypeHierarchyRequest {
    #[schemars(description = "Stable type id or unambiguous type name")]
    pub type_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetInterfaceImplementationsRequest {
    #[schemars(description = "Stable interface id or unambiguous interface name")]
    pub interface_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetDependencyGraphRequest {
    #[schemars(description = "Start from this project; omit for all projects")]
    pub project_name: Option<String>,
    #[schemars(description = "Project-reference hops to follow (1-5, default 2)")]
    pub depth: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetNamespaceTypesRequest {
    #[schemars(description = "Fully qualified namespace name")]
    pub namespace: String,
    #[schemars(description = "Also include types of nested namespaces")]
    pub include_sub_namespaces: Option<bool>,
}
