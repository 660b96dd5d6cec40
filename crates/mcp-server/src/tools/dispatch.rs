use super::{ToolOutput, ToolSurface};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Every tool name [`ToolSurface::call`] understands.
pub const TOOL_NAMES: &[&str] = &[
    "load_solution",
    "get_solution_info",
    "get_project_metadata",
    "get_file_tree",
    "get_file_metadata",
    "detect_conventions",
    "get_recently_modified_files",
    "search_symbols",
    "get_symbol_detail",
    "get_type_members",
    "get_type_hierarchy",
    "get_interface_implementations",
    "get_callers",
    "get_callees",
    "get_usages",
    "get_dependency_graph",
    "get_namespace_types",
];

fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolOutput> {
    let args = if args.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|err| ToolOutput::invalid_request(format!("Invalid arguments for {tool}: {err}")))
}

macro_rules! route {
    ($surface:expr, $name:expr, $args:expr, [$($tool:ident),* $(,)?]) => {
        match $name {
            $(
                stringify!($tool) => match parse_args($name, $args) {
                    Ok(req) => $surface.$tool(req).await,
                    Err(output) => output,
                },
            )*
            other => ToolOutput::invalid_request(format!(
                "Unknown tool '{other}'. Available tools: {}",
                TOOL_NAMES.join(", ")
            )),
        }
    };
}

impl ToolSurface {
    /// Dispatch a call by tool name with raw JSON arguments.
    pub async fn call(&self, name: &str, args: Value) -> ToolOutput {
        route!(
            self,
            name,
            args,
            [
                load_solution,
                get_solution_info,
                get_project_metadata,
                get_file_tree,
                get_file_metadata,
                detect_conventions,
                get_recently_modified_files,
                search_symbols,
                get_symbol_detail,
                get_type_members,
                get_type_hierarchy,
                get_interface_implementations,
                get_callers,
                get_callees,
                get_usages,
                get_dependency_graph,
                get_namespace_types,
            ]
        )
    }
}
