//! Agent tool surface.
//!
//! Every tool takes a typed request, runs on its own task and answers with JSON: either
//! the result payload or an error envelope `{"error", "code"}`. Paths in results are
//! relative to the loaded solution's directory.

mod dispatch;
mod output;

pub use dispatch::TOOL_NAMES;
pub use output::ToolOutput;

use crate::format::{render_file_tree, render_solution_summary, TreeOptions};
use codeintel_protocol::requests::{
    DetectConventionsRequest, GetDependencyGraphRequest, GetFileMetadataRequest,
    GetFileTreeRequest, GetInterfaceImplementationsRequest, GetNamespaceTypesRequest,
    GetProjectMetadataRequest, GetRecentlyModifiedFilesRequest, GetSolutionInfoRequest,
    GetTypeHierarchyRequest, GetTypeMembersRequest, LoadSolutionRequest, SearchSymbolsRequest,
    SymbolRequest,
};
use codeintel_protocol::{ErrorEnvelope, RelativizePaths};
use codeintel_search::{AnalysisContext, QueryError, SemanticQueryService};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Clone)]
pub struct ToolSurface {
    service: SemanticQueryService,
    /// Fires when the server stops; every call in flight ends.
    shutdown: CancellationToken,
    /// Fires when the client abandons the request this surface serves.
    request: CancellationToken,
}

impl ToolSurface {
    pub fn new(context: Arc<AnalysisContext>) -> Self {
        Self {
            service: SemanticQueryService::new(context),
            shutdown: CancellationToken::new(),
            request: CancellationToken::new(),
        }
    }

    pub fn service(&self) -> &SemanticQueryService {
        &self.service
    }

    /// The same surface, with `request` ending the calls made through it.
    pub fn for_request(&self, request: CancellationToken) -> Self {
        Self {
            service: self.service.clone(),
            shutdown: self.shutdown.clone(),
            request,
        }
    }

    /// Abort every call still in flight.
    pub fn cancel_all(&self) {
        self.shutdown.cancel();
    }

    fn call_token(&self) -> CancellationToken {
        self.request.child_token()
    }

    /// Run `work` on a separate task. A panic inside it comes back as an `unexpected`
    /// error payload instead of tearing down the caller. Cancellation of the request or
    /// of the server answers `cancelled` and aborts the task, as does dropping the
    /// returned future.
    pub async fn guarded<F, Fut>(&self, work: F) -> ToolOutput
    where
        F: FnOnce(ToolSurface) -> Fut,
        Fut: Future<Output = ToolOutput> + Send + 'static,
    {
        let mut task = tokio::spawn(work(self.clone()));
        let _abort = AbortOnDrop(task.abort_handle());
        tokio::select! {
            joined = &mut task => match joined {
                Ok(output) => output,
                Err(err) => {
                    log::error!("tool task failed: {err}");
                    ToolOutput::failure(ErrorEnvelope::new(
                        "unexpected",
                        format!("An unexpected error occurred while running the tool: {err}"),
                    ))
                }
            },
            () = self.request.cancelled() => ToolOutput::from_query_error(&QueryError::Cancelled),
            () = self.shutdown.cancelled() => ToolOutput::from_query_error(&QueryError::Cancelled),
        }
    }

    async fn respond<T>(&self, result: codeintel_search::Result<T>) -> ToolOutput
    where
        T: Serialize + RelativizePaths,
    {
        match result {
            Ok(mut payload) => {
                if let Ok(state) = self.service.context().require_state().await {
                    payload.relativize(&state.root);
                }
                ToolOutput::success(&payload)
            }
            Err(err) => ToolOutput::from_query_error(&err),
        }
    }

    pub async fn load_solution(&self, req: LoadSolutionRequest) -> ToolOutput {
        self.guarded(|s| async move {
            let raw = req.path.trim().to_string();
            if raw.is_empty() {
                return ToolOutput::invalid_request("path must not be empty");
            }
            let cancel = s.call_token();
            let loaded = s
                .service
                .context()
                .load_solution(Path::new(&raw), &cancel)
                .await;
            let state = match loaded {
                Ok(state) => state,
                Err(err) => return ToolOutput::from_query_error(&err),
            };
            match s.service.solution_overview().await {
                Ok(mut overview) => {
                    overview.relativize(&state.root);
                    ToolOutput::success(&json!({
                        "loaded": true,
                        "has_live_engine": state.has_live_engine(),
                        "solution": overview,
                    }))
                }
                Err(err) => ToolOutput::from_query_error(&err),
            }
        })
        .await
    }

    pub async fn get_solution_info(&self, req: GetSolutionInfoRequest) -> ToolOutput {
        self.guarded(|s| async move {
            let format = req
                .format
                .as_deref()
                .map(|f| f.trim().to_ascii_lowercase())
                .unwrap_or_default();
            match format.as_str() {
                "" | "json" => s.respond(s.service.solution_overview().await).await,
                "markdown" | "md" => match s.service.solution_info().await {
                    Ok(mut info) => {
                        let root = info.root_dir().to_path_buf();
                        info.relativize(&root);
                        ToolOutput::success(&json!({
                            "format": "markdown",
                            "content": render_solution_summary(&info),
                        }))
                    }
                    Err(err) => ToolOutput::from_query_error(&err),
                },
                other => ToolOutput::invalid_request(format!(
                    "Unknown format '{other}', expected \"json\" or \"markdown\""
                )),
            }
        })
        .await
    }

    pub async fn get_project_metadata(&self, req: GetProjectMetadataRequest) -> ToolOutput {
        self.guarded(|s| async move {
            s.respond(s.service.get_project_metadata(&req.project_name).await)
                .await
        })
        .await
    }

    pub async fn get_file_tree(&self, req: GetFileTreeRequest) -> ToolOutput {
        self.guarded(|s| async move {
            let project = req.project_name.as_deref();
            let paths = match s.service.file_paths(project).await {
                Ok(paths) => paths,
                Err(err) => return ToolOutput::from_query_error(&err),
            };
            let state = match s.service.context().require_state().await {
                Ok(state) => state,
                Err(err) => return ToolOutput::from_query_error(&err),
            };
            let name = project
                .and_then(|p| state.info.find_project(p))
                .map_or_else(|| state.info.name.clone(), |p| p.name.clone());

            let defaults = TreeOptions::default();
            let options = TreeOptions {
                max_depth: req.max_depth.unwrap_or(defaults.max_depth),
                max_entries_per_folder: req
                    .max_entries_per_folder
                    .unwrap_or(defaults.max_entries_per_folder),
                exclude_patterns: req.exclude_patterns.unwrap_or_default(),
                header: Some(format!("{name} ({} files)", paths.len())),
            };
            ToolOutput::success(&json!({
                "project_name": name,
                "file_count": paths.len(),
                "tree": render_file_tree(&paths, &options),
            }))
        })
        .await
    }

    pub async fn get_file_metadata(&self, req: GetFileMetadataRequest) -> ToolOutput {
        self.guarded(|s| async move {
            s.respond(s.service.get_file_metadata(&req.path).await)
                .await
        })
        .await
    }

    pub async fn detect_conventions(&self, req: DetectConventionsRequest) -> ToolOutput {
        self.guarded(|s| async move {
            s.respond(s.service.detect_conventions(req.project_name.as_deref()).await)
                .await
        })
        .await
    }

    pub async fn get_recently_modified_files(
        &self,
        req: GetRecentlyModifiedFilesRequest,
    ) -> ToolOutput {
        self.guarded(|s| async move {
            let result = s
                .service
                .get_recently_modified_files(req.count, req.project_name.as_deref())
                .await;
            s.respond(result).await
        })
        .await
    }

    pub async fn search_symbols(&self, req: SearchSymbolsRequest) -> ToolOutput {
        self.guarded(|s| async move {
            let result = s
                .service
                .search_symbols(
                    &req.query,
                    req.kind.as_deref(),
                    req.scope.as_deref(),
                    req.top_k,
                )
                .await;
            s.respond(result).await
        })
        .await
    }

    pub async fn get_symbol_detail(&self, req: SymbolRequest) -> ToolOutput {
        self.guarded(|s| async move {
            s.respond(s.service.get_symbol_detail(&req.symbol_id).await)
                .await
        })
        .await
    }

    pub async fn get_type_members(&self, req: GetTypeMembersRequest) -> ToolOutput {
        self.guarded(|s| async move {
            let result = s
                .service
                .get_type_members(
                    &req.type_id,
                    req.kind.as_deref(),
                    req.accessibility.as_deref(),
                )
                .await;
            s.respond(result).await
        })
        .await
    }

    pub async fn get_type_hierarchy(&self, req: GetTypeHierarchyRequest) -> ToolOutput {
        self.guarded(|s| async move {
            let cancel = s.call_token();
            let result = s.service.get_type_hierarchy(&req.type_id, &cancel).await;
            s.respond(result).await
        })
        .await
    }

    pub async fn get_interface_implementations(
        &self,
        req: GetInterfaceImplementationsRequest,
    ) -> ToolOutput {
        self.guarded(|s| async move {
            let cancel = s.call_token();
            let result = s
                .service
                .get_interface_implementations(&req.interface_id, &cancel)
                .await;
            s.respond(result).await
        })
        .await
    }

    pub async fn get_callers(&self, req: SymbolRequest) -> ToolOutput {
        self.guarded(|s| async move {
            let cancel = s.call_token();
            let result = s.service.get_callers(&req.symbol_id, &cancel).await;
            s.respond(result).await
        })
        .await
    }

    pub async fn get_callees(&self, req: SymbolRequest) -> ToolOutput {
        self.guarded(|s| async move {
            let cancel = s.call_token();
            let result = s.service.get_callees(&req.symbol_id, &cancel).await;
            s.respond(result).await
        })
        .await
    }

    pub async fn get_usages(&self, req: SymbolRequest) -> ToolOutput {
        self.guarded(|s| async move {
            let cancel = s.call_token();
            let result = s.service.get_usages(&req.symbol_id, &cancel).await;
            s.respond(result).await
        })
        .await
    }

    pub async fn get_dependency_graph(&self, req: GetDependencyGraphRequest) -> ToolOutput {
        self.guarded(|s| async move {
            let result = s
                .service
                .get_dependency_graph(req.project_name.as_deref(), req.depth)
                .await;
            s.respond(result).await
        })
        .await
    }

    pub async fn get_namespace_types(&self, req: GetNamespaceTypesRequest) -> ToolOutput {
        self.guarded(|s| async move {
            let result = s
                .service
                .get_namespace_types(&req.namespace, req.include_sub_namespaces.unwrap_or(false))
                .await;
            s.respond(result).await
        })
        .await
    }
}
