use crate::error::{QueryError, Result};
use codeintel_graph::ProjectGraph;
use codeintel_indexer::{
    AnalyzerConfig, ProjectAnalyzer, SemanticEngine, SolutionCache, SourceProvider,
    WorkspaceProvider,
};
use codeintel_protocol::{MemberInfo, NamespaceInfo, ProjectInfo, SolutionInfo, TypeInfo};
use codeintel_symbol_store::SymbolIndex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct ContextConfig {
    /// Analyzer settings; `None` reads `.codeintel.toml` at the solution root.
    pub analyzer: Option<AnalyzerConfig>,
    /// Consult and update the on-disk [`SolutionCache`] when loading.
    pub use_persisted_cache: bool,
}

/// Everything one loaded solution offers to queries.
pub struct SolutionState {
    pub info: SolutionInfo,
    pub index: Arc<SymbolIndex>,
    pub live: Option<Arc<dyn SemanticEngine>>,
    pub graph: ProjectGraph,
    /// Directory all reported paths are relative to.
    pub root: PathBuf,
}

impl SolutionState {
    pub fn new(
        info: SolutionInfo,
        index: Arc<SymbolIndex>,
        live: Option<Arc<dyn SemanticEngine>>,
    ) -> Self {
        let graph = ProjectGraph::from_solution(&info);
        let root = info.root_dir().to_path_buf();
        Self {
            info,
            index,
            live,
            graph,
            root,
        }
    }

    pub fn has_live_engine(&self) -> bool {
        self.live.is_some()
    }

    /// Model declaration of the type indexed under `key`.
    pub fn find_type(&self, key: &str) -> Option<(&ProjectInfo, &NamespaceInfo, &TypeInfo)> {
        self.info
            .types()
            .find(|(_, _, ty)| ty.symbol.key() == key)
    }

    /// Model declaration of the member indexed under `key`, with its declaring type.
    pub fn find_member(
        &self,
        key: &str,
    ) -> Option<(&ProjectInfo, &NamespaceInfo, &TypeInfo, &MemberInfo)> {
        self.info.types().find_map(|(project, ns, ty)| {
            ty.members
                .iter()
                .find(|m| m.symbol.key() == key)
                .map(|member| (project, ns, ty, member))
        })
    }
}

impl std::fmt::Debug for SolutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolutionState")
            .field("solution", &self.info.name)
            .field("projects", &self.info.projects.len())
            .field("symbols", &self.index.len())
            .field("live", &self.live.is_some())
            .finish()
    }
}

/// Holder of the currently loaded solution. Shared as `Arc<AnalysisContext>`.
pub struct AnalysisContext {
    provider: Arc<dyn SourceProvider>,
    config: ContextConfig,
    state: RwLock<Option<Arc<SolutionState>>>,
    /// Analyzer of the last loaded path; kept so reloads reuse its document cache.
    analyzer: Mutex<Option<(PathBuf, Arc<ProjectAnalyzer>)>>,
}

impl AnalysisContext {
    pub fn new(provider: Arc<dyn SourceProvider>, config: ContextConfig) -> Self {
        Self {
            provider,
            config,
            state: RwLock::new(None),
            analyzer: Mutex::new(None),
        }
    }

    /// Static analysis only, default settings.
    pub fn with_workspace_provider() -> Self {
        Self::new(Arc::new(WorkspaceProvider::new()), ContextConfig::default())
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Analyze `path` and replace whatever was loaded before.
    pub async fn load_solution(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Arc<SolutionState>> {
        if cancel.is_cancelled() {
            return Err(QueryError::Cancelled);
        }
        let canonical = tokio::fs::canonicalize(path).await.map_err(|e| {
            QueryError::InvalidArgument(format!("cannot open {}: {e}", path.display()))
        })?;
        let analyzer = self.analyzer_for(&canonical).await?;

        let info = match self.cached_model(&canonical, analyzer.config()).await {
            Some(info) => {
                log::info!("Using cached model for {}", canonical.display());
                info
            }
            None => {
                let info = analyzer.analyze_solution(&canonical, cancel).await?;
                self.store_model(&canonical, analyzer.config(), &info).await;
                info
            }
        };

        // The loaded state stays untouched until the replacement is complete.
        let live = match self.provider.open_live_session(&canonical, cancel).await {
            Ok(live) => live,
            Err(e) if e.is_cancelled() => return Err(QueryError::Cancelled),
            Err(e) => {
                log::warn!("Live semantic session unavailable: {e}");
                None
            }
        };
        if cancel.is_cancelled() {
            if let Some(live) = live {
                live.shutdown().await;
            }
            return Err(QueryError::Cancelled);
        }

        let index = index_for(&info);
        let state = Arc::new(SolutionState::new(info, index, live));
        let previous = self.state.write().await.replace(Arc::clone(&state));
        if let Some(previous) = previous {
            shutdown_live(&previous).await;
        }
        log::info!("Loaded solution {state:?}");
        Ok(state)
    }

    async fn analyzer_for(&self, canonical: &Path) -> Result<Arc<ProjectAnalyzer>> {
        let mut slot = self.analyzer.lock().await;
        if let Some((loaded_path, analyzer)) = slot.as_ref() {
            if loaded_path == canonical {
                return Ok(Arc::clone(analyzer));
            }
        }
        let config = match &self.config.analyzer {
            Some(config) => config.clone(),
            None => AnalyzerConfig::load(config_root(canonical))?,
        };
        let analyzer = Arc::new(ProjectAnalyzer::new(
            Arc::clone(&self.provider),
            Arc::new(SymbolIndex::new()),
            config,
        )?);
        *slot = Some((canonical.to_path_buf(), Arc::clone(&analyzer)));
        Ok(analyzer)
    }

    fn solution_cache(&self, config: &AnalyzerConfig) -> Option<SolutionCache> {
        (self.config.use_persisted_cache || config.cache.enabled).then(|| {
            SolutionCache::new(
                config.cache.resolved_dir(),
                Duration::from_secs(config.cache.ttl_secs),
            )
        })
    }

    async fn cached_model(&self, canonical: &Path, config: &AnalyzerConfig) -> Option<SolutionInfo> {
        let cache = self.solution_cache(config)?;
        match cache.load(canonical).await {
            Ok(hit) => hit,
            Err(e) => {
                log::warn!("Ignoring analysis cache: {e}");
                None
            }
        }
    }

    async fn store_model(&self, canonical: &Path, config: &AnalyzerConfig, info: &SolutionInfo) {
        if let Some(cache) = self.solution_cache(config) {
            if let Err(e) = cache.store(canonical, info).await {
                log::warn!("Failed to write analysis cache: {e}");
            }
        }
    }

    /// Install a pre-built model without analysis or live engine.
    pub async fn set_for_testing(&self, info: SolutionInfo) {
        self.set_for_testing_with_engine(info, None).await;
    }

    /// Install a pre-built model with an optional live engine.
    pub async fn set_for_testing_with_engine(
        &self,
        info: SolutionInfo,
        live: Option<Arc<dyn SemanticEngine>>,
    ) {
        let index = index_for(&info);
        let previous = self
            .state
            .write()
            .await
            .replace(Arc::new(SolutionState::new(info, index, live)));
        if let Some(previous) = previous {
            shutdown_live(&previous).await;
        }
    }

    /// Drop the loaded solution and release its live session.
    pub async fn clear(&self) {
        let previous = self.state.write().await.take();
        if let Some(previous) = previous {
            shutdown_live(&previous).await;
        }
        *self.analyzer.lock().await = None;
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.is_some()
    }

    pub async fn require_state(&self) -> Result<Arc<SolutionState>> {
        self.state.read().await.clone().ok_or(QueryError::NotLoaded)
    }

    pub async fn require_solution_info(&self) -> Result<SolutionInfo> {
        Ok(self.require_state().await?.info.clone())
    }

    pub async fn require_live_provider(&self, operation: &str) -> Result<Arc<dyn SemanticEngine>> {
        self.require_state()
            .await?
            .live
            .clone()
            .ok_or_else(|| QueryError::unavailable(operation))
    }
}

fn config_root(canonical: &Path) -> &Path {
    if canonical.is_dir() {
        canonical
    } else {
        canonical.parent().unwrap_or(canonical)
    }
}

/// Index owned by one loaded state, separate from the analyzer's working index.
fn index_for(info: &SolutionInfo) -> Arc<SymbolIndex> {
    let index = Arc::new(SymbolIndex::new());
    let added = index.index_solution(info);
    log::debug!("Indexed {added} symbols for {}", info.name);
    index
}

async fn shutdown_live(state: &SolutionState) {
    if let Some(live) = &state.live {
        log::debug!("Shutting down live session for {}", state.info.name);
        live.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> SolutionInfo {
        SolutionInfo {
            name: "App".to_string(),
            path: "/repo/App.sln".to_string(),
            projects: vec![ProjectInfo {
                name: "App".to_string(),
                project_file_path: "/repo/App/App.csproj".to_string(),
                ..ProjectInfo::default()
            }],
            ..SolutionInfo::default()
        }
    }

    #[tokio::test]
    async fn requires_a_loaded_solution() {
        let context = AnalysisContext::with_workspace_provider();
        assert!(matches!(
            context.require_state().await,
            Err(QueryError::NotLoaded)
        ));

        context.set_for_testing(info()).await;
        assert!(context.is_loaded().await);
        let state = context.require_state().await.unwrap();
        assert_eq!(state.root, PathBuf::from("/repo"));
        assert!(matches!(
            context.require_live_provider("get_callers").await,
            Err(QueryError::Unavailable { .. })
        ));

        context.clear().await;
        assert!(!context.is_loaded().await);
    }

    #[tokio::test]
    async fn loading_missing_path_is_invalid_argument() {
        let context = AnalysisContext::with_workspace_provider();
        let err = context
            .load_solution(Path::new("/definitely/not/here.sln"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_request");
    }
}
