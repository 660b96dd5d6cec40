//! Loading real projects from disk through the analysis context.

use async_trait::async_trait;
use codeintel_indexer::{
    AnalyzerConfig, BodyOperation, CacheConfig, IndexerError, ProjectSource, ReferenceHit,
    SemanticEngine, SolutionCache, SourceProvider, WorkspaceProvider,
};
use codeintel_protocol::results::{CallerInfo, SymbolRef};
use codeintel_search::{AnalysisContext, ContextConfig, QueryError, SemanticQueryService};
use codeintel_syntax::DocumentModel;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const MANIFEST: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
</Project>
"#;

const ORDERS: &str = r"namespace Shop.Orders;

public interface IOrderRepository
{
    Order Load(int id);
}

public class Order
{
    public int Id { get; set; }
}

public class SqlOrderRepository : IOrderRepository
{
    public Order Load(int id) { return new Order(); }
}
";

fn write(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn shop_project(root: &Path) -> PathBuf {
    let manifest = root.join("Shop/Shop.csproj");
    write(&manifest, MANIFEST);
    write(&root.join("Shop/Orders/Orders.cs"), ORDERS);
    manifest
}

/// Workspace provider that counts parsed documents and optionally hands out a live
/// engine. The `trip_*` tokens are cancelled from the second load onwards.
#[derive(Default)]
struct RecordingProvider {
    inner: WorkspaceProvider,
    parses: AtomicUsize,
    shutdowns: Arc<AtomicUsize>,
    live: bool,
    loads: AtomicUsize,
    live_opens: AtomicUsize,
    trip_on_reload: Option<CancellationToken>,
    trip_on_live_reopen: Option<CancellationToken>,
}

#[async_trait]
impl SourceProvider for RecordingProvider {
    async fn load_project(&self, manifest_path: &Path) -> Result<ProjectSource, IndexerError> {
        if self.loads.fetch_add(1, Ordering::SeqCst) > 0 {
            if let Some(trip) = &self.trip_on_reload {
                trip.cancel();
            }
        }
        self.inner.load_project(manifest_path).await
    }

    fn parse_document(&self, path: &Path, text: &str) -> Result<DocumentModel, IndexerError> {
        self.parses.fetch_add(1, Ordering::SeqCst);
        self.inner.parse_document(path, text)
    }

    async fn open_live_session(
        &self,
        _solution_path: &Path,
        _cancel: &CancellationToken,
    ) -> Result<Option<Arc<dyn SemanticEngine>>, IndexerError> {
        if !self.live {
            return Ok(None);
        }
        if self.live_opens.fetch_add(1, Ordering::SeqCst) > 0 {
            if let Some(trip) = &self.trip_on_live_reopen {
                trip.cancel();
                return Err(IndexerError::Cancelled);
            }
        }
        Ok(Some(Arc::new(IdleEngine {
            shutdowns: Arc::clone(&self.shutdowns),
        })))
    }
}

struct IdleEngine {
    shutdowns: Arc<AtomicUsize>,
}

#[async_trait]
impl SemanticEngine for IdleEngine {
    async fn resolve_symbol(
        &self,
        _symbol_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<SymbolRef>, IndexerError> {
        Ok(None)
    }

    async fn find_derived_types(
        &self,
        _type_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SymbolRef>, IndexerError> {
        Ok(Vec::new())
    }

    async fn find_implementations(
        &self,
        _interface_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SymbolRef>, IndexerError> {
        Ok(Vec::new())
    }

    async fn find_callers(
        &self,
        _symbol_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<CallerInfo>, IndexerError> {
        Ok(Vec::new())
    }

    async fn find_references(
        &self,
        _symbol_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<ReferenceHit>, IndexerError> {
        Ok(Vec::new())
    }

    async fn body_operations(
        &self,
        _symbol_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<BodyOperation>, IndexerError> {
        Ok(Vec::new())
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

fn cached_config(cache_dir: &Path) -> ContextConfig {
    ContextConfig {
        analyzer: Some(AnalyzerConfig {
            cache: CacheConfig {
                enabled: true,
                dir: Some(cache_dir.to_path_buf()),
                ttl_secs: 3600,
            },
            ..AnalyzerConfig::default()
        }),
        use_persisted_cache: true,
    }
}

#[tokio::test]
async fn load_project_and_query_it() {
    let dir = TempDir::new().unwrap();
    let manifest = shop_project(dir.path());
    let context = Arc::new(AnalysisContext::with_workspace_provider());

    let state = context
        .load_solution(&manifest, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(state.info.projects.len(), 1);
    assert!(!state.has_live_engine());

    let service = SemanticQueryService::new(Arc::clone(&context));
    let hits = service
        .search_symbols("Order", None, None, None)
        .await
        .unwrap();
    assert_eq!(hits.results[0].symbol_id, "T:Shop.Orders.Order");

    let implementations = service
        .get_interface_implementations("IOrderRepository", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(implementations.implementations[0].name, "SqlOrderRepository");
}

#[tokio::test]
async fn loading_twice_reuses_analyzed_documents() {
    let dir = TempDir::new().unwrap();
    let manifest = shop_project(dir.path());
    let provider = Arc::new(RecordingProvider::default());
    let context = AnalysisContext::new(provider.clone(), ContextConfig::default());
    let cancel = CancellationToken::new();

    context.load_solution(&manifest, &cancel).await.unwrap();
    assert_eq!(provider.parses.load(Ordering::SeqCst), 1);

    let state = context.load_solution(&manifest, &cancel).await.unwrap();
    assert_eq!(provider.parses.load(Ordering::SeqCst), 1);
    assert!(state.index.contains_key("T:Shop.Orders.SqlOrderRepository"));
}

#[tokio::test]
async fn persisted_cache_skips_analysis() {
    let dir = TempDir::new().unwrap();
    let cache_dir = TempDir::new().unwrap();
    let manifest = shop_project(dir.path());
    let cancel = CancellationToken::new();

    let first = AnalysisContext::new(
        Arc::new(WorkspaceProvider::new()),
        cached_config(cache_dir.path()),
    );
    first.load_solution(&manifest, &cancel).await.unwrap();
    let cache = SolutionCache::new(cache_dir.path(), Duration::from_secs(3600));
    assert!(cache.entry_path(&manifest).is_file());

    let provider = Arc::new(RecordingProvider::default());
    let second = AnalysisContext::new(provider.clone(), cached_config(cache_dir.path()));
    let state = second.load_solution(&manifest, &cancel).await.unwrap();

    assert_eq!(provider.parses.load(Ordering::SeqCst), 0);
    assert!(state.index.contains_key("T:Shop.Orders.Order"));
    assert_eq!(state.info.statistics.type_count, 3);
}

#[tokio::test]
async fn reloading_releases_the_previous_live_session() {
    let dir = TempDir::new().unwrap();
    let manifest = shop_project(dir.path());
    let provider = Arc::new(RecordingProvider {
        live: true,
        ..RecordingProvider::default()
    });
    let shutdowns = Arc::clone(&provider.shutdowns);
    let context = AnalysisContext::new(provider, ContextConfig::default());
    let cancel = CancellationToken::new();

    let state = context.load_solution(&manifest, &cancel).await.unwrap();
    assert!(state.has_live_engine());
    assert_eq!(shutdowns.load(Ordering::SeqCst), 0);

    context.load_solution(&manifest, &cancel).await.unwrap();
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);

    context.clear().await;
    assert_eq!(shutdowns.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cancelled_load_keeps_nothing() {
    let dir = TempDir::new().unwrap();
    let manifest = shop_project(dir.path());
    let context = AnalysisContext::with_workspace_provider();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = context.load_solution(&manifest, &cancel).await.unwrap_err();
    assert!(matches!(err, QueryError::Cancelled));
    assert!(!context.is_loaded().await);
}

#[tokio::test]
async fn cancelled_reload_keeps_the_previous_solution_queryable() {
    let dir = TempDir::new().unwrap();
    let manifest = shop_project(dir.path());
    let trip = CancellationToken::new();
    let provider = Arc::new(RecordingProvider {
        trip_on_reload: Some(trip.clone()),
        ..RecordingProvider::default()
    });
    let context = Arc::new(AnalysisContext::new(provider, ContextConfig::default()));
    let loaded = context
        .load_solution(&manifest, &CancellationToken::new())
        .await
        .unwrap();
    let symbols = loaded.index.len();

    write(
        &dir.path().join("Shop/Orders/Orders.cs"),
        "namespace Shop.Orders;\n\npublic class Order { }\n",
    );
    let err = context.load_solution(&manifest, &trip).await.unwrap_err();
    assert!(matches!(err, QueryError::Cancelled));

    let state = context.require_state().await.unwrap();
    assert!(Arc::ptr_eq(&state, &loaded));
    assert_eq!(state.index.len(), symbols);
    assert!(state.index.contains_key("T:Shop.Orders.SqlOrderRepository"));

    let service = SemanticQueryService::new(Arc::clone(&context));
    let hits = service
        .search_symbols("SqlOrderRepository", None, None, None)
        .await
        .unwrap();
    assert_eq!(hits.results[0].symbol_id, "T:Shop.Orders.SqlOrderRepository");
    let detail = service
        .get_symbol_detail("T:Shop.Orders.SqlOrderRepository")
        .await
        .unwrap();
    assert_eq!(detail.symbol.name, "SqlOrderRepository");
}

#[tokio::test]
async fn cancelled_live_session_keeps_the_previous_solution() {
    let dir = TempDir::new().unwrap();
    let manifest = shop_project(dir.path());
    let trip = CancellationToken::new();
    let provider = Arc::new(RecordingProvider {
        live: true,
        trip_on_live_reopen: Some(trip.clone()),
        ..RecordingProvider::default()
    });
    let shutdowns = Arc::clone(&provider.shutdowns);
    let context = AnalysisContext::new(provider, ContextConfig::default());

    let loaded = context
        .load_solution(&manifest, &CancellationToken::new())
        .await
        .unwrap();
    let err = context.load_solution(&manifest, &trip).await.unwrap_err();
    assert!(matches!(err, QueryError::Cancelled));

    let state = context.require_state().await.unwrap();
    assert!(Arc::ptr_eq(&state, &loaded));
    assert!(state.has_live_engine());
    assert_eq!(shutdowns.load(Ordering::SeqCst), 0);
    assert!(context.require_live_provider("find callers").await.is_ok());
}
