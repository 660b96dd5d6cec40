//! # Codeintel Indexer
//!
//! Solution discovery and incremental project analysis.
//!
//! ## Pipeline
//!
//! ```text
//! .sln / .slnx / .csproj / directory
//!     │
//!     ├──> Solution discovery (manifest + solution parsing)
//!     │      └─> Projects (test/sample projects filtered)
//!     │
//!     ├──> SourceProvider::load_project (.gitignore aware walk)
//!     │      └─> Documents + other files
//!     │
//!     ├──> Per-document analysis (waves of tokio tasks, mtime cache)
//!     │      └─> NamespaceInfo / TypeInfo / MemberInfo + SymbolIndex entries
//!     │
//!     └──> Merge, conventions, statistics
//!            └─> SolutionInfo (optionally persisted in SolutionCache)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codeintel_indexer::{AnalyzerConfig, ProjectAnalyzer, WorkspaceProvider};
//! use codeintel_symbol_store::SymbolIndex;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = ProjectAnalyzer::new(
//!         Arc::new(WorkspaceProvider::new()),
//!         Arc::new(SymbolIndex::new()),
//!         AnalyzerConfig::default(),
//!     )?;
//!     let solution = analyzer
//!         .analyze_solution("/path/to/App.sln".as_ref(), &CancellationToken::new())
//!         .await?;
//!
//!     println!("{} projects, {} types", solution.projects.len(), solution.statistics.type_count);
//!     Ok(())
//! }
//! ```

mod analyzer;
mod cache;
mod config;
mod conventions;
mod error;
mod extract;
mod manifest;
mod provider;
mod scanner;
mod stats;

pub use analyzer::ProjectAnalyzer;
pub use cache::{CachedSolution, SolutionCache, CACHE_SCHEMA_VERSION};
pub use config::{AnalyzerConfig, CacheConfig, CONFIG_FILE_NAME};
pub use conventions::{detect_test_framework, find_editor_config, is_documentation_file};
pub use error::{IndexerError, Result};
pub use extract::{extract_namespaces, DocumentPaths, ExtractOptions};
pub use manifest::{
    discover_solution, parse_manifest, ProjectEntry, ProjectManifest, SolutionLayout,
};
pub use provider::{
    BodyOperation, ProjectSource, ReferenceHit, SemanticEngine, SourceProvider,
    WorkspaceProvider,
};
pub use scanner::{ExcludeFilter, ProjectScanner};
pub use stats::AnalysisReport;
