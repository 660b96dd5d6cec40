use crate::scanner::{has_extension, ProjectScanner};
use crate::{IndexerError, Result};
use async_trait::async_trait;
use codeintel_protocol::results::{CallerInfo, SymbolRef};
use codeintel_protocol::Location;
use codeintel_syntax::{CSharpParser, DocumentModel};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One project as enumerated by a [`SourceProvider`].
#[derive(Debug, Clone, Default)]
pub struct ProjectSource {
    pub name: String,
    pub manifest_path: PathBuf,
    pub manifest_text: String,
    pub root_dirs: Vec<PathBuf>,
    /// Source documents (`.cs`), absolute.
    pub documents: Vec<PathBuf>,
    /// Everything else under the project roots, absolute.
    pub other_files: Vec<PathBuf>,
}

/// Where projects, documents and (optionally) a live semantic engine come from.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    async fn load_project(&self, manifest_path: &Path) -> Result<ProjectSource>;

    /// Parse one document. Called from blocking worker threads.
    fn parse_document(&self, path: &Path, text: &str) -> Result<DocumentModel>;

    /// Open a whole-solution semantic session. Static providers have none.
    async fn open_live_session(
        &self,
        _solution_path: &Path,
        _cancel: &CancellationToken,
    ) -> Result<Option<Arc<dyn SemanticEngine>>> {
        Ok(None)
    }
}

/// One reference to a symbol as reported by a live engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceHit {
    pub location: Location,
    /// Source line, when the engine has it at hand.
    pub snippet: Option<String>,
    pub is_write: bool,
    pub is_implicit: bool,
}

/// An operation found while walking a member body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyOperation {
    Invocation(SymbolRef),
    ObjectCreation(SymbolRef),
}

/// Whole-program capabilities that only a compiler-grade engine provides.
#[async_trait]
pub trait SemanticEngine: Send + Sync {
    async fn resolve_symbol(
        &self,
        symbol_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<SymbolRef>>;

    async fn find_derived_types(
        &self,
        type_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SymbolRef>>;

    async fn find_implementations(
        &self,
        interface_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SymbolRef>>;

    async fn find_callers(
        &self,
        symbol_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<CallerInfo>>;

    async fn find_references(
        &self,
        symbol_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReferenceHit>>;

    /// Invocations and object creations in the symbol's body, in source order.
    async fn body_operations(
        &self,
        symbol_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<BodyOperation>>;

    async fn shutdown(&self);
}

/// Static provider backed by the file system and the tree-sitter front end.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceProvider;

impl WorkspaceProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SourceProvider for WorkspaceProvider {
    async fn load_project(&self, manifest_path: &Path) -> Result<ProjectSource> {
        let manifest_text = tokio::fs::read_to_string(manifest_path).await.map_err(|e| {
            IndexerError::Provider(format!("{}: {e}", manifest_path.display()))
        })?;
        let root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| IndexerError::InvalidPath(manifest_path.display().to_string()))?;

        let scan_root = root.clone();
        let files = tokio::task::spawn_blocking(move || ProjectScanner::new(&scan_root).scan())
            .await
            .map_err(|e| IndexerError::Other(format!("project scan failed: {e}")))?;
        let (documents, other_files): (Vec<PathBuf>, Vec<PathBuf>) =
            files.into_iter().partition(|p| has_extension(p, "cs"));

        Ok(ProjectSource {
            name: crate::manifest::file_stem(manifest_path),
            manifest_path: manifest_path.to_path_buf(),
            manifest_text,
            root_dirs: vec![root],
            documents,
            other_files,
        })
    }

    fn parse_document(&self, path: &Path, text: &str) -> Result<DocumentModel> {
        let mut parser = CSharpParser::new()?;
        Ok(parser.parse(&path.display().to_string(), text)?)
    }
}
