use crate::cache::system_time_ms;
use crate::config::AnalyzerConfig;
use crate::conventions::{
    default_namespace, detect_test_framework, find_editor_config, is_documentation_file,
};
use crate::extract::{extract_namespaces, DocumentPaths, ExtractOptions};
use crate::manifest::{discover_solution, parse_manifest, ProjectEntry, ProjectManifest};
use crate::provider::{ProjectSource, SourceProvider};
use crate::scanner::{is_build_output, ExcludeFilter};
use crate::stats::AnalysisReport;
use crate::{IndexerError, Result};
use codeintel_protocol::model::is_generated_file_name;
use codeintel_protocol::{
    ConventionInfo, FileEntryInfo, FileKind, NamespaceInfo, NamespaceStyle, PackageReference,
    ProjectInfo, SolutionInfo,
};
use codeintel_symbol_store::{IndexedSymbol, SymbolIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Result of analyzing one document, reused verbatim while its timestamp holds.
#[derive(Debug, Clone, Default)]
struct CachedDocument {
    modified_ms: u64,
    relative_path: String,
    namespaces: Vec<NamespaceInfo>,
    namespace_literals: Vec<String>,
    file_scoped_namespaces: usize,
    block_namespaces: usize,
    line_count: usize,
    auto_generated: bool,
}

type DocumentCache = HashMap<PathBuf, Arc<CachedDocument>>;

#[derive(Debug, Clone)]
struct DocumentJob {
    path: PathBuf,
    relative_path: String,
    modified_ms: u64,
}

/// Walks projects through a [`SourceProvider`], extracts the symbol model, keeps the
/// [`SymbolIndex`] in step and reuses unchanged documents between passes.
pub struct ProjectAnalyzer {
    provider: Arc<dyn SourceProvider>,
    index: Arc<SymbolIndex>,
    config: AnalyzerConfig,
    exclude: ExcludeFilter,
    documents: Mutex<HashMap<PathBuf, DocumentCache>>,
    last_report: Mutex<AnalysisReport>,
}

impl ProjectAnalyzer {
    pub fn new(
        provider: Arc<dyn SourceProvider>,
        index: Arc<SymbolIndex>,
        config: AnalyzerConfig,
    ) -> Result<Self> {
        let exclude = ExcludeFilter::new(&config.exclude_patterns)?;
        Ok(Self {
            provider,
            index,
            config,
            exclude,
            documents: Mutex::new(HashMap::new()),
            last_report: Mutex::new(AnalysisReport::new()),
        })
    }

    pub fn index(&self) -> &Arc<SymbolIndex> {
        &self.index
    }

    pub fn provider(&self) -> &Arc<dyn SourceProvider> {
        &self.provider
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub async fn last_report(&self) -> AnalysisReport {
        self.last_report.lock().await.clone()
    }

    /// Analyze every eligible project of a solution file, project file or directory.
    pub async fn analyze_solution(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<SolutionInfo> {
        if cancel.is_cancelled() {
            return Err(IndexerError::Cancelled);
        }
        let start = Instant::now();
        log::info!("Analyzing solution at {}", path.display());

        let input = path.to_path_buf();
        let layout = tokio::task::spawn_blocking(move || discover_solution(&input))
            .await
            .map_err(|e| IndexerError::Other(format!("solution discovery failed: {e}")))??;

        let mut solution = SolutionInfo {
            name: layout.name.clone(),
            path: path_string(&layout.path),
            ..SolutionInfo::default()
        };
        let mut report = AnalysisReport::new();
        let mut excluded_packages: Vec<PackageReference> = Vec::new();

        for entry in &layout.projects {
            if cancel.is_cancelled() {
                return Err(IndexerError::Cancelled);
            }
            if self.config.exclude_test_projects && self.is_excluded_project(entry, &layout.root)
            {
                log::debug!("Skipping test/sample project {}", entry.name);
                excluded_packages.extend(read_package_references(&entry.manifest_path).await);
                continue;
            }
            match self.analyze_project_inner(&entry.manifest_path, cancel).await {
                Ok((project, project_report)) => {
                    report.absorb(&project_report);
                    solution.projects.push(project);
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => log::warn!(
                    "Failed to analyze project {}: {e}",
                    entry.manifest_path.display()
                ),
            }
        }

        solution.conventions.test_framework = detect_test_framework(&excluded_packages);
        solution.recompute_totals();
        if !solution.conventions.has_editor_config {
            if let Some(found) =
                find_editor_config(&layout.root, self.config.editor_config_search_depth).await
            {
                solution.conventions.has_editor_config = true;
                solution.conventions.editor_config_path = Some(path_string(&found));
            }
        }

        report.projects = solution.projects.len();
        report.elapsed_ms = elapsed_ms(start);
        log::info!("Solution analysis completed: {report:?}");
        *self.last_report.lock().await = report;
        Ok(solution)
    }

    /// Analyze one project manifest.
    pub async fn analyze_project(
        &self,
        manifest_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<ProjectInfo> {
        let (project, report) = self.analyze_project_inner(manifest_path, cancel).await?;
        *self.last_report.lock().await = report;
        Ok(project)
    }

    /// Name token equal to a marker (any case), a name ending in a marker
    /// (`AppTests`), or a directory segment below the solution root equal to one.
    fn is_excluded_project(&self, entry: &ProjectEntry, solution_root: &Path) -> bool {
        let markers = &self.config.excluded_project_markers;
        let tokens = entry
            .name
            .split(|c: char| c == '.' || c == '-' || c == '_' || c.is_whitespace())
            .filter(|t| !t.is_empty());
        for token in tokens {
            if markers.iter().any(|m| token.eq_ignore_ascii_case(m)) {
                return true;
            }
        }
        if markers.iter().any(|m| entry.name.ends_with(m.as_str())) {
            return true;
        }
        let relative = entry
            .manifest_path
            .strip_prefix(solution_root)
            .unwrap_or(&entry.manifest_path);
        relative
            .parent()
            .into_iter()
            .flat_map(Path::components)
            .any(|c| {
                let segment = c.as_os_str().to_string_lossy();
                markers.iter().any(|m| segment.eq_ignore_ascii_case(m))
            })
    }

    #[allow(clippy::too_many_lines)]
    async fn analyze_project_inner(
        &self,
        manifest_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<(ProjectInfo, AnalysisReport)> {
        if cancel.is_cancelled() {
            return Err(IndexerError::Cancelled);
        }
        let start = Instant::now();
        let manifest_path = tokio::fs::canonicalize(manifest_path).await.map_err(|e| {
            IndexerError::InvalidPath(format!("{}: {e}", manifest_path.display()))
        })?;
        let source = self.provider.load_project(&manifest_path).await?;
        let manifest_dir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| IndexerError::InvalidPath(manifest_path.display().to_string()))?;
        let manifest = parse_manifest(&source.manifest_text, &manifest_dir);
        let primary_root = source
            .root_dirs
            .first()
            .cloned()
            .unwrap_or_else(|| manifest_dir.clone());
        let project_id = path_string(&manifest_path);

        let mut report = AnalysisReport::new();
        report.projects = 1;

        // 1. Eligible documents with their timestamps
        let mut stamped = Vec::with_capacity(source.documents.len());
        for document in dedup_paths(&source.documents) {
            let relative_path = normalize_path(&primary_root, &document);
            if !self.is_eligible_document(&document, &relative_path) {
                report.documents_skipped += 1;
                continue;
            }
            match tokio::fs::metadata(&document).await.and_then(|m| m.modified()) {
                Ok(modified) => stamped.push(DocumentJob {
                    path: document,
                    relative_path,
                    modified_ms: system_time_ms(modified),
                }),
                Err(e) => report.add_failure(format!("{}: {e}", document.display())),
            }
        }

        // 2. Split against the previous pass
        let previous: DocumentCache = self
            .documents
            .lock()
            .await
            .get(&manifest_path)
            .cloned()
            .unwrap_or_default();
        let live: HashSet<&PathBuf> = stamped.iter().map(|job| &job.path).collect();
        let mut purged = 0;
        for gone in previous.keys().filter(|p| !live.contains(p)) {
            purged += self.index.invalidate_by_file(&path_string(gone));
        }
        if purged > 0 {
            log::info!("Purged {purged} symbols from deleted documents");
        }

        let mut kept: DocumentCache = HashMap::new();
        let mut changed = Vec::new();
        for job in stamped {
            match previous.get(&job.path) {
                Some(cached) if cached.modified_ms == job.modified_ms => {
                    kept.insert(job.path, Arc::clone(cached));
                }
                _ => changed.push(job),
            }
        }
        report.documents_reused = kept.len();
        if !previous.is_empty() {
            log::info!(
                "Incremental: processing {} of {} documents",
                changed.len(),
                changed.len() + kept.len()
            );
        }

        // 3. Re-analyze what changed
        for job in &changed {
            self.index.invalidate_by_file(&path_string(&job.path));
        }
        let outcomes = match self.process_documents_parallel(&changed, &project_id, cancel).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                for job in &changed {
                    self.index.invalidate_by_file(&path_string(&job.path));
                }
                return Err(e);
            }
        };
        for (path, outcome) in outcomes {
            match outcome {
                Ok(document) => {
                    if document.auto_generated {
                        report.documents_skipped += 1;
                    } else {
                        report.documents_analyzed += 1;
                    }
                    kept.insert(path, Arc::new(document));
                }
                Err(e) => {
                    log::warn!("Failed to analyze document: {e}");
                    report.add_failure(e);
                }
            }
        }

        // 4. Single-threaded merge
        let mut ordered: Vec<&Arc<CachedDocument>> = kept.values().collect();
        ordered.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        let (namespaces, merged_keys) = merge_documents(&ordered);
        self.sync_index(&project_id, &namespaces, &merged_keys);

        let files = self
            .collect_files(&source, &primary_root, &project_id, &kept)
            .await;
        let conventions = self
            .detect_conventions(&manifest, &primary_root, &ordered, &files)
            .await;

        let mut project = ProjectInfo {
            name: source.name.clone(),
            project_file_path: project_id.clone(),
            root_directories: source.root_dirs.iter().map(|d| path_string(d)).collect(),
            target_frameworks: manifest.target_frameworks,
            package_references: manifest.package_references,
            project_references: manifest
                .project_references
                .iter()
                .map(|p| path_string(p))
                .collect(),
            namespaces,
            files,
            conventions,
            ..ProjectInfo::default()
        };
        project.recompute_statistics();

        self.documents.lock().await.insert(manifest_path, kept);

        report.elapsed_ms = elapsed_ms(start);
        log::info!("Analyzed project {}: {report:?}", project.name);
        Ok((project, report))
    }

    fn is_eligible_document(&self, path: &Path, relative_path: &str) -> bool {
        let lower_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        !(is_generated_file_name(&lower_name)
            || is_build_output(Path::new(relative_path))
            || self.exclude.is_excluded(relative_path))
    }

    /// Documents are analyzed in waves of `max_concurrency` tasks. Cancellation aborts
    /// the current wave; nothing from it is returned.
    async fn process_documents_parallel(
        &self,
        jobs: &[DocumentJob],
        project_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<(PathBuf, std::result::Result<CachedDocument, String>)>> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }
        let options = ExtractOptions {
            include_private: self.config.include_private_members,
            include_forwarding: self.config.include_forwarding_methods,
        };
        let mut aggregated = Vec::with_capacity(jobs.len());

        for wave in jobs.chunks(self.config.effective_concurrency()) {
            if cancel.is_cancelled() {
                return Err(IndexerError::Cancelled);
            }
            let mut tasks = JoinSet::new();
            for job in wave {
                let provider = Arc::clone(&self.provider);
                let index = Arc::clone(&self.index);
                let project_id = project_id.to_string();
                let job = job.clone();
                tasks.spawn(async move {
                    let path = job.path.clone();
                    let outcome =
                        analyze_document(provider, index, job, &project_id, options).await;
                    (path, outcome)
                });
            }

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        tasks.abort_all();
                        while tasks.join_next().await.is_some() {}
                        log::info!("Document analysis cancelled");
                        return Err(IndexerError::Cancelled);
                    }
                    next = tasks.join_next() => match next {
                        None => break,
                        Some(Ok(result)) => aggregated.push(result),
                        Some(Err(e)) => log::warn!("Task panicked: {e}"),
                    },
                }
            }
        }

        Ok(aggregated)
    }

    /// Re-adds every merged partial type with its combined view, then makes sure
    /// everything in the merged model is present.
    fn sync_index(
        &self,
        project_id: &str,
        namespaces: &[NamespaceInfo],
        merged_keys: &HashSet<String>,
    ) {
        for ns in namespaces {
            for ty in &ns.types {
                let entry = IndexedSymbol::for_type(project_id, &ns.name, ty);
                if merged_keys.contains(ty.symbol.key()) {
                    self.index.upsert(entry);
                } else {
                    self.index.add_symbol(entry);
                }
                for member in &ty.members {
                    self.index
                        .add_symbol(IndexedSymbol::for_member(project_id, &ns.name, ty, member));
                }
            }
        }
    }

    async fn collect_files(
        &self,
        source: &ProjectSource,
        primary_root: &Path,
        project_id: &str,
        documents: &DocumentCache,
    ) -> Vec<FileEntryInfo> {
        let all: BTreeSet<&PathBuf> = source
            .documents
            .iter()
            .chain(source.other_files.iter())
            .collect();
        let mut files = Vec::with_capacity(all.len());
        for path in all {
            let meta = match tokio::fs::metadata(path).await {
                Ok(meta) => meta,
                Err(e) => {
                    log::debug!("Skipping unreadable file {}: {e}", path.display());
                    continue;
                }
            };
            let kind = FileKind::classify(path);
            let line_count = match documents.get(path) {
                Some(doc) => doc.line_count,
                None if is_text_kind(kind) => count_lines(path).await,
                None => 0,
            };
            files.push(FileEntryInfo {
                file_path: path_string(path),
                relative_path: normalize_path(primary_root, path),
                project_file_path: project_id.to_string(),
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default(),
                size_bytes: meta.len(),
                line_count,
                last_write_unix_ms: meta.modified().map(system_time_ms).unwrap_or(0),
                kind,
            });
        }
        files
    }

    async fn detect_conventions(
        &self,
        manifest: &ProjectManifest,
        primary_root: &Path,
        documents: &[&Arc<CachedDocument>],
        files: &[FileEntryInfo],
    ) -> ConventionInfo {
        let editor_config =
            find_editor_config(primary_root, self.config.editor_config_search_depth).await;
        let literals: BTreeSet<&str> = documents
            .iter()
            .flat_map(|doc| doc.namespace_literals.iter().map(String::as_str))
            .collect();
        let (file_scoped, block) = documents.iter().fold((0, 0), |(f, b), doc| {
            (f + doc.file_scoped_namespaces, b + doc.block_namespaces)
        });
        let mut documentation_files: Vec<String> = files
            .iter()
            .filter(|f| is_documentation_file(&f.relative_path))
            .map(|f| f.file_path.clone())
            .collect();
        documentation_files.sort();

        ConventionInfo {
            has_editor_config: editor_config.is_some(),
            editor_config_path: editor_config.as_deref().map(path_string),
            nullable_enabled: manifest.nullable_enabled,
            implicit_usings_enabled: manifest.implicit_usings_enabled,
            default_namespace: default_namespace(literals)
                .or_else(|| manifest.root_namespace.clone()),
            namespace_style: NamespaceStyle::from_counts(file_scoped, block),
            test_framework: detect_test_framework(&manifest.package_references),
            documentation_files,
        }
    }
}

async fn analyze_document(
    provider: Arc<dyn SourceProvider>,
    index: Arc<SymbolIndex>,
    job: DocumentJob,
    project_id: &str,
    options: ExtractOptions,
) -> std::result::Result<CachedDocument, String> {
    let text = tokio::fs::read_to_string(&job.path)
        .await
        .map_err(|e| format!("{}: {e}", job.path.display()))?;

    let parse_path = job.path.clone();
    let model = tokio::task::spawn_blocking(move || provider.parse_document(&parse_path, &text))
        .await
        .map_err(|e| format!("Task panicked: {e}"))?
        .map_err(|e| format!("{}: {e}", job.path.display()))?;

    if model.auto_generated {
        log::debug!("Skipping auto-generated document {}", job.path.display());
        return Ok(CachedDocument {
            modified_ms: job.modified_ms,
            relative_path: job.relative_path,
            line_count: model.line_count,
            auto_generated: true,
            ..CachedDocument::default()
        });
    }

    let file_path = path_string(&job.path);
    let namespaces = extract_namespaces(
        &model,
        DocumentPaths {
            file_path: &file_path,
            relative_path: &job.relative_path,
        },
        options,
    );
    for ns in &namespaces {
        for ty in &ns.types {
            index.add_symbol(IndexedSymbol::for_type(project_id, &ns.name, ty));
            for member in &ty.members {
                index.add_symbol(IndexedSymbol::for_member(project_id, &ns.name, ty, member));
            }
        }
    }

    Ok(CachedDocument {
        modified_ms: job.modified_ms,
        relative_path: job.relative_path,
        namespaces,
        namespace_literals: model.namespace_literals,
        file_scoped_namespaces: model.file_scoped_namespaces,
        block_namespaces: model.block_namespaces,
        line_count: model.line_count,
        auto_generated: false,
    })
}

/// Fold per-document namespaces into one list: namespaces match by name, a type key
/// seen more than once merges into a single partial type. Returns the keys that merged.
fn merge_documents(documents: &[&Arc<CachedDocument>]) -> (Vec<NamespaceInfo>, HashSet<String>) {
    let mut namespaces: Vec<NamespaceInfo> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut type_slots: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    let mut merged = HashSet::new();

    for document in documents {
        for ns in &document.namespaces {
            let ns_slot = *positions.entry(ns.name.clone()).or_insert_with(|| {
                namespaces.push(NamespaceInfo {
                    name: ns.name.clone(),
                    types: Vec::new(),
                    file_path: ns.file_path.clone(),
                });
                namespaces.len() - 1
            });
            for ty in &ns.types {
                let key = ty.symbol.key().to_string();
                if let Some(&(existing_ns, existing_ty)) = type_slots.get(&key) {
                    namespaces[existing_ns].types[existing_ty].merge_partial(ty.clone());
                    merged.insert(key);
                } else {
                    let types = &mut namespaces[ns_slot].types;
                    types.push(ty.clone());
                    type_slots.insert(key, (ns_slot, types.len() - 1));
                }
            }
        }
    }
    (namespaces, merged)
}

async fn read_package_references(manifest_path: &Path) -> Vec<PackageReference> {
    let Some(dir) = manifest_path.parent() else {
        return Vec::new();
    };
    match tokio::fs::read_to_string(manifest_path).await {
        Ok(text) => parse_manifest(&text, dir).package_references,
        Err(e) => {
            log::debug!("Cannot read {}: {e}", manifest_path.display());
            Vec::new()
        }
    }
}

async fn count_lines(path: &Path) -> usize {
    tokio::fs::read(path)
        .await
        .map(|bytes| {
            if bytes.is_empty() {
                0
            } else {
                let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
                newlines + usize::from(bytes.last() != Some(&b'\n'))
            }
        })
        .unwrap_or(0)
}

fn is_text_kind(kind: FileKind) -> bool {
    matches!(
        kind,
        FileKind::Source | FileKind::Generated | FileKind::Config | FileKind::Doc
    )
}

fn dedup_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let unique: BTreeSet<&PathBuf> = paths.iter().collect();
    unique.into_iter().cloned().collect()
}

pub(crate) fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// `/`-separated path relative to `root` (unchanged when outside it).
pub(crate) fn normalize_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut normalized = relative.to_string_lossy().to_string();
    if normalized.contains('\\') {
        normalized = normalized.replace('\\', "/");
    }
    normalized
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::WorkspaceProvider;

    fn analyzer(config: AnalyzerConfig) -> ProjectAnalyzer {
        ProjectAnalyzer::new(
            Arc::new(WorkspaceProvider::new()),
            Arc::new(SymbolIndex::new()),
            config,
        )
        .unwrap()
    }

    fn entry(name: &str, manifest: &str) -> ProjectEntry {
        ProjectEntry {
            name: name.to_string(),
            manifest_path: PathBuf::from(manifest),
        }
    }

    #[test]
    fn test_and_sample_projects_are_recognized() {
        let analyzer = analyzer(AnalyzerConfig::default());
        let root = Path::new("/repo");
        assert!(analyzer.is_excluded_project(&entry("App.Tests", "/repo/App.Tests/App.Tests.csproj"), root));
        assert!(analyzer.is_excluded_project(&entry("AppTests", "/repo/AppTests/AppTests.csproj"), root));
        assert!(analyzer.is_excluded_project(&entry("Demo", "/repo/samples/Demo/Demo.csproj"), root));
        assert!(!analyzer.is_excluded_project(&entry("Contest", "/repo/Contest/Contest.csproj"), root));
        assert!(!analyzer.is_excluded_project(&entry("App.Core", "/repo/src/App.Core/App.Core.csproj"), root));
    }

    #[test]
    fn generated_and_excluded_documents_are_ineligible() {
        let mut config = AnalyzerConfig::default();
        config.exclude_patterns = vec!["Migrations".to_string()];
        let analyzer = analyzer(config);
        assert!(!analyzer.is_eligible_document(Path::new("/p/Form.Designer.cs"), "Form.Designer.cs"));
        assert!(!analyzer.is_eligible_document(Path::new("/p/obj/X.cs"), "obj/X.cs"));
        assert!(!analyzer.is_eligible_document(Path::new("/p/Data/Migrations/M1.cs"), "Data/Migrations/M1.cs"));
        assert!(analyzer.is_eligible_document(Path::new("/p/Services/A.cs"), "Services/A.cs"));
    }

    #[test]
    fn normalize_path_strips_root() {
        assert_eq!(
            normalize_path(Path::new("/repo/App"), Path::new("/repo/App/Services/A.cs")),
            "Services/A.cs"
        );
        assert_eq!(normalize_path(Path::new("/other"), Path::new("/repo/A.cs")), "/repo/A.cs");
    }
}
