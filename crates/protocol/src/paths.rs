//! Solution-root-relative path rendering.
//!
//! The model keeps absolute paths internally (they key the index and the document cache);
//! everything handed to an agent goes through [`RelativizePaths`] first.

use crate::model::{
    ConventionInfo, FileEntryInfo, Location, MemberInfo, NamespaceInfo, ProjectInfo,
    SolutionInfo, SymbolInfo, TypeInfo,
};
use crate::results::{
    CallerInfo, Callers, CalleeInfo, Callees, ConventionsReport, DependencyGraph,
    DependencyNodeKind, FileMetadata, InterfaceImplementations, NamespaceTypes, ProjectMetadata,
    ProjectSummary, RecentFiles, SearchHit, SearchResults, SolutionOverview, SymbolDetail,
    SymbolRef, TypeHierarchy, TypeMembers, UsageInfo, Usages,
};
use std::path::{Component, Path, PathBuf};

/// Render `path` relative to `root` with `/` separators. Paths outside the root are
/// expressed with `..` segments; they never come back absolute.
pub fn relative_path(root: &Path, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let target = Path::new(path);
    let relative = match target.strip_prefix(root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) if target.is_absolute() => diff_paths(target, root),
        Err(_) => target.to_path_buf(),
    };
    let mut normalized = relative.to_string_lossy().to_string();
    if normalized.contains('\\') {
        normalized = normalized.replace('\\', "/");
    }
    normalized
}

fn diff_paths(target: &Path, base: &Path) -> PathBuf {
    let target_parts: Vec<Component<'_>> = target.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base_parts.len() {
        out.push("..");
    }
    for part in &target_parts[common..] {
        out.push(part.as_os_str());
    }
    out
}

/// Resolve a solution-relative (or already absolute) path argument.
pub fn resolve_under(root: &Path, raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let candidate = Path::new(trimmed);
    if candidate.is_absolute() {
        return candidate.to_path_buf();
    }
    let mut value = trimmed.replace('\\', "/");
    while let Some(rest) = value.strip_prefix("./") {
        value = rest.to_string();
    }
    root.join(value)
}

pub trait RelativizePaths {
    fn relativize(&mut self, root: &Path);
}

fn fix(root: &Path, value: &mut String) {
    *value = relative_path(root, value);
}

impl<T: RelativizePaths> RelativizePaths for Vec<T> {
    fn relativize(&mut self, root: &Path) {
        for item in self {
            item.relativize(root);
        }
    }
}

impl<T: RelativizePaths> RelativizePaths for Option<T> {
    fn relativize(&mut self, root: &Path) {
        if let Some(item) = self {
            item.relativize(root);
        }
    }
}

impl RelativizePaths for Location {
    fn relativize(&mut self, root: &Path) {
        fix(root, &mut self.file_path);
    }
}

impl RelativizePaths for SymbolInfo {
    fn relativize(&mut self, root: &Path) {
        self.locations.relativize(root);
    }
}

impl RelativizePaths for MemberInfo {
    fn relativize(&mut self, root: &Path) {
        self.symbol.relativize(root);
    }
}

impl RelativizePaths for TypeInfo {
    fn relativize(&mut self, root: &Path) {
        self.symbol.relativize(root);
        self.members.relativize(root);
        fix(root, &mut self.file_path);
    }
}

impl RelativizePaths for NamespaceInfo {
    fn relativize(&mut self, root: &Path) {
        self.types.relativize(root);
        fix(root, &mut self.file_path);
    }
}

impl RelativizePaths for FileEntryInfo {
    fn relativize(&mut self, root: &Path) {
        fix(root, &mut self.file_path);
        fix(root, &mut self.project_file_path);
    }
}

impl RelativizePaths for ConventionInfo {
    fn relativize(&mut self, root: &Path) {
        if let Some(path) = self.editor_config_path.as_mut() {
            fix(root, path);
        }
        for doc in &mut self.documentation_files {
            fix(root, doc);
        }
    }
}

impl RelativizePaths for ProjectInfo {
    fn relativize(&mut self, root: &Path) {
        fix(root, &mut self.project_file_path);
        for dir in &mut self.root_directories {
            fix(root, dir);
        }
        for reference in &mut self.project_references {
            fix(root, reference);
        }
        self.namespaces.relativize(root);
        self.files.relativize(root);
        self.conventions.relativize(root);
    }
}

impl RelativizePaths for SolutionInfo {
    fn relativize(&mut self, root: &Path) {
        self.projects.relativize(root);
        self.conventions.relativize(root);
        fix(root, &mut self.path);
    }
}

impl RelativizePaths for SearchHit {
    fn relativize(&mut self, root: &Path) {
        self.location.relativize(root);
    }
}

impl RelativizePaths for SearchResults {
    fn relativize(&mut self, root: &Path) {
        self.results.relativize(root);
    }
}

impl RelativizePaths for SymbolRef {
    fn relativize(&mut self, root: &Path) {
        self.location.relativize(root);
    }
}

impl RelativizePaths for SymbolDetail {
    fn relativize(&mut self, root: &Path) {
        self.symbol.relativize(root);
    }
}

impl RelativizePaths for TypeMembers {
    fn relativize(&mut self, root: &Path) {
        self.members.relativize(root);
    }
}

impl RelativizePaths for TypeHierarchy {
    fn relativize(&mut self, root: &Path) {
        self.derived_types.relativize(root);
    }
}

impl RelativizePaths for InterfaceImplementations {
    fn relativize(&mut self, root: &Path) {
        self.implementations.relativize(root);
    }
}

impl RelativizePaths for CallerInfo {
    fn relativize(&mut self, root: &Path) {
        self.caller.relativize(root);
        self.call_sites.relativize(root);
    }
}

impl RelativizePaths for Callers {
    fn relativize(&mut self, root: &Path) {
        self.callers.relativize(root);
    }
}

impl RelativizePaths for CalleeInfo {
    fn relativize(&mut self, root: &Path) {
        self.callee.relativize(root);
    }
}

impl RelativizePaths for Callees {
    fn relativize(&mut self, root: &Path) {
        self.callees.relativize(root);
    }
}

impl RelativizePaths for UsageInfo {
    fn relativize(&mut self, root: &Path) {
        fix(root, &mut self.file_path);
    }
}

impl RelativizePaths for Usages {
    fn relativize(&mut self, root: &Path) {
        self.usages.relativize(root);
    }
}

impl RelativizePaths for FileMetadata {
    fn relativize(&mut self, root: &Path) {
        self.file.relativize(root);
    }
}

/// Type summaries already carry project-relative paths.
impl RelativizePaths for NamespaceTypes {
    fn relativize(&mut self, _root: &Path) {}
}

impl RelativizePaths for RecentFiles {
    fn relativize(&mut self, root: &Path) {
        self.files.relativize(root);
    }
}

impl RelativizePaths for ProjectSummary {
    fn relativize(&mut self, root: &Path) {
        fix(root, &mut self.project_file_path);
    }
}

impl RelativizePaths for ProjectMetadata {
    fn relativize(&mut self, root: &Path) {
        fix(root, &mut self.project_file_path);
        for dir in &mut self.root_directories {
            fix(root, dir);
        }
        for reference in &mut self.project_references {
            fix(root, reference);
        }
        self.conventions.relativize(root);
    }
}

impl RelativizePaths for SolutionOverview {
    fn relativize(&mut self, root: &Path) {
        fix(root, &mut self.path);
        self.projects.relativize(root);
        self.conventions.relativize(root);
    }
}

impl RelativizePaths for ConventionsReport {
    fn relativize(&mut self, root: &Path) {
        self.conventions.relativize(root);
    }
}

/// Project node ids are manifest paths; package ids (`pkg:<name>`) stay as they are.
impl RelativizePaths for DependencyGraph {
    fn relativize(&mut self, root: &Path) {
        let package_ids: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| n.kind == DependencyNodeKind::Package)
            .map(|n| n.id.clone())
            .collect();
        for node in &mut self.nodes {
            if node.kind == DependencyNodeKind::Project {
                fix(root, &mut node.id);
            }
        }
        for edge in &mut self.edges {
            for end in [&mut edge.from, &mut edge.to] {
                if !package_ids.contains(end) {
                    fix(root, end);
                }
            }
        }
    }
}
