use crate::{IndexerError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Build output and tool directories never walked.
const SKIPPED_DIRS: &[&str] = &["bin", "obj", "node_modules", "packages", "TestResults"];

/// Gitignore-aware walk of one project root.
///
/// Sub-directories that hold their own `.csproj` belong to that project and are not
/// descended into (the root itself is always walked).
pub struct ProjectScanner {
    root: PathBuf,
    skip_nested_projects: bool,
}

impl ProjectScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            skip_nested_projects: true,
        }
    }

    /// Walk across project boundaries (used for solution-wide manifest discovery).
    #[must_use]
    pub fn across_projects(mut self) -> Self {
        self.skip_nested_projects = false;
        self
    }

    pub fn scan(&self) -> Vec<PathBuf> {
        let root = self.root.clone();
        let skip_nested = self.skip_nested_projects;
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .parents(true)
            .require_git(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                if !is_dir || entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if SKIPPED_DIRS.iter().any(|d| name.eq_ignore_ascii_case(d)) {
                    return false;
                }
                !(skip_nested && entry.path() != root && contains_manifest(entry.path()))
            })
            .build();

        let mut files: Vec<PathBuf> = walker
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(ignore::DirEntry::into_path)
            .collect();
        files.sort();
        files
    }

    /// Files under the root with the given extension (case-insensitive).
    pub fn scan_extension(&self, extension: &str) -> Vec<PathBuf> {
        self.scan()
            .into_iter()
            .filter(|p| has_extension(p, extension))
            .collect()
    }
}

fn contains_manifest(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries
            .filter_map(std::result::Result::ok)
            .any(|e| has_extension(&e.path(), "csproj"))
    })
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// True when any path segment is `bin` or `obj`.
pub fn is_build_output(path: &Path) -> bool {
    path.components().any(|c| {
        let segment = c.as_os_str().to_string_lossy();
        segment.eq_ignore_ascii_case("bin") || segment.eq_ignore_ascii_case("obj")
    })
}

/// Configured exclusions: case-insensitive substrings, globs when the pattern
/// contains `*` or `?`.
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    substrings: Vec<String>,
    globs: Option<GlobSet>,
}

impl ExcludeFilter {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut substrings = Vec::new();
        let mut builder = GlobSetBuilder::new();
        let mut glob_count = 0;
        for pattern in patterns {
            let trimmed = pattern.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.contains('*') || trimmed.contains('?') {
                let glob = Glob::new(&trimmed.replace('\\', "/"))
                    .map_err(|e| IndexerError::Config(format!("bad exclude glob {trimmed}: {e}")))?;
                builder.add(glob);
                glob_count += 1;
            } else {
                substrings.push(trimmed.to_lowercase().replace('\\', "/"));
            }
        }
        let globs = if glob_count > 0 {
            Some(
                builder
                    .build()
                    .map_err(|e| IndexerError::Config(format!("bad exclude globs: {e}")))?,
            )
        } else {
            None
        };
        Ok(Self { substrings, globs })
    }

    /// Matches against the `/`-separated path relative to the project root.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        let lower = relative_path.to_lowercase();
        if self.substrings.iter().any(|s| lower.contains(s.as_str())) {
            return true;
        }
        self.globs
            .as_ref()
            .is_some_and(|set| set.is_match(relative_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scan_skips_build_output_and_nested_projects() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("App.csproj"), "<Project />").unwrap();
        fs::write(root.join("Program.cs"), "class P {}").unwrap();
        fs::create_dir_all(root.join("obj/Debug")).unwrap();
        fs::write(root.join("obj/Debug/App.g.cs"), "class G {}").unwrap();
        fs::create_dir_all(root.join("Lib")).unwrap();
        fs::write(root.join("Lib/Lib.csproj"), "<Project />").unwrap();
        fs::write(root.join("Lib/Util.cs"), "class U {}").unwrap();
        fs::create_dir_all(root.join("Services")).unwrap();
        fs::write(root.join("Services/UserService.cs"), "class S {}").unwrap();

        let files = ProjectScanner::new(root).scan_extension("cs");
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["Program.cs", "Services/UserService.cs"]);

        let manifests = ProjectScanner::new(root).across_projects().scan_extension("csproj");
        assert_eq!(manifests.len(), 2);
    }

    #[test]
    fn exclude_filter_mixes_substrings_and_globs() {
        let filter =
            ExcludeFilter::new(&["Migrations".to_string(), "**/*.Designer.cs".to_string()])
                .unwrap();
        assert!(filter.is_excluded("Data/migrations/001_Init.cs"));
        assert!(filter.is_excluded("Forms/Main.Designer.cs"));
        assert!(!filter.is_excluded("Services/UserService.cs"));
    }

    #[test]
    fn build_output_detection() {
        assert!(is_build_output(Path::new("/repo/App/obj/Debug/x.cs")));
        assert!(!is_build_output(Path::new("/repo/App/Objects/x.cs")));
    }
}
