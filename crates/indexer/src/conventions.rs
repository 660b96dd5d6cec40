use codeintel_protocol::PackageReference;
use std::path::{Path, PathBuf};

/// Package-name fragments and the framework each one implies, checked in order.
const TEST_FRAMEWORKS: &[(&str, &str)] = &[
    ("xunit", "xUnit"),
    ("nunit", "NUnit"),
    ("mstest", "MSTest"),
    ("tunit", "TUnit"),
];

const DOC_PREFIXES: &[&str] = &["readme", "contributing", "changelog", "architecture"];

/// Nearest `.editorconfig` in `start` or up to `max_parents` directories above it.
pub async fn find_editor_config(start: &Path, max_parents: usize) -> Option<PathBuf> {
    let mut dir = Some(start);
    for _ in 0..=max_parents {
        let current = dir?;
        let candidate = current.join(".editorconfig");
        if tokio::fs::metadata(&candidate)
            .await
            .is_ok_and(|m| m.is_file())
        {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

pub fn detect_test_framework(packages: &[PackageReference]) -> Option<String> {
    let names: Vec<String> = packages.iter().map(|p| p.name.to_lowercase()).collect();
    TEST_FRAMEWORKS
        .iter()
        .find(|(needle, _)| names.iter().any(|n| n.contains(needle)))
        .map(|(_, framework)| (*framework).to_string())
}

/// Longest distinct namespace literal; ties resolve to the lexically smallest.
pub fn default_namespace<'a>(literals: impl IntoIterator<Item = &'a str>) -> Option<String> {
    literals
        .into_iter()
        .filter(|ns| !ns.is_empty())
        .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
        .map(str::to_string)
}

/// `README*`, `CONTRIBUTING*`, `CHANGELOG*`, `ARCHITECTURE*` anywhere, plus markdown
/// under a `docs/` directory. `relative_path` is `/`-separated.
pub fn is_documentation_file(relative_path: &str) -> bool {
    let lower = relative_path.to_lowercase();
    let file_name = lower.rsplit('/').next().unwrap_or(&lower);
    if DOC_PREFIXES.iter().any(|p| file_name.starts_with(p)) {
        return true;
    }
    let in_docs = lower.starts_with("docs/") || lower.contains("/docs/");
    in_docs && (file_name.ends_with(".md") || file_name.ends_with(".markdown"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn package(name: &str) -> PackageReference {
        PackageReference {
            name: name.to_string(),
            version: None,
        }
    }

    #[test]
    fn test_framework_from_packages() {
        assert_eq!(
            detect_test_framework(&[package("Microsoft.NET.Test.Sdk"), package("xunit.runner.visualstudio")]),
            Some("xUnit".to_string())
        );
        assert_eq!(
            detect_test_framework(&[package("MSTest.TestFramework")]),
            Some("MSTest".to_string())
        );
        assert_eq!(detect_test_framework(&[package("Serilog")]), None);
    }

    #[test]
    fn default_namespace_is_longest_literal() {
        assert_eq!(
            default_namespace(["App", "App.Services.Users", "App.Services"]).as_deref(),
            Some("App.Services.Users")
        );
        assert_eq!(default_namespace(Vec::<&str>::new()), None);
    }

    #[test]
    fn documentation_files() {
        assert!(is_documentation_file("README.md"));
        assert!(is_documentation_file("src/Api/CHANGELOG"));
        assert!(is_documentation_file("docs/setup/install.md"));
        assert!(!is_documentation_file("docs/diagram.png"));
        assert!(!is_documentation_file("src/Readers/Parser.cs"));
    }

    #[tokio::test]
    async fn editor_config_found_in_parent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".editorconfig"), "root = true").unwrap();
        let nested = dir.path().join("src/App");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_editor_config(&nested, 5).await;
        assert_eq!(found, Some(dir.path().join(".editorconfig")));
        assert_eq!(find_editor_config(&nested, 1).await, None);
    }
}
