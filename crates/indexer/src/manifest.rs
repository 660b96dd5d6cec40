//! Project manifest and solution file parsing.
//!
//! Both are read with targeted regular expressions instead of an XML/MSBuild
//! evaluation: properties set through imports, conditions or `Directory.Build.props`
//! are not seen.

use crate::scanner::{has_extension, ProjectScanner};
use crate::{IndexerError, Result};
use codeintel_protocol::PackageReference;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path, PathBuf};

static TARGET_FRAMEWORKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<TargetFrameworks?>\s*([^<]+?)\s*</TargetFrameworks?>").expect("valid regex")
});
static PACKAGE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<PackageReference\b([^>]*?)(/?)>"#).expect("valid regex")
});
static PROJECT_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<ProjectReference\b[^>]*?\bInclude\s*=\s*"([^"]+)""#).expect("valid regex")
});
static INCLUDE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\b(?:Include|Update)\s*=\s*"([^"]+)""#).expect("valid regex"));
static VERSION_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bVersion\s*=\s*"([^"]+)""#).expect("valid regex"));
static VERSION_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^\s*<Version>\s*([^<]+?)\s*</Version>").expect("valid regex"));
static ROOT_NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<RootNamespace>\s*([^<]+?)\s*</RootNamespace>").expect("valid regex")
});
static SLN_PROJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*Project\("\{[^}]*\}"\)\s*=\s*"([^"]+)"\s*,\s*"([^"]+)""#)
        .expect("valid regex")
});
static SLNX_PROJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<Project\b[^>]*?\bPath\s*=\s*"([^"]+)""#).expect("valid regex")
});

/// Facts read from a `.csproj`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectManifest {
    pub target_frameworks: Vec<String>,
    pub package_references: Vec<PackageReference>,
    /// Absolute, lexically normalized manifest paths.
    pub project_references: Vec<PathBuf>,
    pub nullable_enabled: bool,
    pub implicit_usings_enabled: bool,
    pub root_namespace: Option<String>,
}

pub fn parse_manifest(text: &str, manifest_dir: &Path) -> ProjectManifest {
    let mut manifest = ProjectManifest::default();

    for caps in TARGET_FRAMEWORKS.captures_iter(text) {
        for tfm in caps[1].split(';').map(str::trim).filter(|t| !t.is_empty()) {
            if !manifest.target_frameworks.iter().any(|t| t == tfm) {
                manifest.target_frameworks.push(tfm.to_string());
            }
        }
    }

    for caps in PACKAGE_REFERENCE.captures_iter(text) {
        let attributes = &caps[1];
        let Some(name) = INCLUDE_ATTR.captures(attributes).map(|c| c[1].trim().to_string()) else {
            continue;
        };
        let mut version = VERSION_ATTR
            .captures(attributes)
            .map(|c| c[1].trim().to_string());
        let self_closing = &caps[2] == "/";
        if version.is_none() && !self_closing {
            if let Some(whole) = caps.get(0) {
                version = VERSION_ELEMENT
                    .captures(&text[whole.end()..])
                    .map(|c| c[1].to_string());
            }
        }
        if !manifest.package_references.iter().any(|p| p.name == name) {
            manifest.package_references.push(PackageReference { name, version });
        }
    }

    for caps in PROJECT_REFERENCE.captures_iter(text) {
        let resolved = normalize_lexically(&manifest_dir.join(caps[1].replace('\\', "/")));
        if !manifest.project_references.contains(&resolved) {
            manifest.project_references.push(resolved);
        }
    }

    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    manifest.nullable_enabled = compact.contains("<nullable>enable</nullable>");
    manifest.implicit_usings_enabled = compact.contains("<implicitusings>enable</implicitusings>")
        || compact.contains("<implicitusings>true</implicitusings>");
    manifest.root_namespace = ROOT_NAMESPACE.captures(text).map(|c| c[1].to_string());
    manifest
}

/// Resolve `.` and `..` segments without touching the file system.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub name: String,
    pub manifest_path: PathBuf,
}

/// Result of resolving a user-supplied path into a set of projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionLayout {
    pub name: String,
    /// The `.sln`/`.slnx`/`.csproj` file, or the directory for implicit solutions.
    pub path: PathBuf,
    pub root: PathBuf,
    pub projects: Vec<ProjectEntry>,
}

/// Resolve `path` (solution file, project file or directory). Blocking.
pub fn discover_solution(path: &Path) -> Result<SolutionLayout> {
    if !path.exists() {
        return Err(IndexerError::InvalidPath(format!(
            "{} does not exist",
            path.display()
        )));
    }
    let path = std::fs::canonicalize(path)?;

    if path.is_dir() {
        return discover_in_directory(&path);
    }
    if has_extension(&path, "sln") || has_extension(&path, "slnx") {
        return read_solution_file(&path);
    }
    if has_extension(&path, "csproj") {
        let root = parent_dir(&path)?;
        return Ok(SolutionLayout {
            name: file_stem(&path),
            projects: vec![ProjectEntry {
                name: file_stem(&path),
                manifest_path: path.clone(),
            }],
            path,
            root,
        });
    }
    Err(IndexerError::InvalidPath(format!(
        "{} is not a .sln, .slnx, .csproj or directory",
        path.display()
    )))
}

fn discover_in_directory(dir: &Path) -> Result<SolutionLayout> {
    let mut solutions: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && (has_extension(p, "sln") || has_extension(p, "slnx")))
        .collect();
    solutions.sort();
    if let Some(first) = solutions.first() {
        if solutions.len() > 1 {
            log::warn!(
                "{} solution files in {}; using {}",
                solutions.len(),
                dir.display(),
                first.display()
            );
        }
        return read_solution_file(first);
    }

    let projects: Vec<ProjectEntry> = ProjectScanner::new(dir)
        .across_projects()
        .scan_extension("csproj")
        .into_iter()
        .map(|manifest_path| ProjectEntry {
            name: file_stem(&manifest_path),
            manifest_path,
        })
        .collect();
    if projects.is_empty() {
        return Err(IndexerError::InvalidPath(format!(
            "no solution or project files under {}",
            dir.display()
        )));
    }
    let name = dir
        .file_name()
        .map_or_else(|| "solution".to_string(), |n| n.to_string_lossy().to_string());
    Ok(SolutionLayout {
        name,
        path: dir.to_path_buf(),
        root: dir.to_path_buf(),
        projects,
    })
}

fn read_solution_file(path: &Path) -> Result<SolutionLayout> {
    let text = std::fs::read_to_string(path)?;
    let root = parent_dir(path)?;
    let projects = if has_extension(path, "slnx") {
        parse_slnx(&text, &root)
    } else {
        parse_sln(&text, &root)
    };
    Ok(SolutionLayout {
        name: file_stem(path),
        path: path.to_path_buf(),
        root,
        projects,
    })
}

/// `Project("{FAE04EC0-…}") = "Api", "src\Api\Api.csproj", "{…}"` lines; solution
/// folders and non-C# projects are skipped.
pub fn parse_sln(text: &str, solution_dir: &Path) -> Vec<ProjectEntry> {
    SLN_PROJECT
        .captures_iter(text)
        .filter_map(|caps| {
            let relative = caps[2].replace('\\', "/");
            if !relative.to_ascii_lowercase().ends_with(".csproj") {
                return None;
            }
            Some(ProjectEntry {
                name: caps[1].to_string(),
                manifest_path: normalize_lexically(&solution_dir.join(relative)),
            })
        })
        .collect()
}

/// `<Project Path="src/Api/Api.csproj" />` elements.
pub fn parse_slnx(text: &str, solution_dir: &Path) -> Vec<ProjectEntry> {
    SLNX_PROJECT
        .captures_iter(text)
        .filter_map(|caps| {
            let relative = caps[1].replace('\\', "/");
            if !relative.to_ascii_lowercase().ends_with(".csproj") {
                return None;
            }
            let manifest_path = normalize_lexically(&solution_dir.join(&relative));
            Some(ProjectEntry {
                name: file_stem(&manifest_path),
                manifest_path,
            })
        })
        .collect()
}

fn parent_dir(path: &Path) -> Result<PathBuf> {
    path.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| IndexerError::InvalidPath(format!("{} has no parent", path.display())))
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const API_CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk.Web">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <Nullable>enable</Nullable>
    <ImplicitUsings>enable</ImplicitUsings>
    <RootNamespace>App.Api</RootNamespace>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Swashbuckle.AspNetCore" Version="6.5.0" />
    <PackageReference Include="Serilog">
      <Version>3.1.1</Version>
    </PackageReference>
    <PackageReference Include="Polly" />
  </ItemGroup>
  <ItemGroup>
    <ProjectReference Include="..\Core\Core.csproj" />
  </ItemGroup>
</Project>"#;

    #[test]
    fn parses_manifest_properties_and_references() {
        let manifest = parse_manifest(API_CSPROJ, Path::new("/repo/src/Api"));
        assert_eq!(manifest.target_frameworks, vec!["net8.0".to_string()]);
        assert_eq!(
            manifest.package_references,
            vec![
                PackageReference {
                    name: "Swashbuckle.AspNetCore".into(),
                    version: Some("6.5.0".into())
                },
                PackageReference {
                    name: "Serilog".into(),
                    version: Some("3.1.1".into())
                },
                PackageReference {
                    name: "Polly".into(),
                    version: None
                },
            ]
        );
        assert_eq!(
            manifest.project_references,
            vec![PathBuf::from("/repo/src/Core/Core.csproj")]
        );
        assert!(manifest.nullable_enabled);
        assert!(manifest.implicit_usings_enabled);
        assert_eq!(manifest.root_namespace.as_deref(), Some("App.Api"));
    }

    #[test]
    fn multi_targeting_is_split() {
        let manifest = parse_manifest(
            "<TargetFrameworks>net6.0;net8.0</TargetFrameworks>",
            Path::new("/x"),
        );
        assert_eq!(manifest.target_frameworks, vec!["net6.0", "net8.0"]);
        assert!(!manifest.nullable_enabled);
    }

    #[test]
    fn sln_lines_yield_csharp_projects_only() {
        let sln = r#"
Microsoft Visual Studio Solution File, Format Version 12.00
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "Api", "src\Api\Api.csproj", "{11111111-1111-1111-1111-111111111111}"
EndProject
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "src", "src", "{22222222-2222-2222-2222-222222222222}"
EndProject
Project("{9A19103F-16F7-4668-BE54-9A1E7A4F7556}") = "Core", "src\Core\Core.csproj", "{33333333-3333-3333-3333-333333333333}"
EndProject
"#;
        let projects = parse_sln(sln, Path::new("/repo"));
        assert_eq!(
            projects,
            vec![
                ProjectEntry {
                    name: "Api".into(),
                    manifest_path: PathBuf::from("/repo/src/Api/Api.csproj"),
                },
                ProjectEntry {
                    name: "Core".into(),
                    manifest_path: PathBuf::from("/repo/src/Core/Core.csproj"),
                },
            ]
        );
    }

    #[test]
    fn slnx_elements_are_read() {
        let slnx = r#"<Solution>
  <Folder Name="/src/">
    <Project Path="src/Api/Api.csproj" />
    <Project Path="src\Core\Core.csproj" Type="Classic C#" />
  </Folder>
</Solution>"#;
        let names: Vec<String> = parse_slnx(slnx, Path::new("/repo"))
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Api", "Core"]);
    }

    #[test]
    fn lexical_normalization() {
        assert_eq!(
            normalize_lexically(Path::new("/a/b/../c/./d.csproj")),
            PathBuf::from("/a/c/d.csproj")
        );
    }
}
