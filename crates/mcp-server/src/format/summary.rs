use codeintel_protocol::{ConventionInfo, SolutionInfo};
use std::fmt::Write as _;

fn on_off(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

/// Markdown overview of a loaded solution. Paths are printed as stored, so callers
/// relativize the model first.
pub fn render_solution_summary(info: &SolutionInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Solution: {}", info.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "Path: `{}`", info.path);
    let _ = writeln!(out);

    let _ = writeln!(out, "## Projects");
    let _ = writeln!(out);
    if info.projects.is_empty() {
        let _ = writeln!(out, "_No projects found._");
    } else {
        let _ = writeln!(out, "| Project | Frameworks | Files | Types | Members |");
        let _ = writeln!(out, "|---|---|---|---|---|");
        for project in &info.projects {
            let frameworks = if project.target_frameworks.is_empty() {
                "-".to_string()
            } else {
                project.target_frameworks.join(", ")
            };
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                project.name,
                frameworks,
                project.statistics.file_count,
                project.statistics.type_count,
                project.statistics.member_count
            );
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Conventions");
    let _ = writeln!(out);
    write_conventions(&mut out, &info.conventions);
    let _ = writeln!(out);

    let stats = &info.statistics;
    let _ = writeln!(out, "## Statistics");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Projects: {}", info.projects.len());
    let _ = writeln!(
        out,
        "- Files: {} ({} source)",
        stats.file_count, stats.source_file_count
    );
    let _ = writeln!(out, "- Lines: {}", stats.total_lines);
    let _ = writeln!(out, "- Namespaces: {}", stats.namespace_count);
    let _ = writeln!(
        out,
        "- Types: {} ({} classes, {} interfaces)",
        stats.type_count, stats.class_count, stats.interface_count
    );
    let _ = write!(out, "- Members: {}", stats.member_count);
    out
}

fn write_conventions(out: &mut String, conventions: &ConventionInfo) {
    let _ = writeln!(
        out,
        "- Nullable reference types: {}",
        on_off(conventions.nullable_enabled)
    );
    let _ = writeln!(
        out,
        "- Implicit usings: {}",
        on_off(conventions.implicit_usings_enabled)
    );
    if let Some(style) = conventions.namespace_style {
        let _ = writeln!(out, "- Namespace style: {style:?}");
    }
    if let Some(ns) = &conventions.default_namespace {
        let _ = writeln!(out, "- Default namespace: {ns}");
    }
    if let Some(framework) = &conventions.test_framework {
        let _ = writeln!(out, "- Test framework: {framework}");
    }
    match &conventions.editor_config_path {
        Some(path) if conventions.has_editor_config => {
            let _ = writeln!(out, "- EditorConfig: {path}");
        }
        _ => {
            let _ = writeln!(out, "- EditorConfig: none");
        }
    }
    if !conventions.documentation_files.is_empty() {
        let _ = writeln!(
            out,
            "- Documentation: {}",
            conventions.documentation_files.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeintel_protocol::{NamespaceStyle, ProjectInfo, ProjectStatistics};

    #[test]
    fn summary_lists_projects_and_conventions() {
        let info = SolutionInfo {
            name: "Shop".to_string(),
            path: "Shop.sln".to_string(),
            projects: vec![ProjectInfo {
                name: "Shop.Api".to_string(),
                project_file_path: "src/Shop.Api/Shop.Api.csproj".to_string(),
                target_frameworks: vec!["net8.0".to_string()],
                statistics: ProjectStatistics {
                    file_count: 4,
                    type_count: 3,
                    member_count: 11,
                    ..ProjectStatistics::default()
                },
                ..ProjectInfo::default()
            }],
            statistics: ProjectStatistics {
                file_count: 4,
                source_file_count: 3,
                type_count: 3,
                class_count: 2,
                interface_count: 1,
                member_count: 11,
                ..ProjectStatistics::default()
            },
            conventions: ConventionInfo {
                nullable_enabled: true,
                namespace_style: Some(NamespaceStyle::FileScoped),
                test_framework: Some("xUnit".to_string()),
                ..ConventionInfo::default()
            },
        };

        let md = render_solution_summary(&info);
        assert!(md.starts_with("# Solution: Shop\n"));
        assert!(md.contains("| Shop.Api | net8.0 | 4 | 3 | 11 |"));
        assert!(md.contains("- Nullable reference types: enabled"));
        assert!(md.contains("- Implicit usings: disabled"));
        assert!(md.contains("- Namespace style: FileScoped"));
        assert!(md.contains("- Test framework: xUnit"));
        assert!(md.contains("- EditorConfig: none"));
        assert!(md.contains("- Types: 3 (2 classes, 1 interfaces)"));
    }

    #[test]
    fn empty_solution_says_so() {
        let md = render_solution_summary(&SolutionInfo::default());
        assert!(md.contains("_No projects found._"));
        assert!(md.ends_with("- Members: 0"));
    }
}
