//! Tests for the project dependency graph

use codeintel_graph::{GraphError, ProjectGraph, MAX_DEPTH};
use codeintel_protocol::results::{DependencyEdgeKind, DependencyNodeKind};
use codeintel_protocol::{PackageReference, ProjectInfo, SolutionInfo};
use pretty_assertions::assert_eq;

fn project(name: &str, packages: &[(&str, &str)], references: &[&str]) -> ProjectInfo {
    ProjectInfo {
        name: name.to_string(),
        project_file_path: manifest(name),
        package_references: packages
            .iter()
            .map(|(n, v)| PackageReference {
                name: (*n).to_string(),
                version: Some((*v).to_string()),
            })
            .collect(),
        project_references: references.iter().map(|r| manifest(r)).collect(),
        ..ProjectInfo::default()
    }
}

fn manifest(name: &str) -> String {
    format!("/repo/src/{name}/{name}.csproj")
}

/// Api → Core → Shared, with packages on each.
fn solution() -> SolutionInfo {
    SolutionInfo {
        name: "App".to_string(),
        path: "/repo/App.sln".to_string(),
        projects: vec![
            project("Api", &[("Serilog", "3.1.1")], &["Core"]),
            project("Core", &[("Dapper", "2.1.0")], &["Shared"]),
            project("Shared", &[], &[]),
        ],
        ..SolutionInfo::default()
    }
}

fn names(graph: &codeintel_protocol::results::DependencyGraph) -> Vec<&str> {
    graph.nodes.iter().map(|n| n.name.as_str()).collect()
}

#[test]
fn test_api_references_core() {
    let graph = ProjectGraph::from_solution(&solution());
    let view = graph.dependency_graph(Some("Api"), 1).unwrap();

    assert_eq!(view.root_project.as_deref(), Some("Api"));
    assert_eq!(names(&view), vec!["Api", "Serilog", "Core"]);
    assert!(view.edges.iter().any(|e| e.from == manifest("Api")
        && e.to == manifest("Core")
        && e.kind == DependencyEdgeKind::ProjectReference));
    let serilog = view.node_named("Serilog").unwrap();
    assert_eq!(serilog.kind, DependencyNodeKind::Package);
    assert_eq!(serilog.id, "pkg:Serilog");
    assert_eq!(serilog.version.as_deref(), Some("3.1.1"));
}

#[test]
fn test_filtered_graph_excludes_dependents() {
    let graph = ProjectGraph::from_solution(&solution());
    let view = graph.dependency_graph(Some("core"), 1).unwrap();

    assert!(view.node_named("Api").is_none());
    assert_eq!(names(&view), vec!["Core", "Dapper", "Shared"]);
}

#[test]
fn test_packages_only_at_first_hop() {
    let graph = ProjectGraph::from_solution(&solution());
    let view = graph.dependency_graph(Some("Api"), 3).unwrap();

    assert_eq!(names(&view), vec!["Api", "Serilog", "Core", "Shared"]);
    assert!(view.node_named("Dapper").is_none());
    assert_eq!(view.edges.len(), 3);
}

#[test]
fn test_depth_is_clamped() {
    let graph = ProjectGraph::from_solution(&solution());
    assert_eq!(graph.dependency_graph(Some("Api"), 0).unwrap().depth, 1);
    assert_eq!(graph.dependency_graph(Some("Api"), 42).unwrap().depth, MAX_DEPTH);
}

#[test]
fn test_whole_solution_deduplicates_nodes() {
    let mut info = solution();
    info.projects[2]
        .package_references
        .push(PackageReference {
            name: "Serilog".to_string(),
            version: Some("3.1.1".to_string()),
        });
    let graph = ProjectGraph::from_solution(&info);
    let view = graph.dependency_graph(None, 2).unwrap();

    assert_eq!(view.root_project, None);
    assert_eq!(view.nodes.len(), 5);
    assert_eq!(
        view.nodes.iter().filter(|n| n.id == "pkg:Serilog").count(),
        1
    );
    // 2 project references + 3 package references
    assert_eq!(view.edges.len(), 5);
}

#[test]
fn test_unknown_project_is_an_error() {
    let graph = ProjectGraph::from_solution(&solution());
    let err = graph.dependency_graph(Some("Web"), 1).unwrap_err();
    assert_eq!(err, GraphError::ProjectNotFound("Web".to_string()));
}

#[test]
fn test_reference_outside_solution_is_a_leaf() {
    let mut info = solution();
    info.projects[2]
        .project_references
        .push("/vendor/Legacy/Legacy.csproj".to_string());
    let graph = ProjectGraph::from_solution(&info);
    assert_eq!(graph.node_count(), 6);

    let view = graph.dependency_graph(Some("Shared"), 1).unwrap();
    assert_eq!(names(&view), vec!["Shared", "Legacy"]);
}
