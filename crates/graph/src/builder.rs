use crate::graph::{package_node_id, ProjectGraph};
use codeintel_protocol::results::{DependencyEdgeKind, DependencyNode, DependencyNodeKind};
use codeintel_protocol::SolutionInfo;
use std::path::Path;

impl ProjectGraph {
    /// Graph of every project in `solution`, its package references and its project
    /// references. References to manifests outside the solution become leaf nodes
    /// named after the file.
    pub fn from_solution(solution: &SolutionInfo) -> Self {
        let mut graph = Self::new();

        for project in &solution.projects {
            graph.add_solution_project(DependencyNode {
                id: project.project_id().to_string(),
                name: project.name.clone(),
                kind: DependencyNodeKind::Project,
                version: None,
            });
        }

        for project in &solution.projects {
            let Some(from) = graph.node_by_id(project.project_id()) else {
                continue;
            };
            for package in &project.package_references {
                let to = graph.add_node(DependencyNode {
                    id: package_node_id(&package.name),
                    name: package.name.clone(),
                    kind: DependencyNodeKind::Package,
                    version: package.version.clone(),
                });
                graph.add_edge(from, to, DependencyEdgeKind::PackageReference);
            }
            for reference in &project.project_references {
                let to = graph.node_by_id(reference).unwrap_or_else(|| {
                    log::debug!(
                        "Project {} references {reference} outside the solution",
                        project.name
                    );
                    graph.add_node(DependencyNode {
                        id: reference.clone(),
                        name: external_project_name(reference),
                        kind: DependencyNodeKind::Project,
                        version: None,
                    })
                });
                graph.add_edge(from, to, DependencyEdgeKind::ProjectReference);
            }
        }

        graph
    }
}

fn external_project_name(manifest_path: &str) -> String {
    Path::new(manifest_path)
        .file_stem()
        .map_or_else(|| manifest_path.to_string(), |s| s.to_string_lossy().to_string())
}
