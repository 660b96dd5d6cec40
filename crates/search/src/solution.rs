use crate::error::{QueryError, Result};
use crate::service::SemanticQueryService;
use codeintel_protocol::results::{
    ConventionsReport, DependencyGraph, FileMetadata, ProjectMetadata, ProjectSummary,
    RecentFiles, SolutionOverview, TypeSummary,
};
use codeintel_protocol::{relative_path, resolve_under, FileEntryInfo, ProjectInfo, SolutionInfo};

pub const DEFAULT_GRAPH_DEPTH: usize = 2;
pub const DEFAULT_RECENT_FILES: usize = 10;
pub const MAX_RECENT_FILES: usize = 100;

const PROJECT_HINT: &str = "Use get_solution_info to list projects.";

fn find_project<'a>(info: &'a SolutionInfo, name: &str) -> Result<&'a ProjectInfo> {
    info.find_project(name)
        .ok_or_else(|| QueryError::not_found("Project", name.trim(), PROJECT_HINT))
}

fn optional_name(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|n| !n.is_empty())
}

impl SemanticQueryService {
    pub async fn solution_overview(&self) -> Result<SolutionOverview> {
        let state = self.state().await?;
        let info = &state.info;
        Ok(SolutionOverview {
            name: info.name.clone(),
            path: info.path.clone(),
            projects: info
                .projects
                .iter()
                .map(|p| ProjectSummary {
                    name: p.name.clone(),
                    project_file_path: p.project_file_path.clone(),
                    target_frameworks: p.target_frameworks.clone(),
                    statistics: p.statistics,
                })
                .collect(),
            statistics: info.statistics,
            conventions: info.conventions.clone(),
        })
    }

    /// Full solution model, for renderers that need more than the overview.
    pub async fn solution_info(&self) -> Result<SolutionInfo> {
        self.context().require_solution_info().await
    }

    pub async fn get_project_metadata(&self, project_name: &str) -> Result<ProjectMetadata> {
        let state = self.state().await?;
        let project = find_project(&state.info, project_name)?;

        let mut namespaces: Vec<String> =
            project.namespaces.iter().map(|ns| ns.name.clone()).collect();
        namespaces.sort();
        namespaces.dedup();

        Ok(ProjectMetadata {
            name: project.name.clone(),
            project_file_path: project.project_file_path.clone(),
            root_directories: project.root_directories.clone(),
            target_frameworks: project.target_frameworks.clone(),
            package_references: project.package_references.clone(),
            project_references: project.project_references.clone(),
            namespaces,
            statistics: project.statistics,
            conventions: project.conventions.clone(),
        })
    }

    /// File record and declared types for a solution-relative (or absolute) path.
    pub async fn get_file_metadata(&self, path: &str) -> Result<FileMetadata> {
        let state = self.state().await?;
        let wanted = path.trim();
        if wanted.is_empty() {
            return Err(QueryError::InvalidArgument("path must not be empty".to_string()));
        }
        let absolute = resolve_under(&state.root, wanted).display().to_string();
        let relative = wanted.replace('\\', "/");

        let found = state.info.projects.iter().find_map(|project| {
            project
                .files
                .iter()
                .find(|f| f.file_path == absolute)
                .or_else(|| project.files.iter().find(|f| f.relative_path == relative))
                .map(|file| (project, file))
        });
        let (project, file) = found.ok_or_else(|| {
            QueryError::not_found("File", wanted, "Use get_file_tree to list files.")
        })?;

        let types = project
            .types()
            .filter(|(_, ty)| {
                ty.file_path == file.file_path || ty.symbol.is_declared_in(&file.file_path)
            })
            .map(|(ns, ty)| TypeSummary::new(&ns.name, ty))
            .collect();

        Ok(FileMetadata {
            file: file.clone(),
            project_name: project.name.clone(),
            types,
        })
    }

    /// Most recently written files first.
    pub async fn get_recently_modified_files(
        &self,
        count: Option<usize>,
        project_name: Option<&str>,
    ) -> Result<RecentFiles> {
        let state = self.state().await?;
        let count = count.unwrap_or(DEFAULT_RECENT_FILES).clamp(1, MAX_RECENT_FILES);
        let projects: Vec<&ProjectInfo> = match optional_name(project_name) {
            Some(name) => vec![find_project(&state.info, name)?],
            None => state.info.projects.iter().collect(),
        };

        let mut files: Vec<&FileEntryInfo> =
            projects.iter().flat_map(|p| p.files.iter()).collect();
        let total_files = files.len();
        files.sort_by(|a, b| {
            b.last_write_unix_ms
                .cmp(&a.last_write_unix_ms)
                .then_with(|| a.file_path.cmp(&b.file_path))
        });

        Ok(RecentFiles {
            total_files,
            files: files.into_iter().take(count).cloned().collect(),
        })
    }

    /// Conventions of one project, or the merged solution-wide view.
    pub async fn detect_conventions(&self, project_name: Option<&str>) -> Result<ConventionsReport> {
        let state = self.state().await?;
        match optional_name(project_name) {
            Some(name) => {
                let project = find_project(&state.info, name)?;
                Ok(ConventionsReport {
                    project_name: Some(project.name.clone()),
                    conventions: project.conventions.clone(),
                })
            }
            None => Ok(ConventionsReport {
                project_name: None,
                conventions: state.info.conventions.clone(),
            }),
        }
    }

    pub async fn get_dependency_graph(
        &self,
        project_name: Option<&str>,
        depth: Option<usize>,
    ) -> Result<DependencyGraph> {
        let state = self.state().await?;
        let graph = state.graph.dependency_graph(
            optional_name(project_name),
            depth.unwrap_or(DEFAULT_GRAPH_DEPTH),
        )?;
        Ok(graph)
    }

    /// Solution-relative paths of every known file, optionally for one project.
    pub async fn file_paths(&self, project_name: Option<&str>) -> Result<Vec<String>> {
        let state = self.state().await?;
        let projects: Vec<&ProjectInfo> = match optional_name(project_name) {
            Some(name) => vec![find_project(&state.info, name)?],
            None => state.info.projects.iter().collect(),
        };
        Ok(projects
            .iter()
            .flat_map(|p| p.files.iter())
            .map(|f| relative_path(&state.root, &f.file_path))
            .collect())
    }
}
