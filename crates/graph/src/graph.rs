use crate::error::{GraphError, Result};
use codeintel_protocol::results::{
    DependencyEdge, DependencyEdgeKind, DependencyGraph, DependencyNode,
};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};

pub const MIN_DEPTH: usize = 1;
pub const MAX_DEPTH: usize = 5;

pub fn clamp_depth(depth: usize) -> usize {
    depth.clamp(MIN_DEPTH, MAX_DEPTH)
}

/// Projects and packages as nodes, references as edges. Nodes are unique by id
/// (manifest path for projects, `pkg:<name>` for packages).
#[derive(Debug, Default)]
pub struct ProjectGraph {
    graph: DiGraph<DependencyNode, DependencyEdgeKind>,
    by_id: HashMap<String, NodeIndex>,
    /// Projects that belong to the solution, in solution order.
    projects: Vec<NodeIndex>,
}

impl ProjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing index when a node with the same id was added before.
    pub fn add_node(&mut self, node: DependencyNode) -> NodeIndex {
        if let Some(&idx) = self.by_id.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.by_id.insert(id, idx);
        idx
    }

    pub(crate) fn add_solution_project(&mut self, node: DependencyNode) -> NodeIndex {
        let idx = self.add_node(node);
        if !self.projects.contains(&idx) {
            self.projects.push(idx);
        }
        idx
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, kind: DependencyEdgeKind) {
        let exists = self
            .graph
            .edges_connecting(from, to)
            .any(|e| *e.weight() == kind);
        if !exists {
            self.graph.add_edge(from, to, kind);
        }
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&DependencyNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_by_id(&self, id: &str) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    /// Solution project by exact name or manifest path, then by name ignoring case.
    pub fn find_project(&self, name: &str) -> Option<NodeIndex> {
        let wanted = name.trim();
        let exact = self.projects.iter().copied().find(|&idx| {
            self.graph[idx].name == wanted || self.graph[idx].id == wanted
        });
        exact.or_else(|| {
            self.projects
                .iter()
                .copied()
                .find(|&idx| self.graph[idx].name.eq_ignore_ascii_case(wanted))
        })
    }

    fn targets(&self, idx: NodeIndex, kind: DependencyEdgeKind) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .edges(idx)
            .filter(|e| *e.weight() == kind)
            .map(|e| e.target())
            .collect();
        // petgraph yields edges newest first
        out.reverse();
        out
    }

    pub fn project_references(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.targets(idx, DependencyEdgeKind::ProjectReference)
    }

    pub fn packages(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.targets(idx, DependencyEdgeKind::PackageReference)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Sub-graph reachable from `root` (or every solution project) following project
    /// references up to `depth` hops. Package references are only listed for the
    /// starting projects.
    pub fn dependency_graph(&self, root: Option<&str>, depth: usize) -> Result<DependencyGraph> {
        let depth = clamp_depth(depth);
        let (starts, root_project) = match root.map(str::trim).filter(|r| !r.is_empty()) {
            Some(name) => {
                let idx = self
                    .find_project(name)
                    .ok_or_else(|| GraphError::ProjectNotFound(name.to_string()))?;
                (vec![idx], Some(self.graph[idx].name.clone()))
            }
            None => (self.projects.clone(), None),
        };

        let mut view = ViewBuilder::new(self);
        let mut visited = HashSet::new();
        let mut queue: VecDeque<(NodeIndex, usize)> = starts.iter().map(|&s| (s, 0)).collect();

        while let Some((current, hop)) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            view.push_node(current);

            if hop == 0 {
                for package in self.packages(current) {
                    view.push_node(package);
                    view.push_edge(current, package, DependencyEdgeKind::PackageReference);
                }
            }
            if hop < depth {
                for reference in self.project_references(current) {
                    view.push_node(reference);
                    view.push_edge(current, reference, DependencyEdgeKind::ProjectReference);
                    if !visited.contains(&reference) {
                        queue.push_back((reference, hop + 1));
                    }
                }
            }
        }

        Ok(DependencyGraph {
            root_project,
            depth,
            nodes: view.nodes,
            edges: view.edges,
        })
    }
}

struct ViewBuilder<'g> {
    source: &'g ProjectGraph,
    seen_nodes: HashSet<NodeIndex>,
    seen_edges: HashSet<(NodeIndex, NodeIndex, DependencyEdgeKind)>,
    nodes: Vec<DependencyNode>,
    edges: Vec<DependencyEdge>,
}

impl<'g> ViewBuilder<'g> {
    fn new(source: &'g ProjectGraph) -> Self {
        Self {
            source,
            seen_nodes: HashSet::new(),
            seen_edges: HashSet::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn push_node(&mut self, idx: NodeIndex) {
        if self.seen_nodes.insert(idx) {
            self.nodes.push(self.source.graph[idx].clone());
        }
    }

    fn push_edge(&mut self, from: NodeIndex, to: NodeIndex, kind: DependencyEdgeKind) {
        if self.seen_edges.insert((from, to, kind)) {
            self.edges.push(DependencyEdge {
                from: self.source.graph[from].id.clone(),
                to: self.source.graph[to].id.clone(),
                kind,
            });
        }
    }
}

pub fn package_node_id(name: &str) -> String {
    format!("pkg:{name}")
}
