//! # Codeintel Graph
//!
//! Project dependency graph over an analyzed solution.
//!
//! ```text
//! SolutionInfo
//!     │
//!     ├──> ProjectGraph::from_solution (petgraph)
//!     │      ├─ Nodes: projects (id = manifest path), packages (id = pkg:<name>)
//!     │      └─ Edges: ProjectReference, PackageReference
//!     │
//!     └──> dependency_graph(root?, depth)
//!            └─ BFS over project references, packages at hop 0 only
//! ```

mod builder;
mod error;
mod graph;

pub use error::{GraphError, Result};
pub use graph::{clamp_depth, package_node_id, ProjectGraph, MAX_DEPTH, MIN_DEPTH};
