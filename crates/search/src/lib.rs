//! # Codeintel Search
//!
//! The analysis context (one loaded solution at a time) and the read-only query
//! service built on top of it.
//!
//! Static queries (symbol search, members, namespaces, hierarchy via the index) work on
//! the analyzed model alone. Call-graph and reference queries need a live
//! [`SemanticEngine`](codeintel_indexer::SemanticEngine) and report `Unavailable`
//! without one.

mod calls;
mod context;
mod error;
mod hierarchy;
mod service;
mod solution;
mod symbols;

pub use calls::{MAX_CALLEES, MAX_CALLERS, MAX_USAGES};
pub use context::{AnalysisContext, ContextConfig, SolutionState};
pub use error::{QueryError, Result};
pub use service::SemanticQueryService;
pub use solution::{DEFAULT_GRAPH_DEPTH, DEFAULT_RECENT_FILES, MAX_RECENT_FILES};
pub use symbols::{DEFAULT_TOP_K, MAX_TOP_K};
