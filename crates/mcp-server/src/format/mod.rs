//! Text renderers for tool payloads that agents read as prose.

mod summary;
mod tree;

pub use summary::render_solution_summary;
pub use tree::{render_file_tree, TreeOptions, DEFAULT_MAX_DEPTH, DEFAULT_MAX_ENTRIES_PER_FOLDER};
