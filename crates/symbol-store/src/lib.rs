//! # Codeintel Symbol Store
//!
//! In-memory dual index over extracted symbols:
//!
//! - **by key**: stable id (or display signature when no id exists) → entry
//! - **by name**: lower-cased simple name → keys sharing that name
//!
//! Both maps are sharded [`dashmap::DashMap`]s, so per-document analysis tasks insert
//! concurrently while queries read.

mod entry;
mod index;

pub use entry::{IndexedDetail, IndexedSymbol};
pub use index::SymbolIndex;
