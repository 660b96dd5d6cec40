//! # Codeintel Protocol
//!
//! Serializable symbol model (solution → project → namespace → type → member), the
//! result payloads of every query, and the argument contracts of the agent tool surface.

mod envelope;
pub mod model;
pub mod paths;
pub mod requests;
pub mod results;

pub use envelope::ErrorEnvelope;
pub use model::{
    Accessibility, ConventionInfo, FileEntryInfo, FileKind, Location, MemberInfo,
    NamespaceInfo, NamespaceStyle, PackageReference, ParameterInfo, ProjectInfo,
    ProjectStatistics, SolutionInfo, SymbolInfo, SymbolKind, TypeInfo, GLOBAL_NAMESPACE,
};
pub use paths::{relative_path, resolve_under, RelativizePaths};
