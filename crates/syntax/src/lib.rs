//! # Codeintel Syntax
//!
//! Static C# front end: parses one document with tree-sitter and yields its declarations
//! (namespaces, types, members) with stable documentation-comment ids and display
//! signatures.
//!
//! ```text
//! source text
//!     │
//!     ├──> tree-sitter-c-sharp ──> concrete syntax tree
//!     │
//!     └──> DeclarationCollector
//!            ├─ namespaces (block / file-scoped, nested)
//!            ├─ types (nested types flattened as Outer.Inner)
//!            └─ members (methods, ctors, properties, fields, events, enum members)
//! ```

mod csharp;
mod doc_comment;
mod document;
mod error;

pub use csharp::CSharpParser;
pub use doc_comment::{doc_comment_text, summary_from_doc};
pub use document::{
    DeclaredMember, DeclaredNamespace, DeclaredType, DocumentModel, Span,
};
pub use error::{Result, SyntaxError};
