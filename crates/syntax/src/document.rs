use codeintel_protocol::{Accessibility, Location, NamespaceStyle, ParameterInfo, SymbolKind};

/// 1-based line/column range of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Span {
    pub fn to_location(self, file_path: &str) -> Location {
        Location::new(file_path, self.start_line, self.start_column)
            .with_end(self.end_line, self.end_column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredMember {
    pub id: String,
    pub name: String,
    pub signature: String,
    pub kind: SymbolKind,
    pub accessibility: Accessibility,
    pub modifiers: Vec<String>,
    pub attributes: Vec<String>,
    /// Raw `///` text with the markers stripped.
    pub doc: Option<String>,
    pub summary: Option<String>,
    pub return_type: Option<String>,
    pub parameters: Vec<ParameterInfo>,
    pub span: Span,
    /// Body is a single call passing only plain identifiers through.
    pub is_forwarding: bool,
    pub has_body: bool,
}

impl DeclaredMember {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredType {
    pub id: String,
    /// Simple name; nested types read `Outer.Inner`.
    pub name: String,
    pub signature: String,
    pub kind: SymbolKind,
    pub accessibility: Accessibility,
    pub modifiers: Vec<String>,
    pub attributes: Vec<String>,
    pub doc: Option<String>,
    pub summary: Option<String>,
    pub base_types: Vec<String>,
    pub implemented_interfaces: Vec<String>,
    pub span: Span,
    pub members: Vec<DeclaredMember>,
}

impl DeclaredType {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredNamespace {
    pub name: String,
    pub types: Vec<DeclaredType>,
}

/// Everything the front end knows about one document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentModel {
    pub namespaces: Vec<DeclaredNamespace>,
    /// Every namespace literal written in the file, in source order.
    pub namespace_literals: Vec<String>,
    pub file_scoped_namespaces: usize,
    pub block_namespaces: usize,
    /// `<auto-generated>` marker found in the file header.
    pub auto_generated: bool,
    pub line_count: usize,
}

impl DocumentModel {
    pub fn namespace_style(&self) -> Option<NamespaceStyle> {
        NamespaceStyle::from_counts(self.file_scoped_namespaces, self.block_namespaces)
    }

    pub fn type_count(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.types.len()).sum()
    }

    pub fn types(&self) -> impl Iterator<Item = (&DeclaredNamespace, &DeclaredType)> {
        self.namespaces
            .iter()
            .flat_map(|ns| ns.types.iter().map(move |t| (ns, t)))
    }

    pub(crate) fn push_type(&mut self, namespace: &str, declared: DeclaredType) {
        if let Some(existing) = self.namespaces.iter_mut().find(|ns| ns.name == namespace) {
            existing.types.push(declared);
        } else {
            self.namespaces.push(DeclaredNamespace {
                name: namespace.to_string(),
                types: vec![declared],
            });
        }
    }
}
