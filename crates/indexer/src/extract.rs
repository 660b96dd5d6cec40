use codeintel_protocol::{
    Accessibility, MemberInfo, NamespaceInfo, SymbolInfo, SymbolKind, TypeInfo,
};
use codeintel_syntax::{DeclaredMember, DeclaredType, DocumentModel};

/// Member eligibility switches taken from [`crate::AnalyzerConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub include_private: bool,
    pub include_forwarding: bool,
}

/// Where a document lives: absolute path for locations, project-relative for display.
#[derive(Debug, Clone, Copy)]
pub struct DocumentPaths<'a> {
    pub file_path: &'a str,
    pub relative_path: &'a str,
}

/// Normalize one parsed document into namespace entries.
pub fn extract_namespaces(
    model: &DocumentModel,
    paths: DocumentPaths<'_>,
    options: ExtractOptions,
) -> Vec<NamespaceInfo> {
    model
        .namespaces
        .iter()
        .map(|ns| NamespaceInfo {
            name: ns.name.clone(),
            types: ns
                .types
                .iter()
                .map(|declared| convert_type(declared, paths, options))
                .collect(),
            file_path: paths.file_path.to_string(),
        })
        .collect()
}

fn convert_type(declared: &DeclaredType, paths: DocumentPaths<'_>, options: ExtractOptions) -> TypeInfo {
    let is_interface = declared.kind == SymbolKind::Interface;
    let members = declared
        .members
        .iter()
        .filter(|m| is_eligible(m, options))
        .map(|m| convert_member(m, &declared.id, is_interface, paths.file_path))
        .collect();

    TypeInfo {
        symbol: SymbolInfo {
            unique_id: Some(declared.id.clone()),
            name: declared.name.clone(),
            signature: declared.signature.clone(),
            kind: declared.kind,
            accessibility: declared.accessibility,
            attributes: declared.attributes.clone(),
            summary: declared.summary.clone(),
            locations: vec![declared.span.to_location(paths.file_path)],
        },
        members,
        base_types: declared.base_types.clone(),
        implemented_interfaces: declared.implemented_interfaces.clone(),
        is_partial: declared.has_modifier("partial"),
        is_abstract: declared.has_modifier("abstract"),
        is_sealed: declared.has_modifier("sealed"),
        is_static: declared.has_modifier("static"),
        file_path: paths.file_path.to_string(),
        relative_path: paths.relative_path.to_string(),
        line_number: declared.span.start_line,
    }
}

fn is_eligible(member: &DeclaredMember, options: ExtractOptions) -> bool {
    if !options.include_private && member.accessibility == Accessibility::Private {
        return false;
    }
    if !options.include_forwarding && member.kind == SymbolKind::Method && member.is_forwarding {
        return false;
    }
    true
}

fn convert_member(
    member: &DeclaredMember,
    type_id: &str,
    in_interface: bool,
    file_path: &str,
) -> MemberInfo {
    MemberInfo {
        symbol: SymbolInfo {
            unique_id: Some(member.id.clone()),
            name: member.name.clone(),
            signature: member.signature.clone(),
            kind: member.kind,
            accessibility: member.accessibility,
            attributes: member.attributes.clone(),
            summary: member.summary.clone(),
            locations: vec![member.span.to_location(file_path)],
        },
        is_static: member.has_modifier("static") || member.has_modifier("const"),
        is_async: member.has_modifier("async"),
        is_virtual: member.has_modifier("virtual"),
        is_override: member.has_modifier("override"),
        is_abstract: member.has_modifier("abstract")
            || (in_interface && !member.has_body && !member.has_modifier("static")),
        return_type: member.return_type.clone(),
        parameters: member.parameters.clone(),
        comment: member.doc.clone(),
        containing_type_id: Some(type_id.to_string()),
    }
}
