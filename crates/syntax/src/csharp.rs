use crate::doc_comment::{doc_comment_text, summary_from_doc};
use crate::document::{DeclaredMember, DeclaredType, DocumentModel, Span};
use crate::error::{Result, SyntaxError};
use codeintel_protocol::{Accessibility, ParameterInfo, SymbolKind, GLOBAL_NAMESPACE};
use tree_sitter::{Node, Parser};

const MODIFIER_KEYWORDS: &[&str] = &[
    "public", "private", "protected", "internal", "file", "static", "abstract", "sealed",
    "virtual", "override", "async", "readonly", "const", "extern", "new", "partial", "unsafe",
    "volatile", "required",
];

const PARAMETER_MODIFIERS: &[&str] = &["ref", "out", "in", "params", "this", "scoped", "readonly"];

/// Lines inspected for an `<auto-generated>` header.
const GENERATED_HEADER_LINES: usize = 20;

/// Parses C# documents into [`DocumentModel`]s.
///
/// A parser is not shareable across threads; create one per worker.
pub struct CSharpParser {
    parser: Parser,
}

impl CSharpParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language: tree_sitter::Language = tree_sitter_c_sharp::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(|e| SyntaxError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse one document. `label` only names the document in errors.
    pub fn parse(&mut self, label: &str, source: &str) -> Result<DocumentModel> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| SyntaxError::Parse(label.to_string()))?;
        let root = tree.root_node();
        if root.has_error() {
            log::debug!("{label}: syntax errors present, extracting what parsed");
        }

        let mut collector = Collector {
            src: source,
            model: DocumentModel {
                auto_generated: has_generated_header(source),
                line_count: source.lines().count(),
                ..DocumentModel::default()
            },
        };
        collector.visit_scope(root, GLOBAL_NAMESPACE);
        Ok(collector.model)
    }
}

fn has_generated_header(source: &str) -> bool {
    source.lines().take(GENERATED_HEADER_LINES).any(|line| {
        let lower = line.to_ascii_lowercase();
        lower.contains("<auto-generated") || lower.contains("<autogenerated")
    })
}

/// Naming context of the type whose body is being walked.
struct Container {
    kind: SymbolKind,
    /// `Ns.Outer`1` (id form).
    id_path: String,
    /// `Ns.Outer<T>` (display form).
    display_path: String,
    /// `Outer` or `Outer.Inner`.
    name_path: String,
}

struct MemberHead {
    kind: SymbolKind,
    id: String,
    name: String,
    signature: String,
    return_type: Option<String>,
    parameters: Vec<ParameterInfo>,
}

struct Collector<'s> {
    src: &'s str,
    model: DocumentModel,
}

impl<'s> Collector<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.src.as_bytes()).unwrap_or_default()
    }

    fn slice(&self, start: usize, end: usize) -> &'s str {
        self.src.get(start..end).unwrap_or_default()
    }

    fn visit_scope(&mut self, scope: Node<'_>, namespace: &str) {
        let mut current = namespace.to_string();
        for child in named_children(scope) {
            match child.kind() {
                "namespace_declaration" => {
                    let name = self.namespace_name(child, namespace);
                    self.model.block_namespaces += 1;
                    self.model.namespace_literals.push(name.clone());
                    if let Some(body) = child
                        .child_by_field_name("body")
                        .or_else(|| first_of_kind(child, "declaration_list"))
                    {
                        self.visit_scope(body, &name);
                    }
                }
                "file_scoped_namespace_declaration" => {
                    let name = self.namespace_name(child, namespace);
                    self.model.file_scoped_namespaces += 1;
                    self.model.namespace_literals.push(name.clone());
                    // Grammar versions differ on whether the following declarations are
                    // children of this node or its siblings; handle both.
                    self.visit_scope(child, &name);
                    current = name;
                }
                kind if is_type_declaration(kind) => self.collect_type(child, &current, None),
                _ => {}
            }
        }
    }

    fn namespace_name(&self, node: Node<'_>, outer: &str) -> String {
        let raw = node
            .child_by_field_name("name")
            .map(|n| compact(self.text(n)))
            .unwrap_or_default();
        if outer == GLOBAL_NAMESPACE || outer.is_empty() {
            raw
        } else {
            format!("{outer}.{raw}")
        }
    }

    fn collect_type(&mut self, node: Node<'_>, namespace: &str, outer: Option<&Container>) {
        let Some(kind) = type_kind(node.kind()) else {
            return;
        };
        let Some(name_node) = node
            .child_by_field_name("name")
            .or_else(|| first_of_kind(node, "identifier"))
        else {
            return;
        };
        let ident = self.text(name_node).to_string();
        let type_params = self.type_parameters(node);

        let (id_prefix, display_prefix, name) = match outer {
            Some(parent) => (
                format!("{}.", parent.id_path),
                format!("{}.", parent.display_path),
                format!("{}.{ident}", parent.name_path),
            ),
            None if namespace == GLOBAL_NAMESPACE => (String::new(), String::new(), ident.clone()),
            None => (format!("{namespace}."), format!("{namespace}."), ident.clone()),
        };
        let id_path = format!("{id_prefix}{ident}{}", arity_suffix(type_params.len()));
        let display_path = format!("{display_prefix}{ident}{}", generic_list(&type_params));

        let modifiers = self.modifiers(node);
        let accessibility = Accessibility::from_modifiers(modifiers.iter().map(String::as_str))
            .unwrap_or(match outer.map(|o| o.kind) {
                None => Accessibility::Internal,
                Some(SymbolKind::Interface) => Accessibility::Public,
                Some(_) => Accessibility::Private,
            });
        let doc = self.doc_comment(node);
        let summary = doc.as_deref().and_then(summary_from_doc);
        let (base_types, implemented_interfaces) = self.split_base_list(node, kind);

        let container = Container {
            kind,
            id_path: id_path.clone(),
            display_path: display_path.clone(),
            name_path: name.clone(),
        };

        let mut members = Vec::new();
        let mut nested = Vec::new();
        if matches!(kind, SymbolKind::Record) {
            if let Some(params) = first_of_kind(node, "parameter_list") {
                members.extend(self.positional_properties(params, &container));
            }
        }
        let body = node
            .child_by_field_name("body")
            .or_else(|| first_of_kind(node, "declaration_list"))
            .or_else(|| first_of_kind(node, "enum_member_declaration_list"));
        if let Some(body) = body {
            for child in named_children(body) {
                if is_type_declaration(child.kind()) {
                    nested.push(child);
                } else {
                    members.extend(self.collect_members(child, &container));
                }
            }
        }

        let declared = DeclaredType {
            id: format!("T:{id_path}"),
            name,
            signature: display_path,
            kind,
            accessibility,
            modifiers,
            attributes: self.attributes(node),
            doc,
            summary,
            base_types,
            implemented_interfaces,
            span: span_of(node),
            members,
        };
        self.model.push_type(namespace, declared);

        for child in nested {
            self.collect_type(child, namespace, Some(&container));
        }
    }

    fn collect_members(&self, node: Node<'_>, container: &Container) -> Vec<DeclaredMember> {
        match node.kind() {
            "method_declaration" => self.method(node, container).into_iter().collect(),
            "constructor_declaration" => self.constructor(node, container).into_iter().collect(),
            "property_declaration" => self
                .named_member(node, container, SymbolKind::Property)
                .into_iter()
                .collect(),
            "event_declaration" => self
                .named_member(node, container, SymbolKind::Event)
                .into_iter()
                .collect(),
            "field_declaration" => self.variables(node, container, SymbolKind::Field),
            "event_field_declaration" => self.variables(node, container, SymbolKind::Event),
            "enum_member_declaration" => self.enum_member(node, container).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    fn member_accessibility(&self, modifiers: &[String], container: &Container) -> Accessibility {
        Accessibility::from_modifiers(modifiers.iter().map(String::as_str)).unwrap_or(
            match container.kind {
                SymbolKind::Interface | SymbolKind::Enum => Accessibility::Public,
                _ => Accessibility::Private,
            },
        )
    }

    fn member(&self, node: Node<'_>, container: &Container, head: MemberHead) -> DeclaredMember {
        let MemberHead {
            kind,
            id,
            name,
            signature,
            return_type,
            parameters,
        } = head;
        let modifiers = self.modifiers(node);
        let doc = self.doc_comment(node);
        let body = body_of(node);
        DeclaredMember {
            id,
            name,
            signature,
            kind,
            accessibility: self.member_accessibility(&modifiers, container),
            attributes: self.attributes(node),
            summary: doc.as_deref().and_then(summary_from_doc),
            doc,
            return_type,
            parameters,
            span: span_of(node),
            is_forwarding: kind == SymbolKind::Method
                && body.is_some_and(|b| self.is_forwarding_body(b)),
            has_body: body.is_some(),
            modifiers,
        }
    }

    fn method(&self, node: Node<'_>, container: &Container) -> Option<DeclaredMember> {
        let params_node = node
            .child_by_field_name("parameters")
            .or_else(|| first_of_kind(node, "parameter_list"));
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| last_identifier_before(node, params_node))?;
        let ident = self.text(name_node).to_string();
        let type_params = self.type_parameters(node);
        let parameters = params_node.map(|p| self.parameters(p)).unwrap_or_default();
        let return_type = node
            .child_by_field_name("returns")
            .or_else(|| node.child_by_field_name("type"))
            .map(|n| compact(self.text(n)))
            .or_else(|| self.text_before(node, name_node));

        let id = format!(
            "M:{}.{ident}{}{}",
            container.id_path,
            method_arity_suffix(type_params.len()),
            id_parameter_list(&parameters)
        );
        let signature = format!(
            "{}.{ident}{}({})",
            container.display_path,
            generic_list(&type_params),
            display_parameter_list(&parameters)
        );
        Some(self.member(
            node,
            container,
            MemberHead {
                kind: SymbolKind::Method,
                id,
                name: ident,
                signature,
                return_type,
                parameters,
            },
        ))
    }

    fn constructor(&self, node: Node<'_>, container: &Container) -> Option<DeclaredMember> {
        let params_node = node
            .child_by_field_name("parameters")
            .or_else(|| first_of_kind(node, "parameter_list"));
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| first_of_kind(node, "identifier"))?;
        let ident = self.text(name_node).to_string();
        let parameters = params_node.map(|p| self.parameters(p)).unwrap_or_default();
        let is_static = self.modifiers(node).iter().any(|m| m == "static");
        let marker = if is_static { "#cctor" } else { "#ctor" };

        let id = format!(
            "M:{}.{marker}{}",
            container.id_path,
            id_parameter_list(&parameters)
        );
        let signature = format!(
            "{}.{ident}({})",
            container.display_path,
            display_parameter_list(&parameters)
        );
        Some(self.member(
            node,
            container,
            MemberHead {
                kind: SymbolKind::Constructor,
                id,
                name: ident,
                signature,
                return_type: None,
                parameters,
            },
        ))
    }

    /// Properties and event declarations with accessor bodies: `type` + `name` fields.
    fn named_member(
        &self,
        node: Node<'_>,
        container: &Container,
        kind: SymbolKind,
    ) -> Option<DeclaredMember> {
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| last_identifier_before(node, None))?;
        let ident = self.text(name_node).to_string();
        let type_name = node
            .child_by_field_name("type")
            .map(|n| compact(self.text(n)))
            .or_else(|| self.text_before(node, name_node));
        Some(self.member(
            node,
            container,
            MemberHead {
                kind,
                id: format!("{}{}.{ident}", kind.id_prefix(), container.id_path),
                signature: format!("{}.{ident}", container.display_path),
                name: ident,
                return_type: type_name,
                parameters: Vec::new(),
            },
        ))
    }

    /// Field and event-field declarations; one member per declarator.
    fn variables(
        &self,
        node: Node<'_>,
        container: &Container,
        kind: SymbolKind,
    ) -> Vec<DeclaredMember> {
        let Some(declaration) = first_of_kind(node, "variable_declaration") else {
            return Vec::new();
        };
        let type_name = declaration
            .child_by_field_name("type")
            .map(|n| compact(self.text(n)));
        named_children(declaration)
            .into_iter()
            .filter(|n| n.kind() == "variable_declarator")
            .filter_map(|declarator| {
                let name_node = declarator
                    .child_by_field_name("name")
                    .or_else(|| first_of_kind(declarator, "identifier"))?;
                let ident = self.text(name_node).to_string();
                let mut member = self.member(
                    node,
                    container,
                    MemberHead {
                        kind,
                        id: format!("{}{}.{ident}", kind.id_prefix(), container.id_path),
                        signature: format!("{}.{ident}", container.display_path),
                        name: ident,
                        return_type: type_name.clone(),
                        parameters: Vec::new(),
                    },
                );
                member.span = span_of(declarator);
                Some(member)
            })
            .collect()
    }

    fn enum_member(&self, node: Node<'_>, container: &Container) -> Option<DeclaredMember> {
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| first_of_kind(node, "identifier"))?;
        let ident = self.text(name_node).to_string();
        Some(self.member(
            node,
            container,
            MemberHead {
                kind: SymbolKind::EnumMember,
                id: format!("F:{}.{ident}", container.id_path),
                signature: format!("{}.{ident}", container.display_path),
                name: ident,
                return_type: None,
                parameters: Vec::new(),
            },
        ))
    }

    /// `record Person(string Name, int Age)` declares public init-only properties.
    fn positional_properties(&self, params: Node<'_>, container: &Container) -> Vec<DeclaredMember> {
        named_children(params)
            .into_iter()
            .filter(|n| n.kind() == "parameter")
            .filter_map(|node| {
                let param = self.parameter(node)?;
                Some(DeclaredMember {
                    id: format!("P:{}.{}", container.id_path, param.name),
                    signature: format!("{}.{}", container.display_path, param.name),
                    kind: SymbolKind::Property,
                    accessibility: Accessibility::Public,
                    modifiers: Vec::new(),
                    attributes: Vec::new(),
                    doc: None,
                    summary: None,
                    return_type: Some(param.type_name),
                    parameters: Vec::new(),
                    span: span_of(node),
                    is_forwarding: false,
                    has_body: false,
                    name: param.name,
                })
            })
            .collect()
    }

    fn parameters(&self, list: Node<'_>) -> Vec<ParameterInfo> {
        named_children(list)
            .into_iter()
            .filter(|n| n.kind() == "parameter")
            .filter_map(|n| self.parameter(n))
            .collect()
    }

    fn parameter(&self, node: Node<'_>) -> Option<ParameterInfo> {
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| last_identifier_before(node, None))?;

        let mut modifiers = Vec::new();
        let mut prefix_end = node.start_byte();
        for child in children(node) {
            if child.start_byte() >= name_node.start_byte() {
                break;
            }
            let text = self.text(child);
            let is_modifier = child.kind() == "parameter_modifier"
                || child.kind() == "modifier"
                || (!child.is_named() && PARAMETER_MODIFIERS.contains(&text));
            if is_modifier {
                modifiers.push(text.to_string());
                prefix_end = child.end_byte();
            } else if child.kind() == "attribute_list" {
                prefix_end = child.end_byte();
            }
        }

        let type_name = node
            .child_by_field_name("type")
            .map(|n| compact(self.text(n)))
            .unwrap_or_else(|| compact(self.slice(prefix_end, name_node.start_byte())));

        let tail = self.slice(name_node.end_byte(), node.end_byte()).trim();
        let default_value = tail
            .strip_prefix('=')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Some(ParameterInfo {
            name: self.text(name_node).to_string(),
            type_name,
            default_value,
            modifiers,
        })
    }

    fn type_parameters(&self, node: Node<'_>) -> Vec<String> {
        let Some(list) = node
            .child_by_field_name("type_parameters")
            .or_else(|| first_of_kind(node, "type_parameter_list"))
        else {
            return Vec::new();
        };
        named_children(list)
            .into_iter()
            .filter(|n| n.kind() == "type_parameter")
            .map(|n| {
                n.child_by_field_name("name")
                    .or_else(|| first_of_kind(n, "identifier"))
                    .map_or_else(|| compact(self.text(n)), |id| self.text(id).to_string())
            })
            .collect()
    }

    fn modifiers(&self, node: Node<'_>) -> Vec<String> {
        let mut out = Vec::new();
        for child in children(node) {
            let text = self.text(child).trim();
            let keyword = child.kind() == "modifier"
                || (!child.is_named() && MODIFIER_KEYWORDS.contains(&text));
            if keyword && !out.iter().any(|m: &String| m == text) {
                out.push(text.to_string());
            }
        }
        out
    }

    fn attributes(&self, node: Node<'_>) -> Vec<String> {
        let mut out = Vec::new();
        for list in children(node).into_iter().filter(|n| n.kind() == "attribute_list") {
            for attribute in named_children(list).into_iter().filter(|n| n.kind() == "attribute") {
                let name = attribute
                    .child_by_field_name("name")
                    .map_or_else(|| self.text(attribute), |n| self.text(n));
                let name = name.split('(').next().unwrap_or(name).trim();
                if !name.is_empty() {
                    out.push(name.to_string());
                }
            }
        }
        out
    }

    /// Contiguous `///` comments directly above the declaration.
    fn doc_comment(&self, node: Node<'_>) -> Option<String> {
        let mut lines: Vec<&str> = Vec::new();
        let mut cursor = node.prev_sibling();
        while let Some(sibling) = cursor {
            if sibling.kind() != "comment" {
                break;
            }
            let text = self.text(sibling);
            if !text.trim_start().starts_with("///") {
                break;
            }
            lines.push(text);
            cursor = sibling.prev_sibling();
        }
        lines.reverse();
        for child in children(node) {
            if child.kind() != "comment" {
                break;
            }
            let text = self.text(child);
            if text.trim_start().starts_with("///") {
                lines.push(text);
            }
        }
        doc_comment_text(lines)
    }

    fn split_base_list(&self, node: Node<'_>, kind: SymbolKind) -> (Vec<String>, Vec<String>) {
        let Some(list) = first_of_kind(node, "base_list") else {
            return (Vec::new(), Vec::new());
        };
        let entries: Vec<String> = named_children(list)
            .into_iter()
            .filter_map(|entry| match entry.kind() {
                "argument_list" | "comment" => None,
                "primary_constructor_base_type" => entry
                    .child_by_field_name("type")
                    .or_else(|| entry.named_child(0))
                    .map(|t| self.text(t)),
                _ => Some(self.text(entry)),
            })
            .map(normalize_type_name)
            .filter(|entry| !entry.is_empty())
            .collect();

        match kind {
            SymbolKind::Enum | SymbolKind::Delegate => (Vec::new(), Vec::new()),
            SymbolKind::Class | SymbolKind::Record => {
                let mut iter = entries.into_iter();
                match iter.next() {
                    Some(first) if !looks_like_interface(&first) => (vec![first], iter.collect()),
                    Some(first) => (Vec::new(), std::iter::once(first).chain(iter).collect()),
                    None => (Vec::new(), Vec::new()),
                }
            }
            _ => (Vec::new(), entries),
        }
    }

    /// Fallback return/property type: source between the modifiers and the name.
    fn text_before(&self, node: Node<'_>, name_node: Node<'_>) -> Option<String> {
        let mut start = node.start_byte();
        for child in children(node) {
            if child.start_byte() >= name_node.start_byte() {
                break;
            }
            let text = self.text(child);
            if child.kind() == "modifier"
                || child.kind() == "attribute_list"
                || child.kind() == "comment"
                || (!child.is_named() && MODIFIER_KEYWORDS.contains(&text))
            {
                start = child.end_byte();
            }
        }
        let text = compact(self.slice(start, name_node.start_byte()));
        (!text.is_empty()).then_some(text)
    }

    /// One statement (or expression body) that only invokes another member with plain
    /// identifiers as arguments.
    fn is_forwarding_body(&self, body: Node<'_>) -> bool {
        let expression = match body.kind() {
            "block" => {
                let statements: Vec<Node<'_>> = named_children(body)
                    .into_iter()
                    .filter(|n| n.kind() != "comment")
                    .collect();
                match statements.as_slice() {
                    [statement]
                        if matches!(statement.kind(), "return_statement" | "expression_statement") =>
                    {
                        statement.named_child(0)
                    }
                    _ => None,
                }
            }
            "arrow_expression_clause" => body.named_child(0),
            _ => None,
        };
        let Some(mut expression) = expression else {
            return false;
        };
        if expression.kind() == "await_expression" {
            match expression.named_child(0) {
                Some(inner) => expression = inner,
                None => return false,
            }
        }
        if expression.kind() != "invocation_expression" {
            return false;
        }
        let Some(arguments) = expression
            .child_by_field_name("arguments")
            .or_else(|| first_of_kind(expression, "argument_list"))
        else {
            return false;
        };
        named_children(arguments)
            .into_iter()
            .filter(|n| n.kind() == "argument")
            .all(|argument| {
                named_children(argument)
                    .last()
                    .is_some_and(|value| {
                        value.kind() == "identifier" && !self.text(*value).is_empty()
                    })
            })
    }
}

fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn first_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    named_children(node).into_iter().find(|n| n.kind() == kind)
}

/// Last identifier child that starts before `limit` (or anywhere when `limit` is `None`).
fn last_identifier_before<'t>(node: Node<'t>, limit: Option<Node<'t>>) -> Option<Node<'t>> {
    let end = limit.map_or(usize::MAX, |l| l.start_byte());
    named_children(node)
        .into_iter()
        .filter(|n| n.kind() == "identifier" && n.start_byte() < end)
        .last()
}

fn body_of<'t>(node: Node<'t>) -> Option<Node<'t>> {
    node.child_by_field_name("body")
        .or_else(|| first_of_kind(node, "block"))
        .or_else(|| first_of_kind(node, "arrow_expression_clause"))
        .filter(|b| matches!(b.kind(), "block" | "arrow_expression_clause"))
}

fn span_of(node: Node<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span {
        start_line: to_u32(start.row) + 1,
        start_column: to_u32(start.column) + 1,
        end_line: to_u32(end.row) + 1,
        end_column: to_u32(end.column) + 1,
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX - 1)
}

fn is_type_declaration(kind: &str) -> bool {
    type_kind(kind).is_some()
}

fn type_kind(node_kind: &str) -> Option<SymbolKind> {
    match node_kind {
        "class_declaration" => Some(SymbolKind::Class),
        "interface_declaration" => Some(SymbolKind::Interface),
        "struct_declaration" => Some(SymbolKind::Struct),
        "enum_declaration" => Some(SymbolKind::Enum),
        "record_declaration" | "record_struct_declaration" => Some(SymbolKind::Record),
        "delegate_declaration" => Some(SymbolKind::Delegate),
        _ => None,
    }
}

/// `IRepository`, `IDisposable`: the conventional interface prefix.
fn looks_like_interface(name: &str) -> bool {
    let simple = codeintel_protocol::model::simple_type_name(name);
    let mut chars = simple.chars();
    matches!((chars.next(), chars.next()), (Some('I'), Some(c)) if c.is_ascii_uppercase())
}

/// Canonical spacing for type text: `Dictionary< string,int >` → `Dictionary<string, int>`.
fn compact(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut gap = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            gap = true;
            continue;
        }
        let space = match out.chars().last() {
            None => false,
            Some(',') => !matches!(ch, ',' | ']'),
            Some(prev) => gap && is_word_char(prev) && is_word_char(ch),
        };
        if space {
            out.push(' ');
        }
        out.push(ch);
        gap = false;
    }
    out
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '@'
}

fn normalize_type_name(raw: &str) -> String {
    let text = compact(raw);
    text.strip_prefix("global::").map_or(text.clone(), str::to_string)
}

fn arity_suffix(arity: usize) -> String {
    if arity == 0 {
        String::new()
    } else {
        format!("`{arity}")
    }
}

fn method_arity_suffix(arity: usize) -> String {
    if arity == 0 {
        String::new()
    } else {
        format!("``{arity}")
    }
}

fn generic_list(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(", "))
    }
}

/// `(int,List{string},int@)`; empty parameter lists render nothing.
fn id_parameter_list(parameters: &[ParameterInfo]) -> String {
    if parameters.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = parameters
        .iter()
        .map(|p| {
            let ty: String = p
                .type_name
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| match c {
                    '<' => '{',
                    '>' => '}',
                    other => other,
                })
                .collect();
            let by_ref = p
                .modifiers
                .iter()
                .any(|m| matches!(m.as_str(), "ref" | "out" | "in"));
            if by_ref {
                format!("{ty}@")
            } else {
                ty
            }
        })
        .collect();
    format!("({})", parts.join(","))
}

fn display_parameter_list(parameters: &[ParameterInfo]) -> String {
    parameters
        .iter()
        .map(ParameterInfo::display_type)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_normalizes_generic_spacing() {
        assert_eq!(compact("Dictionary< string ,  int >"), "Dictionary<string, int>");
        assert_eq!(compact("Task<User?>"), "Task<User?>");
        assert_eq!(compact("int [ ]"), "int[]");
        assert_eq!(compact("(int a,string b)"), "(int a, string b)");
    }

    #[test]
    fn interface_prefix_heuristic() {
        assert!(looks_like_interface("IUserService"));
        assert!(looks_like_interface("App.Core.IRepository<User>"));
        assert!(!looks_like_interface("Item"));
        assert!(!looks_like_interface("ControllerBase"));
    }

    #[test]
    fn id_parameters_use_documentation_id_shape() {
        let params = vec![
            ParameterInfo {
                name: "items".into(),
                type_name: "List<string>".into(),
                default_value: None,
                modifiers: vec![],
            },
            ParameterInfo {
                name: "count".into(),
                type_name: "int".into(),
                default_value: None,
                modifiers: vec!["out".into()],
            },
        ];
        assert_eq!(id_parameter_list(&params), "(List{string},int@)");
        assert_eq!(display_parameter_list(&params), "List<string>, out int");
        assert_eq!(id_parameter_list(&[]), "");
    }

    #[test]
    fn generated_header_detection() {
        assert!(has_generated_header("// <auto-generated>\n// tool\nclass A {}"));
        assert!(!has_generated_header("class A {}"));
    }
}
