//! Result payloads returned by the query layer and serialized by the tool surface.

use crate::model::{
    Accessibility, ConventionInfo, FileEntryInfo, Location, MemberInfo, PackageReference,
    ParameterInfo, ProjectStatistics, SymbolInfo, SymbolKind, TypeInfo,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub symbol_id: String,
    pub name: String,
    pub kind: SymbolKind,
    pub signature: String,
    pub accessibility: Accessibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub total_matches: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeExtra {
    pub base_types: Vec<String>,
    pub implemented_interfaces: Vec<String>,
    pub is_partial: bool,
    pub is_abstract: bool,
    pub is_sealed: bool,
    pub is_static: bool,
    pub member_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberExtra {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    pub parameters: Vec<ParameterInfo>,
    pub is_static: bool,
    pub is_async: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_type_id: Option<String>,
}

/// Exactly one kind-specific payload per resolved symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "symbol_type", rename_all = "snake_case")]
pub enum SymbolExtra {
    Type(TypeExtra),
    Member(MemberExtra),
}

impl SymbolExtra {
    pub fn for_type(ty: &TypeInfo) -> Self {
        Self::Type(TypeExtra {
            base_types: ty.base_types.clone(),
            implemented_interfaces: ty.implemented_interfaces.clone(),
            is_partial: ty.is_partial,
            is_abstract: ty.is_abstract,
            is_sealed: ty.is_sealed,
            is_static: ty.is_static,
            member_count: ty.members.len(),
        })
    }

    pub fn for_member(member: &MemberInfo, containing_type: Option<&TypeInfo>) -> Self {
        Self::Member(MemberExtra {
            return_type: member.return_type.clone(),
            parameters: member.parameters.clone(),
            is_static: member.is_static,
            is_async: member.is_async,
            is_virtual: member.is_virtual,
            is_override: member.is_override,
            is_abstract: member.is_abstract,
            containing_type: containing_type.map(|t| t.symbol.signature.clone()),
            containing_type_id: member.containing_type_id.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDetail {
    pub symbol: SymbolInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub extra: SymbolExtra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMembers {
    pub type_id: String,
    pub type_name: String,
    pub total_count: usize,
    pub filtered_count: usize,
    pub members: Vec<MemberInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HierarchySource {
    Live,
    Index,
}

/// Lightweight handle to a symbol found by a hierarchy or call-graph query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SymbolKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl SymbolRef {
    pub fn from_symbol(symbol: &SymbolInfo) -> Self {
        Self {
            id: symbol.unique_id.clone(),
            name: symbol.name.clone(),
            kind: Some(symbol.kind),
            signature: Some(symbol.signature.clone()),
            location: symbol.primary_location().cloned(),
        }
    }

    /// Identity used for de-duplication.
    pub fn identity(&self) -> &str {
        self.id
            .as_deref()
            .or(self.signature.as_deref())
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeHierarchy {
    pub type_id: String,
    pub name: String,
    pub kind: SymbolKind,
    pub base_types: Vec<String>,
    pub base_chain: Vec<String>,
    pub implemented_interfaces: Vec<String>,
    pub derived_types: Vec<SymbolRef>,
    pub source: HierarchySource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceImplementations {
    pub interface_id: String,
    pub name: String,
    pub implementations: Vec<SymbolRef>,
    pub source: HierarchySource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallerInfo {
    pub caller: SymbolRef,
    pub call_sites: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callers {
    pub symbol_id: String,
    pub name: String,
    pub callers: Vec<CallerInfo>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalleeKind {
    Invocation,
    Construction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalleeInfo {
    pub callee: SymbolRef,
    pub kind: CalleeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callees {
    pub symbol_id: String,
    pub name: String,
    pub callees: Vec<CalleeInfo>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageKind {
    Read,
    Write,
    Implicit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageInfo {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
    pub snippet: String,
    pub kind: UsageKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usages {
    pub symbol_id: String,
    pub name: String,
    pub total_found: usize,
    pub usages: Vec<UsageInfo>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyNodeKind {
    Project,
    Package,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub id: String,
    pub name: String,
    pub kind: DependencyNodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyEdgeKind {
    ProjectReference,
    PackageReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
    pub kind: DependencyEdgeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_project: Option<String>,
    pub depth: usize,
    pub nodes: Vec<DependencyNode>,
    pub edges: Vec<DependencyEdge>,
}

impl DependencyGraph {
    pub fn node_named(&self, name: &str) -> Option<&DependencyNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub kind: SymbolKind,
    pub namespace: String,
    pub signature: String,
    pub accessibility: Accessibility,
    pub relative_path: String,
    pub line_number: u32,
    pub member_count: usize,
}

impl TypeSummary {
    pub fn new(namespace: &str, ty: &TypeInfo) -> Self {
        Self {
            id: ty.symbol.unique_id.clone(),
            name: ty.symbol.name.clone(),
            kind: ty.symbol.kind,
            namespace: namespace.to_string(),
            signature: ty.symbol.signature.clone(),
            accessibility: ty.symbol.accessibility,
            relative_path: ty.relative_path.clone(),
            line_number: ty.line_number,
            member_count: ty.members.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceTypes {
    pub namespace: String,
    pub include_sub_namespaces: bool,
    pub types: Vec<TypeSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file: FileEntryInfo,
    pub project_name: String,
    pub types: Vec<TypeSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentFiles {
    pub total_files: usize,
    pub files: Vec<FileEntryInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub project_file_path: String,
    pub target_frameworks: Vec<String>,
    pub statistics: ProjectStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    pub project_file_path: String,
    pub root_directories: Vec<String>,
    pub target_frameworks: Vec<String>,
    pub package_references: Vec<PackageReference>,
    pub project_references: Vec<String>,
    pub namespaces: Vec<String>,
    pub statistics: ProjectStatistics,
    pub conventions: ConventionInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionOverview {
    pub name: String,
    pub path: String,
    pub projects: Vec<ProjectSummary>,
    pub statistics: ProjectStatistics,
    pub conventions: ConventionInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConventionsReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub conventions: ConventionInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn symbol_extra_serializes_with_discriminant() {
        let extra = SymbolExtra::Type(TypeExtra {
            base_types: vec!["Base".into()],
            implemented_interfaces: Vec::new(),
            is_partial: false,
            is_abstract: true,
            is_sealed: false,
            is_static: false,
            member_count: 2,
        });
        let value = serde_json::to_value(&extra).unwrap();
        assert_eq!(value["symbol_type"], json!("type"));
        assert_eq!(value["member_count"], json!(2));
        assert!(value.get("return_type").is_none());
    }

    #[test]
    fn symbol_ref_identity_prefers_id() {
        let with_id = SymbolRef {
            id: Some("T:A.B".into()),
            name: "B".into(),
            kind: None,
            signature: Some("A.B".into()),
            location: None,
        };
        assert_eq!(with_id.identity(), "T:A.B");
        let bare = SymbolRef {
            id: None,
            signature: None,
            ..with_id
        };
        assert_eq!(bare.identity(), "B");
    }
}
