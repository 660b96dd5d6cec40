use codeintel_protocol::{MemberInfo, SymbolInfo, SymbolKind, TypeInfo};
use serde::Serialize;

/// Kind-specific facts kept next to the symbol so index-only queries (hierarchy
/// fallback, member lookup) do not need the full model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "detail", rename_all = "snake_case")]
pub enum IndexedDetail {
    Type {
        base_types: Vec<String>,
        implemented_interfaces: Vec<String>,
        member_keys: Vec<String>,
    },
    Member {
        containing_type_id: Option<String>,
        return_type: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedSymbol {
    pub key: String,
    pub symbol: SymbolInfo,
    pub detail: IndexedDetail,
    /// Owning project identity (its manifest path).
    pub project_file_path: String,
    pub namespace: String,
}

impl IndexedSymbol {
    pub fn for_type(project_file_path: &str, namespace: &str, ty: &TypeInfo) -> Self {
        Self {
            key: ty.symbol.key().to_string(),
            symbol: ty.symbol.clone(),
            detail: IndexedDetail::Type {
                base_types: ty.base_types.clone(),
                implemented_interfaces: ty.implemented_interfaces.clone(),
                member_keys: ty
                    .members
                    .iter()
                    .map(|m| m.symbol.key().to_string())
                    .collect(),
            },
            project_file_path: project_file_path.to_string(),
            namespace: namespace.to_string(),
        }
    }

    pub fn for_member(
        project_file_path: &str,
        namespace: &str,
        owner: &TypeInfo,
        member: &MemberInfo,
    ) -> Self {
        Self {
            key: member.symbol.key().to_string(),
            symbol: member.symbol.clone(),
            detail: IndexedDetail::Member {
                containing_type_id: member
                    .containing_type_id
                    .clone()
                    .or_else(|| Some(owner.symbol.key().to_string())),
                return_type: member.return_type.clone(),
            },
            project_file_path: project_file_path.to_string(),
            namespace: namespace.to_string(),
        }
    }

    pub fn kind(&self) -> SymbolKind {
        self.symbol.kind
    }

    pub fn is_type(&self) -> bool {
        matches!(self.detail, IndexedDetail::Type { .. })
    }

    /// Base type and interface names as written in source (types only).
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        let lists: (&[String], &[String]) = match &self.detail {
            IndexedDetail::Type {
                base_types,
                implemented_interfaces,
                ..
            } => (base_types, implemented_interfaces),
            IndexedDetail::Member { .. } => (&[], &[]),
        };
        lists.0.iter().chain(lists.1.iter()).map(String::as_str)
    }

    pub(crate) fn name_bucket(&self) -> String {
        self.symbol.name.to_lowercase()
    }
}
