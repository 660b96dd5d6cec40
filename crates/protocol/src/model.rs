use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Synthetic namespace name for declarations outside any `namespace` block.
pub const GLOBAL_NAMESPACE: &str = "global";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SymbolKind {
    Namespace,
    Class,
    Interface,
    Struct,
    Enum,
    Record,
    Delegate,
    Method,
    Constructor,
    Property,
    Field,
    Event,
    EnumMember,
}

impl SymbolKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Namespace => "Namespace",
            Self::Class => "Class",
            Self::Interface => "Interface",
            Self::Struct => "Struct",
            Self::Enum => "Enum",
            Self::Record => "Record",
            Self::Delegate => "Delegate",
            Self::Method => "Method",
            Self::Constructor => "Constructor",
            Self::Property => "Property",
            Self::Field => "Field",
            Self::Event => "Event",
            Self::EnumMember => "EnumMember",
        }
    }

    /// Case-insensitive parse of a kind filter coming from a tool argument.
    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim();
        [
            Self::Namespace,
            Self::Class,
            Self::Interface,
            Self::Struct,
            Self::Enum,
            Self::Record,
            Self::Delegate,
            Self::Method,
            Self::Constructor,
            Self::Property,
            Self::Field,
            Self::Event,
            Self::EnumMember,
        ]
        .into_iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
    }

    pub const fn is_type(self) -> bool {
        matches!(
            self,
            Self::Class
                | Self::Interface
                | Self::Struct
                | Self::Enum
                | Self::Record
                | Self::Delegate
        )
    }

    /// Prefix used by the documentation-comment style stable ids.
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Namespace => "N:",
            Self::Class
            | Self::Interface
            | Self::Struct
            | Self::Enum
            | Self::Record
            | Self::Delegate => "T:",
            Self::Method | Self::Constructor => "M:",
            Self::Property => "P:",
            Self::Field | Self::EnumMember => "F:",
            Self::Event => "E:",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Accessibility {
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
    #[default]
    Private,
}

impl Accessibility {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Internal => "Internal",
            Self::Protected => "Protected",
            Self::ProtectedInternal => "ProtectedInternal",
            Self::PrivateProtected => "PrivateProtected",
            Self::Private => "Private",
        }
    }

    /// Accepts both the enum spelling (`ProtectedInternal`) and source spelling
    /// (`protected internal`).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "public" => Some(Self::Public),
            "internal" => Some(Self::Internal),
            "protected" => Some(Self::Protected),
            "protectedinternal" | "internalprotected" => Some(Self::ProtectedInternal),
            "privateprotected" | "protectedprivate" => Some(Self::PrivateProtected),
            "private" => Some(Self::Private),
            _ => None,
        }
    }

    /// Derive accessibility from declaration modifiers; `None` when no access keyword is
    /// present so the caller can apply the context default.
    pub fn from_modifiers<'a>(modifiers: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let set: BTreeSet<&str> = modifiers.into_iter().collect();
        let has = |m: &str| set.contains(m);
        if has("public") {
            Some(Self::Public)
        } else if has("protected") && has("internal") {
            Some(Self::ProtectedInternal)
        } else if has("private") && has("protected") {
            Some(Self::PrivateProtected)
        } else if has("protected") {
            Some(Self::Protected)
        } else if has("internal") || has("file") {
            Some(Self::Internal)
        } else if has("private") {
            Some(Self::Private)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Accessibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source span. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file_path: String,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    pub fn new(file_path: impl Into<String>, start_line: u32, start_column: u32) -> Self {
        Self {
            file_path: file_path.into(),
            start_line,
            start_column,
            end_line: start_line,
            end_column: start_column,
        }
    }

    #[must_use]
    pub fn with_end(mut self, end_line: u32, end_column: u32) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    pub name: String,
    pub signature: String,
    pub kind: SymbolKind,
    pub accessibility: Accessibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub locations: Vec<Location>,
}

impl SymbolInfo {
    /// Index key: the stable id when present, otherwise the display signature.
    pub fn key(&self) -> &str {
        self.unique_id.as_deref().unwrap_or(&self.signature)
    }

    pub fn is_declared_in(&self, file_path: &str) -> bool {
        self.locations.iter().any(|loc| loc.file_path == file_path)
    }

    pub fn primary_location(&self) -> Option<&Location> {
        self.locations.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
}

impl ParameterInfo {
    /// `ref int`, `params string[]`, `int`.
    pub fn display_type(&self) -> String {
        if self.modifiers.is_empty() {
            self.type_name.clone()
        } else {
            format!("{} {}", self.modifiers.join(" "), self.type_name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberInfo {
    #[serde(flatten)]
    pub symbol: SymbolInfo,
    pub is_static: bool,
    pub is_async: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_type_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    #[serde(flatten)]
    pub symbol: SymbolInfo,
    #[serde(default)]
    pub members: Vec<MemberInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implemented_interfaces: Vec<String>,
    pub is_partial: bool,
    pub is_abstract: bool,
    pub is_sealed: bool,
    #[serde(default)]
    pub is_static: bool,
    pub file_path: String,
    pub relative_path: String,
    pub line_number: u32,
}

impl TypeInfo {
    /// Merge another declaration of the same partial type into this one.
    pub fn merge_partial(&mut self, other: TypeInfo) {
        self.is_partial = true;
        self.is_abstract |= other.is_abstract;
        self.is_sealed |= other.is_sealed;
        self.is_static |= other.is_static;
        for loc in other.symbol.locations {
            if !self.symbol.locations.contains(&loc) {
                self.symbol.locations.push(loc);
            }
        }
        for attr in other.symbol.attributes {
            if !self.symbol.attributes.contains(&attr) {
                self.symbol.attributes.push(attr);
            }
        }
        if self.symbol.summary.is_none() {
            self.symbol.summary = other.symbol.summary;
        }
        for base in other.base_types {
            if !self.base_types.contains(&base) {
                self.base_types.push(base);
            }
        }
        for iface in other.implemented_interfaces {
            if !self.implemented_interfaces.contains(&iface) {
                self.implemented_interfaces.push(iface);
            }
        }
        for member in other.members {
            let duplicate = self
                .members
                .iter()
                .any(|existing| existing.symbol.key() == member.symbol.key());
            if !duplicate {
                self.members.push(member);
            }
        }
    }

    /// Namespace-qualified name without generic parameters, e.g. `App.Services.UserService`.
    pub fn full_name(&self) -> &str {
        strip_generic_suffix(&self.symbol.signature)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    pub name: String,
    pub types: Vec<TypeInfo>,
    pub file_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    Source,
    Generated,
    Config,
    Doc,
    Resource,
    Other,
}

impl FileKind {
    pub fn classify(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if is_generated_file_name(&file_name) {
            return Self::Generated;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "cs" | "csx" => Self::Source,
            "csproj" | "sln" | "slnx" | "props" | "targets" | "json" | "config" | "xml"
            | "yml" | "yaml" | "toml" | "editorconfig" | "ruleset" | "runsettings" => {
                Self::Config
            }
            "md" | "markdown" | "txt" | "rst" | "adoc" => Self::Doc,
            "resx" | "png" | "jpg" | "jpeg" | "gif" | "svg" | "ico" | "css" | "html"
            | "cshtml" | "razor" | "ttf" | "woff" | "woff2" => Self::Resource,
            _ if file_name == ".editorconfig" || file_name == ".gitignore" => Self::Config,
            _ => Self::Other,
        }
    }
}

/// Generated / designer / assembly metadata file names (lower-cased input).
pub fn is_generated_file_name(lower_file_name: &str) -> bool {
    lower_file_name.ends_with(".g.cs")
        || lower_file_name.ends_with(".g.i.cs")
        || lower_file_name.ends_with(".designer.cs")
        || lower_file_name.ends_with(".generated.cs")
        || lower_file_name == "assemblyinfo.cs"
        || lower_file_name == "assemblyattributes.cs"
        || lower_file_name.ends_with(".assemblyattributes.cs")
        || lower_file_name.ends_with(".assemblyinfo.cs")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntryInfo {
    pub file_path: String,
    pub relative_path: String,
    pub project_file_path: String,
    pub extension: String,
    pub size_bytes: u64,
    pub line_count: usize,
    pub last_write_unix_ms: u64,
    pub kind: FileKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamespaceStyle {
    FileScoped,
    BlockScoped,
    Mixed,
}

impl NamespaceStyle {
    /// Style implied by counts of file-scoped and block namespace declarations.
    pub const fn from_counts(file_scoped: usize, block: usize) -> Option<Self> {
        match (file_scoped, block) {
            (0, 0) => None,
            (_, 0) => Some(Self::FileScoped),
            (0, _) => Some(Self::BlockScoped),
            _ => Some(Self::Mixed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConventionInfo {
    pub has_editor_config: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_config_path: Option<String>,
    pub nullable_enabled: bool,
    pub implicit_usings_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_style: Option<NamespaceStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_framework: Option<String>,
    #[serde(default)]
    pub documentation_files: Vec<String>,
}

impl ConventionInfo {
    /// Fold per-project conventions into a solution-level view. Flags are true when any
    /// project enables them; the namespace literal keeps the longest one seen.
    pub fn merge(&mut self, other: &ConventionInfo) {
        if !self.has_editor_config && other.has_editor_config {
            self.has_editor_config = true;
            self.editor_config_path.clone_from(&other.editor_config_path);
        }
        self.nullable_enabled |= other.nullable_enabled;
        self.implicit_usings_enabled |= other.implicit_usings_enabled;
        match (&self.default_namespace, &other.default_namespace) {
            (None, Some(ns)) => self.default_namespace = Some(ns.clone()),
            (Some(current), Some(ns)) if ns.len() > current.len() => {
                self.default_namespace = Some(ns.clone());
            }
            _ => {}
        }
        self.namespace_style = match (self.namespace_style, other.namespace_style) {
            (None, style) | (style, None) => style,
            (Some(a), Some(b)) if a == b => Some(a),
            _ => Some(NamespaceStyle::Mixed),
        };
        if self.test_framework.is_none() {
            self.test_framework.clone_from(&other.test_framework);
        }
        for doc in &other.documentation_files {
            if !self.documentation_files.contains(doc) {
                self.documentation_files.push(doc.clone());
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectStatistics {
    pub file_count: usize,
    pub source_file_count: usize,
    pub total_lines: usize,
    pub total_size_bytes: u64,
    pub namespace_count: usize,
    pub type_count: usize,
    pub member_count: usize,
    pub class_count: usize,
    pub interface_count: usize,
}

impl ProjectStatistics {
    pub fn add(&mut self, other: &ProjectStatistics) {
        self.file_count += other.file_count;
        self.source_file_count += other.source_file_count;
        self.total_lines += other.total_lines;
        self.total_size_bytes += other.total_size_bytes;
        self.namespace_count += other.namespace_count;
        self.type_count += other.type_count;
        self.member_count += other.member_count;
        self.class_count += other.class_count;
        self.interface_count += other.interface_count;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageReference {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub project_file_path: String,
    #[serde(default)]
    pub root_directories: Vec<String>,
    #[serde(default)]
    pub target_frameworks: Vec<String>,
    #[serde(default)]
    pub package_references: Vec<PackageReference>,
    #[serde(default)]
    pub project_references: Vec<String>,
    #[serde(default)]
    pub namespaces: Vec<NamespaceInfo>,
    #[serde(default)]
    pub files: Vec<FileEntryInfo>,
    #[serde(default)]
    pub statistics: ProjectStatistics,
    #[serde(default)]
    pub conventions: ConventionInfo,
}

impl ProjectInfo {
    /// Stable project identity; always the manifest path.
    pub fn project_id(&self) -> &str {
        &self.project_file_path
    }

    pub fn types(&self) -> impl Iterator<Item = (&NamespaceInfo, &TypeInfo)> {
        self.namespaces
            .iter()
            .flat_map(|ns| ns.types.iter().map(move |t| (ns, t)))
    }

    /// Recompute statistics from the merged file and namespace sets.
    pub fn recompute_statistics(&mut self) {
        let mut stats = ProjectStatistics {
            file_count: self.files.len(),
            ..ProjectStatistics::default()
        };
        for file in &self.files {
            if file.kind == FileKind::Source {
                stats.source_file_count += 1;
            }
            stats.total_lines += file.line_count;
            stats.total_size_bytes += file.size_bytes;
        }
        let namespace_names: BTreeSet<&str> =
            self.namespaces.iter().map(|ns| ns.name.as_str()).collect();
        stats.namespace_count = namespace_names.len();
        for (_, ty) in self.types() {
            stats.type_count += 1;
            stats.member_count += ty.members.len();
            match ty.symbol.kind {
                SymbolKind::Class | SymbolKind::Record => stats.class_count += 1,
                SymbolKind::Interface => stats.interface_count += 1,
                _ => {}
            }
        }
        self.statistics = stats;
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolutionInfo {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub projects: Vec<ProjectInfo>,
    #[serde(default)]
    pub statistics: ProjectStatistics,
    #[serde(default)]
    pub conventions: ConventionInfo,
}

impl SolutionInfo {
    /// Directory all solution-relative paths are computed against.
    pub fn root_dir(&self) -> &Path {
        let path = Path::new(&self.path);
        if path.extension().is_some() {
            path.parent().unwrap_or(path)
        } else {
            path
        }
    }

    pub fn find_project(&self, name: &str) -> Option<&ProjectInfo> {
        let wanted = name.trim();
        self.projects
            .iter()
            .find(|p| p.name == wanted || p.project_file_path == wanted)
            .or_else(|| {
                self.projects
                    .iter()
                    .find(|p| p.name.eq_ignore_ascii_case(wanted))
            })
    }

    pub fn project_by_id(&self, project_id: &str) -> Option<&ProjectInfo> {
        self.projects.iter().find(|p| p.project_id() == project_id)
    }

    pub fn types(&self) -> impl Iterator<Item = (&ProjectInfo, &NamespaceInfo, &TypeInfo)> {
        self.projects
            .iter()
            .flat_map(|p| p.types().map(move |(ns, t)| (p, ns, t)))
    }

    pub fn recompute_totals(&mut self) {
        let mut stats = ProjectStatistics::default();
        let mut conventions = ConventionInfo::default();
        for project in &self.projects {
            stats.add(&project.statistics);
            conventions.merge(&project.conventions);
        }
        self.statistics = stats;
        // Solution-level hints that were detected outside of analyzed projects survive.
        if conventions.test_framework.is_none() {
            conventions.test_framework.clone_from(&self.conventions.test_framework);
        }
        self.conventions = conventions;
    }
}

/// `Repo<T>` → `Repo`, `App.Repo<T>` → `App.Repo`.
pub fn strip_generic_suffix(name: &str) -> &str {
    name.split('<').next().unwrap_or(name).trim()
}

/// Last dotted segment without generic arguments: `App.Core.IRepo<User>` → `IRepo`.
pub fn simple_type_name(name: &str) -> &str {
    let base = strip_generic_suffix(name);
    base.rsplit('.').next().unwrap_or(base).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(id: &str, name: &str, kind: SymbolKind, file: &str) -> SymbolInfo {
        SymbolInfo {
            unique_id: Some(id.to_string()),
            name: name.to_string(),
            signature: id.trim_start_matches("T:").to_string(),
            kind,
            accessibility: Accessibility::Public,
            attributes: Vec::new(),
            summary: None,
            locations: vec![Location::new(file, 1, 1)],
        }
    }

    #[test]
    fn kind_parse_is_case_insensitive() {
        assert_eq!(SymbolKind::parse("method"), Some(SymbolKind::Method));
        assert_eq!(SymbolKind::parse(" ENUMMEMBER "), Some(SymbolKind::EnumMember));
        assert_eq!(SymbolKind::parse("trait"), None);
    }

    #[test]
    fn accessibility_from_modifiers_handles_compound_forms() {
        assert_eq!(
            Accessibility::from_modifiers(["protected", "internal", "static"]),
            Some(Accessibility::ProtectedInternal)
        );
        assert_eq!(
            Accessibility::from_modifiers(["private", "protected"]),
            Some(Accessibility::PrivateProtected)
        );
        assert_eq!(Accessibility::from_modifiers(["static"]), None);
        assert_eq!(
            Accessibility::parse("protected internal"),
            Some(Accessibility::ProtectedInternal)
        );
    }

    #[test]
    fn key_falls_back_to_signature() {
        let mut sym = symbol("T:App.User", "User", SymbolKind::Class, "/a.cs");
        assert_eq!(sym.key(), "T:App.User");
        sym.unique_id = None;
        assert_eq!(sym.key(), "App.User");
    }

    #[test]
    fn classify_generated_and_sources() {
        assert_eq!(FileKind::classify(Path::new("a/Form1.Designer.cs")), FileKind::Generated);
        assert_eq!(FileKind::classify(Path::new("a/Program.cs")), FileKind::Source);
        assert_eq!(FileKind::classify(Path::new("a/README.md")), FileKind::Doc);
        assert_eq!(FileKind::classify(Path::new("a/App.csproj")), FileKind::Config);
        assert_eq!(FileKind::classify(Path::new("a/.editorconfig")), FileKind::Config);
        assert_eq!(FileKind::classify(Path::new("a/Strings.resx")), FileKind::Resource);
    }

    #[test]
    fn merge_partial_unions_locations_and_members() {
        let mut first = TypeInfo {
            symbol: symbol("T:App.User", "User", SymbolKind::Class, "/a.cs"),
            members: Vec::new(),
            base_types: vec!["Entity".into()],
            implemented_interfaces: Vec::new(),
            is_partial: true,
            is_abstract: false,
            is_sealed: false,
            is_static: false,
            file_path: "/a.cs".into(),
            relative_path: "a.cs".into(),
            line_number: 1,
        };
        let mut second = first.clone();
        second.symbol.locations = vec![Location::new("/b.cs", 3, 1)];
        second.implemented_interfaces = vec!["IAudited".into()];
        first.merge_partial(second);

        assert_eq!(first.symbol.locations.len(), 2);
        assert_eq!(first.base_types, vec!["Entity".to_string()]);
        assert_eq!(first.implemented_interfaces, vec!["IAudited".to_string()]);
    }

    #[test]
    fn simple_type_name_strips_namespace_and_generics() {
        assert_eq!(simple_type_name("App.Core.IRepo<User>"), "IRepo");
        assert_eq!(simple_type_name("IDisposable"), "IDisposable");
    }

    #[test]
    fn conventions_merge_keeps_longest_namespace() {
        let mut merged = ConventionInfo::default();
        merged.merge(&ConventionInfo {
            default_namespace: Some("App".into()),
            namespace_style: Some(NamespaceStyle::FileScoped),
            ..ConventionInfo::default()
        });
        merged.merge(&ConventionInfo {
            default_namespace: Some("App.Services".into()),
            nullable_enabled: true,
            namespace_style: Some(NamespaceStyle::BlockScoped),
            ..ConventionInfo::default()
        });
        assert_eq!(merged.default_namespace.as_deref(), Some("App.Services"));
        assert!(merged.nullable_enabled);
        assert_eq!(merged.namespace_style, Some(NamespaceStyle::Mixed));
    }
}
