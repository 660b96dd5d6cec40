use crate::error::{QueryError, Result};
use crate::service::{resolve, SemanticQueryService, Target};
use codeintel_protocol::results::{
    NamespaceTypes, SearchHit, SearchResults, SymbolDetail, SymbolExtra, TypeMembers,
    TypeSummary,
};
use codeintel_protocol::{Accessibility, SymbolKind};
use codeintel_symbol_store::IndexedSymbol;
use std::cmp::Ordering;

pub const DEFAULT_TOP_K: usize = 20;
pub const MAX_TOP_K: usize = 100;

const SCORE_EXACT: f32 = 1.0;
const SCORE_PREFIX: f32 = 0.85;
const SCORE_CONTAINS: f32 = 0.70;
const SCORE_SIGNATURE: f32 = 0.45;
const SCORE_SUMMARY: f32 = 0.30;

/// Relevance of `entry` for a lower-cased query; `None` excludes it.
fn score(entry: &IndexedSymbol, needle: &str) -> Option<f32> {
    let name = entry.symbol.name.to_lowercase();
    if name == needle {
        return Some(SCORE_EXACT);
    }
    if name.starts_with(needle) {
        return Some(SCORE_PREFIX);
    }
    if name.contains(needle) {
        return Some(SCORE_CONTAINS);
    }
    if entry.symbol.signature.to_lowercase().contains(needle) {
        return Some(SCORE_SIGNATURE);
    }
    entry
        .symbol
        .summary
        .as_deref()
        .filter(|summary| summary.to_lowercase().contains(needle))
        .map(|_| SCORE_SUMMARY)
}

/// Scope matches a declaring file path or, as a namespace proxy, the signature.
fn in_scope(entry: &IndexedSymbol, scope: &str) -> bool {
    entry
        .symbol
        .locations
        .iter()
        .any(|loc| loc.file_path.to_lowercase().contains(scope))
        || entry.symbol.signature.to_lowercase().contains(scope)
}

pub(crate) fn parse_kind(raw: Option<&str>) -> Result<Option<SymbolKind>> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(value) => SymbolKind::parse(value)
            .map(Some)
            .ok_or_else(|| QueryError::InvalidArgument(format!("unknown symbol kind '{value}'"))),
    }
}

fn parse_accessibility(raw: Option<&str>) -> Result<Option<Accessibility>> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(value) => Accessibility::parse(value).map(Some).ok_or_else(|| {
            QueryError::InvalidArgument(format!("unknown accessibility '{value}'"))
        }),
    }
}

impl SemanticQueryService {
    pub async fn search_symbols(
        &self,
        query: &str,
        kind: Option<&str>,
        scope: Option<&str>,
        top_k: Option<usize>,
    ) -> Result<SearchResults> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(QueryError::InvalidArgument(
                "query must not be empty".to_string(),
            ));
        }
        let kind = parse_kind(kind)?;
        let scope = scope
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let top_k = top_k.unwrap_or(DEFAULT_TOP_K).clamp(1, MAX_TOP_K);
        let state = self.state().await?;

        let mut scored: Vec<(f32, IndexedSymbol)> = state
            .index
            .snapshot()
            .into_iter()
            .filter(|e| kind.map_or(true, |k| e.kind() == k))
            .filter(|e| scope.as_deref().map_or(true, |s| in_scope(e, s)))
            .filter_map(|e| score(&e, &needle).map(|s| (s, e)))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let total_matches = scored.len();
        let results = scored
            .into_iter()
            .take(top_k)
            .map(|(score, entry)| SearchHit {
                symbol_id: entry.key,
                name: entry.symbol.name,
                kind: entry.symbol.kind,
                signature: entry.symbol.signature,
                accessibility: entry.symbol.accessibility,
                summary: entry.symbol.summary,
                location: entry.symbol.locations.into_iter().next(),
                score,
            })
            .collect();

        Ok(SearchResults {
            query: query.trim().to_string(),
            total_matches,
            results,
        })
    }

    pub async fn get_symbol_detail(&self, symbol_id: &str) -> Result<SymbolDetail> {
        let state = self.state().await?;
        let entry = resolve(&state, symbol_id, Target::Any)?;

        let (project, namespace, symbol, extra) = if entry.is_type() {
            let (project, ns, ty) = state.find_type(&entry.key).ok_or_else(|| stale(&entry))?;
            (project, ns, ty.symbol.clone(), SymbolExtra::for_type(ty))
        } else {
            let (project, ns, ty, member) =
                state.find_member(&entry.key).ok_or_else(|| stale(&entry))?;
            (
                project,
                ns,
                member.symbol.clone(),
                SymbolExtra::for_member(member, Some(ty)),
            )
        };

        Ok(SymbolDetail {
            symbol,
            project: Some(project.name.clone()),
            namespace: Some(namespace.name.clone()),
            extra,
        })
    }

    pub async fn get_type_members(
        &self,
        type_id: &str,
        kind: Option<&str>,
        accessibility: Option<&str>,
    ) -> Result<TypeMembers> {
        let kind = parse_kind(kind)?;
        let accessibility = parse_accessibility(accessibility)?;
        let state = self.state().await?;
        let entry = resolve(&state, type_id, Target::Type)?;
        let (_, _, ty) = state.find_type(&entry.key).ok_or_else(|| stale(&entry))?;

        let members: Vec<_> = ty
            .members
            .iter()
            .filter(|m| kind.map_or(true, |k| m.symbol.kind == k))
            .filter(|m| accessibility.map_or(true, |a| m.symbol.accessibility == a))
            .cloned()
            .collect();

        Ok(TypeMembers {
            type_id: entry.key,
            type_name: ty.symbol.name.clone(),
            total_count: ty.members.len(),
            filtered_count: members.len(),
            members,
        })
    }

    /// Types declared in `namespace`, optionally including nested namespaces.
    pub async fn get_namespace_types(
        &self,
        namespace: &str,
        include_sub_namespaces: bool,
    ) -> Result<NamespaceTypes> {
        let wanted = namespace.trim();
        if wanted.is_empty() {
            return Err(QueryError::InvalidArgument(
                "namespace must not be empty".to_string(),
            ));
        }
        let state = self.state().await?;
        let prefix = format!("{wanted}.");
        let selected =
            |name: &str| name == wanted || (include_sub_namespaces && name.starts_with(&prefix));

        let mut matched_namespace = false;
        let mut types: Vec<TypeSummary> = Vec::new();
        for (_, ns, ty) in state.info.types() {
            if !selected(&ns.name) {
                continue;
            }
            matched_namespace = true;
            if !types.iter().any(|t| t.id.is_some() && t.id == ty.symbol.unique_id) {
                types.push(TypeSummary::new(&ns.name, ty));
            }
        }
        if !matched_namespace {
            return Err(QueryError::not_found(
                "Namespace",
                wanted,
                "Use get_project_metadata to list namespaces.",
            ));
        }

        types.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.namespace.cmp(&b.namespace))
        });
        Ok(NamespaceTypes {
            namespace: wanted.to_string(),
            include_sub_namespaces,
            types,
        })
    }
}

fn stale(entry: &IndexedSymbol) -> QueryError {
    QueryError::not_found(
        "Symbol",
        &entry.key,
        "The index is out of date; call load_solution again.",
    )
}
