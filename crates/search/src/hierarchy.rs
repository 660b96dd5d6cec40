use crate::context::SolutionState;
use crate::error::{QueryError, Result};
use crate::service::{check_cancelled, resolve, SemanticQueryService, Target};
use codeintel_indexer::SemanticEngine;
use codeintel_protocol::model::simple_type_name;
use codeintel_protocol::results::{
    HierarchySource, InterfaceImplementations, SymbolRef, TypeHierarchy,
};
use codeintel_protocol::{SymbolKind, TypeInfo};
use codeintel_symbol_store::IndexedSymbol;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

/// Longest base chain followed before giving up on a malformed model.
const MAX_BASE_CHAIN: usize = 32;

impl SemanticQueryService {
    pub async fn get_type_hierarchy(
        &self,
        type_id: &str,
        cancel: &CancellationToken,
    ) -> Result<TypeHierarchy> {
        check_cancelled(cancel)?;
        let state = self.state().await?;
        let entry = resolve(&state, type_id, Target::Type)?;
        let (_, _, ty) = state
            .find_type(&entry.key)
            .ok_or_else(|| QueryError::not_found("Type", &entry.key, "Reload the solution."))?;

        let is_interface = ty.symbol.kind == SymbolKind::Interface;
        let (derived_types, source) =
            derived(&state, &entry, is_interface, cancel, DerivedQuery::Hierarchy).await?;

        Ok(TypeHierarchy {
            type_id: entry.key.clone(),
            name: ty.symbol.name.clone(),
            kind: ty.symbol.kind,
            base_types: ty.base_types.clone(),
            base_chain: base_chain(&state, ty),
            implemented_interfaces: ty.implemented_interfaces.clone(),
            derived_types,
            source,
        })
    }

    pub async fn get_interface_implementations(
        &self,
        interface_id: &str,
        cancel: &CancellationToken,
    ) -> Result<InterfaceImplementations> {
        check_cancelled(cancel)?;
        let state = self.state().await?;
        let entry = resolve(&state, interface_id, Target::Type)?;
        if entry.kind() != SymbolKind::Interface {
            return Err(QueryError::InvalidArgument(format!(
                "{} is a {}, not an interface",
                entry.symbol.name,
                entry.kind()
            )));
        }

        let (implementations, source) =
            derived(&state, &entry, true, cancel, DerivedQuery::Implementations).await?;
        Ok(InterfaceImplementations {
            interface_id: entry.key.clone(),
            name: entry.symbol.name.clone(),
            implementations,
            source,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum DerivedQuery {
    /// Derived types, plus implementations when the target is an interface.
    Hierarchy,
    Implementations,
}

async fn derived(
    state: &SolutionState,
    entry: &IndexedSymbol,
    is_interface: bool,
    cancel: &CancellationToken,
    query: DerivedQuery,
) -> Result<(Vec<SymbolRef>, HierarchySource)> {
    if let Some(engine) = &state.live {
        match live_derived(engine.as_ref(), &entry.key, is_interface, cancel, query).await {
            Ok(found) => return Ok((found, HierarchySource::Live)),
            Err(QueryError::Cancelled) => return Err(QueryError::Cancelled),
            Err(e) => log::warn!("Live hierarchy query failed for {}, using index: {e}", entry.key),
        }
    }
    Ok((index_derived(state, entry), HierarchySource::Index))
}

async fn live_derived(
    engine: &dyn SemanticEngine,
    key: &str,
    is_interface: bool,
    cancel: &CancellationToken,
    query: DerivedQuery,
) -> Result<Vec<SymbolRef>> {
    let mut found = Vec::new();
    if matches!(query, DerivedQuery::Hierarchy) {
        found.extend(
            engine
                .find_derived_types(key, cancel)
                .await
                .map_err(QueryError::from_engine)?,
        );
    }
    if is_interface {
        found.extend(
            engine
                .find_implementations(key, cancel)
                .await
                .map_err(QueryError::from_engine)?,
        );
    }
    let mut seen = HashSet::new();
    found.retain(|r| seen.insert(r.identity().to_string()));
    Ok(found)
}

/// Types whose base or interface list names the target, compared by simple name.
fn index_derived(state: &SolutionState, entry: &IndexedSymbol) -> Vec<SymbolRef> {
    let target = simple_type_name(&entry.symbol.name);
    state
        .index
        .snapshot()
        .into_iter()
        .filter(|e| e.is_type() && e.key != entry.key)
        .filter(|e| e.supertypes().any(|s| simple_type_name(s) == target))
        .map(|e| SymbolRef::from_symbol(&e.symbol))
        .collect()
}

/// Base class names from the direct base up, following declarations found in the model.
fn base_chain(state: &SolutionState, ty: &TypeInfo) -> Vec<String> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(simple_type_name(&ty.symbol.name).to_string());
    let mut current = ty;

    while let Some(base) = current.base_types.first() {
        if chain.len() >= MAX_BASE_CHAIN {
            break;
        }
        chain.push(base.clone());
        let simple = simple_type_name(base);
        if !seen.insert(simple.to_string()) {
            break;
        }
        let next = state.info.types().map(|(_, _, t)| t).find(|t| {
            matches!(t.symbol.kind, SymbolKind::Class | SymbolKind::Record)
                && simple_type_name(&t.symbol.name) == simple
        });
        match next {
            Some(next) => current = next,
            None => break,
        }
    }
    chain
}
