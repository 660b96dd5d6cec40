use crate::context::{AnalysisContext, SolutionState};
use crate::error::{QueryError, Result};
use codeintel_indexer::SemanticEngine;
use codeintel_symbol_store::IndexedSymbol;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Candidates listed when a bare name matches more than one symbol.
const MAX_LISTED_CANDIDATES: usize = 10;

const SEARCH_HINT: &str = "Use search_symbols to find valid symbol ids.";

/// Read-only queries over the loaded solution. Operations live in the `symbols`,
/// `hierarchy`, `calls` and `solution` modules.
#[derive(Clone)]
pub struct SemanticQueryService {
    context: Arc<AnalysisContext>,
}

impl SemanticQueryService {
    pub fn new(context: Arc<AnalysisContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<AnalysisContext> {
        &self.context
    }

    pub(crate) async fn state(&self) -> Result<Arc<SolutionState>> {
        self.context.require_state().await
    }

    pub(crate) async fn live(&self, operation: &str) -> Result<Arc<dyn SemanticEngine>> {
        self.context.require_live_provider(operation).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Any,
    Type,
}

impl Target {
    fn accepts(self, entry: &IndexedSymbol) -> bool {
        match self {
            Self::Any => true,
            Self::Type => entry.is_type(),
        }
    }

    fn what(self) -> &'static str {
        match self {
            Self::Any => "Symbol",
            Self::Type => "Type",
        }
    }
}

/// Resolve `raw` by exact id, then by unambiguous name (ignoring case), then by exact
/// display signature.
pub(crate) fn resolve(state: &SolutionState, raw: &str, target: Target) -> Result<IndexedSymbol> {
    let wanted = raw.trim();
    if wanted.is_empty() {
        return Err(QueryError::InvalidArgument(
            "symbol id must not be empty".to_string(),
        ));
    }

    if let Some(entry) = state.index.get_by_key(wanted) {
        if target.accepts(&entry) {
            return Ok(entry);
        }
    }

    let mut by_name: Vec<IndexedSymbol> = state
        .index
        .get_by_name(wanted)
        .into_iter()
        .filter(|e| target.accepts(e))
        .collect();
    match by_name.len() {
        0 => {}
        1 => return Ok(by_name.remove(0)),
        n => {
            let listed: Vec<&str> = by_name
                .iter()
                .take(MAX_LISTED_CANDIDATES)
                .map(|e| e.key.as_str())
                .collect();
            let more = n.saturating_sub(listed.len());
            let mut hint = format!("Name is ambiguous; use one of: {}", listed.join(", "));
            if more > 0 {
                hint.push_str(&format!(" (and {more} more)"));
            }
            return Err(QueryError::not_found(target.what(), wanted, hint));
        }
    }

    state
        .index
        .snapshot()
        .into_iter()
        .find(|e| target.accepts(e) && e.symbol.signature == wanted)
        .ok_or_else(|| QueryError::not_found(target.what(), wanted, SEARCH_HINT))
}

/// Resolve a call-graph target: index first, then the live engine's own resolution.
pub(crate) async fn resolve_live_target(
    state: &SolutionState,
    engine: &dyn SemanticEngine,
    raw: &str,
    cancel: &CancellationToken,
) -> Result<(String, String)> {
    match resolve(state, raw, Target::Any) {
        Ok(entry) => Ok((entry.key, entry.symbol.name)),
        Err(QueryError::NotFound { .. }) => {
            let resolved = engine
                .resolve_symbol(raw.trim(), cancel)
                .await
                .map_err(QueryError::from_engine)?;
            resolved
                .map(|r| (r.identity().to_string(), r.name))
                .ok_or_else(|| QueryError::not_found("Symbol", raw.trim(), SEARCH_HINT))
        }
        Err(other) => Err(other),
    }
}

pub(crate) fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(QueryError::Cancelled)
    } else {
        Ok(())
    }
}
