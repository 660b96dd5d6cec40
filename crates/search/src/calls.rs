use crate::error::{QueryError, Result};
use crate::service::{check_cancelled, resolve_live_target, SemanticQueryService};
use codeintel_indexer::{BodyOperation, ReferenceHit};
use codeintel_protocol::results::{
    CalleeInfo, CalleeKind, Callees, CallerInfo, Callers, UsageInfo, UsageKind, Usages,
};
use std::collections::{HashMap, HashSet};
use tokio_util::sync::CancellationToken;

pub const MAX_CALLERS: usize = 50;
pub const MAX_CALLEES: usize = 100;
pub const MAX_USAGES: usize = 200;

impl SemanticQueryService {
    /// Every method calling `symbol_id`, each with all of its call sites.
    pub async fn get_callers(
        &self,
        symbol_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Callers> {
        check_cancelled(cancel)?;
        let engine = self.live("get_callers").await?;
        let state = self.state().await?;
        let (key, name) = resolve_live_target(&state, engine.as_ref(), symbol_id, cancel).await?;

        let found = engine
            .find_callers(&key, cancel)
            .await
            .map_err(QueryError::from_engine)?;
        let mut callers = merge_callers(found);
        let truncated = callers.len() > MAX_CALLERS;
        callers.truncate(MAX_CALLERS);

        Ok(Callers {
            symbol_id: key,
            name,
            callers,
            truncated,
        })
    }

    /// Methods invoked and types constructed in the body of `symbol_id`.
    pub async fn get_callees(
        &self,
        symbol_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Callees> {
        check_cancelled(cancel)?;
        let engine = self.live("get_callees").await?;
        let state = self.state().await?;
        let (key, name) = resolve_live_target(&state, engine.as_ref(), symbol_id, cancel).await?;

        let operations = engine
            .body_operations(&key, cancel)
            .await
            .map_err(QueryError::from_engine)?;
        let mut seen = HashSet::new();
        let mut callees: Vec<CalleeInfo> = operations
            .into_iter()
            .map(|op| match op {
                BodyOperation::Invocation(callee) => CalleeInfo {
                    callee,
                    kind: CalleeKind::Invocation,
                },
                BodyOperation::ObjectCreation(callee) => CalleeInfo {
                    callee,
                    kind: CalleeKind::Construction,
                },
            })
            .filter(|c| seen.insert(c.callee.identity().to_string()))
            .collect();
        let truncated = callees.len() > MAX_CALLEES;
        callees.truncate(MAX_CALLEES);

        Ok(Callees {
            symbol_id: key,
            name,
            callees,
            truncated,
        })
    }

    /// Every reference to `symbol_id` with a one-line snippet and read/write kind.
    pub async fn get_usages(&self, symbol_id: &str, cancel: &CancellationToken) -> Result<Usages> {
        check_cancelled(cancel)?;
        let engine = self.live("get_usages").await?;
        let state = self.state().await?;
        let (key, name) = resolve_live_target(&state, engine.as_ref(), symbol_id, cancel).await?;

        let hits = engine
            .find_references(&key, cancel)
            .await
            .map_err(QueryError::from_engine)?;
        let total_found = hits.len();

        let mut lines = SourceLines::default();
        let mut usages = Vec::with_capacity(total_found.min(MAX_USAGES));
        for hit in hits.into_iter().take(MAX_USAGES) {
            check_cancelled(cancel)?;
            let snippet = match &hit.snippet {
                Some(snippet) => snippet.trim().to_string(),
                None => lines
                    .line(&hit.location.file_path, hit.location.start_line)
                    .await
                    .unwrap_or_default(),
            };
            usages.push(UsageInfo {
                file_path: hit.location.file_path.clone(),
                line: hit.location.start_line,
                column: hit.location.start_column,
                snippet,
                kind: usage_kind(&hit),
            });
        }

        Ok(Usages {
            symbol_id: key,
            name,
            total_found,
            truncated: total_found > MAX_USAGES,
            usages,
        })
    }
}

fn usage_kind(hit: &ReferenceHit) -> UsageKind {
    if hit.is_write {
        UsageKind::Write
    } else if hit.is_implicit {
        UsageKind::Implicit
    } else {
        UsageKind::Read
    }
}

/// One entry per caller, call sites concatenated without duplicates.
fn merge_callers(found: Vec<CallerInfo>) -> Vec<CallerInfo> {
    let mut order: Vec<CallerInfo> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for caller in found {
        let identity = caller.caller.identity().to_string();
        match positions.get(&identity) {
            Some(&at) => {
                let existing = &mut order[at];
                for site in caller.call_sites {
                    if !existing.call_sites.contains(&site) {
                        existing.call_sites.push(site);
                    }
                }
            }
            None => {
                positions.insert(identity, order.len());
                order.push(caller);
            }
        }
    }
    order
}

/// Source files read on demand for snippets, each at most once.
#[derive(Default)]
struct SourceLines {
    files: HashMap<String, Option<Vec<String>>>,
}

impl SourceLines {
    async fn line(&mut self, path: &str, line: u32) -> Option<String> {
        if !self.files.contains_key(path) {
            let content = match tokio::fs::read_to_string(path).await {
                Ok(text) => Some(text.lines().map(str::to_string).collect()),
                Err(e) => {
                    log::debug!("No snippet source for {path}: {e}");
                    None
                }
            };
            self.files.insert(path.to_string(), content);
        }
        let index = usize::try_from(line).ok()?.checked_sub(1)?;
        self.files
            .get(path)?
            .as_ref()?
            .get(index)
            .map(|l| l.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeintel_protocol::results::SymbolRef;
    use codeintel_protocol::Location;

    fn caller(name: &str, line: u32) -> CallerInfo {
        CallerInfo {
            caller: SymbolRef {
                id: Some(format!("M:App.{name}")),
                name: name.to_string(),
                kind: None,
                signature: None,
                location: None,
            },
            call_sites: vec![Location::new("/repo/App.cs", line, 5)],
        }
    }

    #[test]
    fn callers_are_merged_by_identity() {
        let merged = merge_callers(vec![
            caller("Run", 10),
            caller("Stop", 20),
            caller("Run", 30),
            caller("Run", 10),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].call_sites.len(), 2);
        assert_eq!(merged[1].caller.name, "Stop");
    }

    #[test]
    fn write_wins_over_implicit() {
        let hit = ReferenceHit {
            location: Location::new("/repo/App.cs", 1, 1),
            snippet: None,
            is_write: true,
            is_implicit: true,
        };
        assert_eq!(usage_kind(&hit), UsageKind::Write);
        let implicit = ReferenceHit {
            is_write: false,
            ..hit
        };
        assert_eq!(usage_kind(&implicit), UsageKind::Implicit);
    }

    #[tokio::test]
    async fn snippet_lines_are_trimmed() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("A.cs");
        std::fs::write(&file, "class A\n{\n    void Run() { }\n}\n").unwrap();
        let path = file.display().to_string();

        let mut lines = SourceLines::default();
        assert_eq!(lines.line(&path, 3).await.as_deref(), Some("void Run() { }"));
        assert_eq!(lines.line(&path, 0).await, None);
        assert_eq!(lines.line(&path, 99).await, None);
        assert_eq!(lines.line("/missing/B.cs", 1).await, None);
    }
}
