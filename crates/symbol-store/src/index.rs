use crate::entry::IndexedSymbol;
use codeintel_protocol::SolutionInfo;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct SymbolIndex {
    by_key: DashMap<String, IndexedSymbol>,
    by_name: DashMap<String, BTreeSet<String>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry unless its key is already present. Returns whether it was added.
    pub fn add_symbol(&self, entry: IndexedSymbol) -> bool {
        let bucket = entry.name_bucket();
        let key = entry.key.clone();
        match self.by_key.entry(key.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                // Bucket first, under the key's shard lock: a visible key is always
                // reachable by name.
                self.by_name.entry(bucket).or_default().insert(key);
                slot.insert(entry);
                true
            }
        }
    }

    /// Insert or overwrite. Used when a partial type's merged view supersedes the entry
    /// recorded from its first declaration.
    pub fn upsert(&self, entry: IndexedSymbol) {
        let bucket = entry.name_bucket();
        let key = entry.key.clone();
        let slot = self.by_key.entry(key.clone());
        if let Entry::Occupied(previous) = &slot {
            let old_bucket = previous.get().name_bucket();
            if old_bucket != bucket {
                self.prune_bucket(&old_bucket, &key);
            }
        }
        self.by_name.entry(bucket).or_default().insert(key);
        slot.insert(entry);
    }

    pub fn get_by_key(&self, key: &str) -> Option<IndexedSymbol> {
        self.by_key.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Case-insensitive exact-name lookup, ordered by key.
    pub fn get_by_name(&self, name: &str) -> Vec<IndexedSymbol> {
        let keys: Vec<String> = self
            .by_name
            .get(&name.to_lowercase())
            .map(|bucket| bucket.iter().cloned().collect())
            .unwrap_or_default();
        keys.iter().filter_map(|key| self.get_by_key(key)).collect()
    }

    /// Drop every symbol declared in `file_path`. Returns the number removed.
    pub fn invalidate_by_file(&self, file_path: &str) -> usize {
        let doomed: Vec<String> = self
            .by_key
            .iter()
            .filter(|entry| entry.symbol.is_declared_in(file_path))
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for key in doomed {
            // Recheck under the shard lock; the key may have been re-added meanwhile.
            if let Entry::Occupied(slot) = self.by_key.entry(key) {
                if slot.get().symbol.is_declared_in(file_path) {
                    self.prune_bucket(&slot.get().name_bucket(), slot.key());
                    slot.remove();
                    removed += 1;
                }
            }
        }
        if removed > 0 {
            log::debug!("invalidated {removed} symbols from {file_path}");
        }
        removed
    }

    fn prune_bucket(&self, bucket: &str, key: &str) {
        if let Some(mut keys) = self.by_name.get_mut(bucket) {
            keys.remove(key);
        }
        self.by_name.remove_if(bucket, |_, keys| keys.is_empty());
    }

    /// Case-insensitive name search: exact-name hits first, then names containing
    /// `text`; each group ordered by name then key.
    pub fn search(&self, text: &str, top_n: usize) -> Vec<IndexedSymbol> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() || top_n == 0 {
            return Vec::new();
        }

        let exact: Vec<String> = self
            .by_name
            .get(&needle)
            .map(|bucket| bucket.iter().cloned().collect())
            .unwrap_or_default();
        let partial: Vec<String> = self
            .by_name
            .iter()
            .filter(|bucket| bucket.key() != &needle && bucket.key().contains(&needle))
            .flat_map(|bucket| bucket.value().iter().cloned().collect::<Vec<_>>())
            .collect();

        let resolve = |keys: Vec<String>| {
            let mut hits: Vec<IndexedSymbol> =
                keys.iter().filter_map(|key| self.get_by_key(key)).collect();
            hits.sort_by(|a, b| a.symbol.name.cmp(&b.symbol.name).then_with(|| a.key.cmp(&b.key)));
            hits
        };

        let mut results = resolve(exact);
        results.extend(resolve(partial));
        results.truncate(top_n);
        results
    }

    /// All entries, ordered by key.
    pub fn snapshot(&self) -> Vec<IndexedSymbol> {
        let mut all: Vec<IndexedSymbol> = self.by_key.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        all
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn name_bucket_count(&self) -> usize {
        self.by_name.len()
    }

    pub fn clear(&self) {
        self.by_key.clear();
        self.by_name.clear();
    }

    /// Index every type and member of an already-built model. Returns entries added.
    pub fn index_solution(&self, solution: &SolutionInfo) -> usize {
        let mut added = 0;
        for (project, namespace, ty) in solution.types() {
            let project_id = project.project_id();
            if self.add_symbol(IndexedSymbol::for_type(project_id, &namespace.name, ty)) {
                added += 1;
            }
            for member in &ty.members {
                let entry = IndexedSymbol::for_member(project_id, &namespace.name, ty, member);
                if self.add_symbol(entry) {
                    added += 1;
                }
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::IndexedDetail;
    use codeintel_protocol::{Accessibility, Location, SymbolInfo, SymbolKind};

    fn entry(id: &str, name: &str, file: &str) -> IndexedSymbol {
        IndexedSymbol {
            key: id.to_string(),
            symbol: SymbolInfo {
                unique_id: Some(id.to_string()),
                name: name.to_string(),
                signature: id.trim_start_matches("T:").to_string(),
                kind: SymbolKind::Class,
                accessibility: Accessibility::Public,
                attributes: Vec::new(),
                summary: None,
                locations: vec![Location::new(file, 1, 1)],
            },
            detail: IndexedDetail::Type {
                base_types: Vec::new(),
                implemented_interfaces: Vec::new(),
                member_keys: Vec::new(),
            },
            project_file_path: "/repo/App.csproj".to_string(),
            namespace: "App".to_string(),
        }
    }

    #[test]
    fn upsert_replaces_existing_entry() {
        let index = SymbolIndex::new();
        index.add_symbol(entry("T:App.Order", "Order", "/repo/Order.cs"));
        let mut merged = entry("T:App.Order", "Order", "/repo/Order.cs");
        merged
            .symbol
            .locations
            .push(Location::new("/repo/Order.Part.cs", 1, 1));
        index.upsert(merged);

        assert_eq!(index.len(), 1);
        assert_eq!(index.invalidate_by_file("/repo/Order.Part.cs"), 1);
        assert!(index.is_empty());
        assert_eq!(index.name_bucket_count(), 0);
    }

    #[test]
    fn search_ignores_blank_text() {
        let index = SymbolIndex::new();
        index.add_symbol(entry("T:App.Order", "Order", "/repo/Order.cs"));
        assert!(index.search("   ", 10).is_empty());
        assert!(index.search("order", 0).is_empty());
    }
}
