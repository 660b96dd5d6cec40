//! Wire shape of payloads as agents see them.

use codeintel_protocol::results::{SearchHit, SearchResults};
use codeintel_protocol::{Accessibility, ErrorEnvelope, Location, RelativizePaths, SymbolKind};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;

#[test]
fn error_envelope_omits_missing_hint() {
    let plain = ErrorEnvelope::new("not_loaded", "No solution loaded").to_value();
    assert_eq!(plain, json!({ "error": "No solution loaded", "code": "not_loaded" }));

    let hinted = ErrorEnvelope::new("not_found", "Symbol not found: Foo")
        .with_hint("Use search_symbols to find valid symbol ids.")
        .to_value();
    assert_eq!(hinted["hint"], "Use search_symbols to find valid symbol ids.");
}

#[test]
fn search_results_use_snake_case_fields_and_relative_paths() {
    let mut results = SearchResults {
        query: "User".to_string(),
        total_matches: 1,
        results: vec![SearchHit {
            symbol_id: "T:App.User".to_string(),
            name: "User".to_string(),
            kind: SymbolKind::Class,
            signature: "public class User".to_string(),
            accessibility: Accessibility::Public,
            summary: None,
            location: Some(Location::new("/repo/src/App/User.cs", 3, 14)),
            score: 1.0,
        }],
    };
    results.relativize(Path::new("/repo"));

    let value = serde_json::to_value(&results).unwrap();
    assert_eq!(value["total_matches"], 1);
    let hit = &value["results"][0];
    assert_eq!(hit["symbol_id"], "T:App.User");
    assert_eq!(hit["kind"], "Class");
    assert_eq!(hit["accessibility"], "Public");
    assert_eq!(hit["location"]["file_path"], "src/App/User.cs");
    assert_eq!(hit["location"]["start_line"], 3);
    assert!(hit.get("summary").is_none());
}
