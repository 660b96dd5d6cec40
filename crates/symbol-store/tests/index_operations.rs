use codeintel_protocol::{
    Accessibility, Location, MemberInfo, NamespaceInfo, ProjectInfo, SolutionInfo, SymbolInfo,
    SymbolKind, TypeInfo,
};
use codeintel_symbol_store::{IndexedDetail, IndexedSymbol, SymbolIndex};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn symbol(id: &str, name: &str, kind: SymbolKind, file: &str) -> SymbolInfo {
    SymbolInfo {
        unique_id: Some(id.to_string()),
        name: name.to_string(),
        signature: id[2..].to_string(),
        kind,
        accessibility: Accessibility::Public,
        attributes: Vec::new(),
        summary: None,
        locations: vec![Location::new(file, 3, 5)],
    }
}

fn type_entry(id: &str, name: &str, file: &str) -> IndexedSymbol {
    IndexedSymbol {
        key: id.to_string(),
        symbol: symbol(id, name, SymbolKind::Class, file),
        detail: IndexedDetail::Type {
            base_types: Vec::new(),
            implemented_interfaces: Vec::new(),
            member_keys: Vec::new(),
        },
        project_file_path: "/repo/src/App/App.csproj".to_string(),
        namespace: "App".to_string(),
    }
}

#[test]
fn adding_same_key_twice_keeps_one_entry() {
    let index = SymbolIndex::new();
    assert!(index.add_symbol(type_entry("T:App.UserService", "UserService", "/repo/a.cs")));
    assert!(!index.add_symbol(type_entry("T:App.UserService", "UserService", "/repo/b.cs")));

    assert_eq!(index.len(), 1);
    let stored = index.get_by_key("T:App.UserService").expect("entry");
    assert_eq!(stored.symbol.locations[0].file_path, "/repo/a.cs");
    assert_eq!(index.get_by_name("userservice").len(), 1);
}

#[test]
fn invalidation_removes_file_symbols_and_empty_buckets() {
    let index = SymbolIndex::new();
    index.add_symbol(type_entry("T:App.User", "User", "/repo/User.cs"));
    index.add_symbol(type_entry("T:App.Admin.User", "User", "/repo/Admin/User.cs"));
    index.add_symbol(type_entry("T:App.Order", "Order", "/repo/User.cs"));

    let removed = index.invalidate_by_file("/repo/User.cs");

    assert_eq!(removed, 2);
    assert!(index.get_by_key("T:App.User").is_none());
    assert!(index.get_by_key("T:App.Order").is_none());
    assert!(index.get_by_name("Order").is_empty());
    let users = index.get_by_name("User");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].key, "T:App.Admin.User");
    assert_eq!(index.name_bucket_count(), 1);
}

#[test]
fn search_puts_exact_name_before_substring_hits() {
    let index = SymbolIndex::new();
    index.add_symbol(type_entry("T:App.UserServiceFactory", "UserServiceFactory", "/r/f.cs"));
    index.add_symbol(type_entry("T:App.IUserService", "IUserService", "/r/i.cs"));
    index.add_symbol(type_entry("T:App.UserService", "UserService", "/r/s.cs"));
    index.add_symbol(type_entry("T:App.Order", "Order", "/r/o.cs"));

    let hits: Vec<String> = index
        .search("userservice", 10)
        .into_iter()
        .map(|hit| hit.key)
        .collect();
    assert_eq!(
        hits,
        vec![
            "T:App.UserService".to_string(),
            "T:App.IUserService".to_string(),
            "T:App.UserServiceFactory".to_string(),
        ]
    );
    assert_eq!(index.search("userservice", 1).len(), 1);
}

#[test]
fn index_solution_adds_types_and_members() {
    let mut service = TypeInfo {
        symbol: symbol("T:App.UserService", "UserService", SymbolKind::Class, "/r/s.cs"),
        members: Vec::new(),
        base_types: Vec::new(),
        implemented_interfaces: vec!["IUserService".to_string()],
        is_partial: false,
        is_abstract: false,
        is_sealed: false,
        is_static: false,
        file_path: "/r/s.cs".to_string(),
        relative_path: "s.cs".to_string(),
        line_number: 3,
    };
    service.members.push(MemberInfo {
        symbol: symbol("M:App.UserService.Get(int)", "Get", SymbolKind::Method, "/r/s.cs"),
        is_static: false,
        is_async: false,
        is_virtual: false,
        is_override: false,
        is_abstract: false,
        return_type: Some("User".to_string()),
        parameters: Vec::new(),
        comment: None,
        containing_type_id: Some("T:App.UserService".to_string()),
    });
    let solution = SolutionInfo {
        name: "App".to_string(),
        path: "/r/App.sln".to_string(),
        projects: vec![ProjectInfo {
            name: "App".to_string(),
            project_file_path: "/r/App.csproj".to_string(),
            namespaces: vec![NamespaceInfo {
                name: "App".to_string(),
                types: vec![service],
                file_path: "/r/s.cs".to_string(),
            }],
            ..ProjectInfo::default()
        }],
        statistics: Default::default(),
        conventions: Default::default(),
    };

    let index = SymbolIndex::new();
    assert_eq!(index.index_solution(&solution), 2);
    assert_eq!(index.index_solution(&solution), 0);

    let ty = index.get_by_key("T:App.UserService").expect("type");
    assert!(ty.is_type());
    assert_eq!(ty.supertypes().collect::<Vec<_>>(), vec!["IUserService"]);
    let member = index.get_by_key("M:App.UserService.Get(int)").expect("member");
    assert_eq!(member.project_file_path, "/r/App.csproj");
    match member.detail {
        IndexedDetail::Member {
            containing_type_id, ..
        } => assert_eq!(containing_type_id.as_deref(), Some("T:App.UserService")),
        IndexedDetail::Type { .. } => panic!("expected member detail"),
    }
}

#[tokio::test]
async fn concurrent_inserts_and_reads() {
    let index = Arc::new(SymbolIndex::new());
    let mut tasks = Vec::new();
    for worker in 0..8 {
        let index = Arc::clone(&index);
        tasks.push(tokio::spawn(async move {
            for i in 0..50 {
                let id = format!("T:App.Type{worker}_{i}");
                index.add_symbol(type_entry(&id, &format!("Type{worker}_{i}"), "/r/x.cs"));
                let _ = index.search("type", 5);
            }
        }));
    }
    for task in tasks {
        task.await.expect("task");
    }
    assert_eq!(index.len(), 400);
    assert_eq!(index.invalidate_by_file("/r/x.cs"), 400);
    assert!(index.is_empty());
}

#[test]
fn every_visible_key_is_reachable_by_name_during_inserts() {
    let index = Arc::new(SymbolIndex::new());
    std::thread::scope(|scope| {
        for worker in 0..4 {
            let index = Arc::clone(&index);
            scope.spawn(move || {
                for i in 0..200 {
                    let name = format!("Shared{}", i % 10);
                    let id = format!("T:App.W{worker}.{name}_{i}");
                    index.add_symbol(type_entry(&id, &name, "/r/x.cs"));
                }
            });
        }
        for _ in 0..2 {
            let index = Arc::clone(&index);
            scope.spawn(move || {
                for _ in 0..50 {
                    for entry in index.snapshot() {
                        let named = index.get_by_name(&entry.symbol.name);
                        assert!(
                            named.iter().any(|hit| hit.key == entry.key),
                            "{} missing from its name bucket",
                            entry.key
                        );
                    }
                }
            });
        }
    });
    assert_eq!(index.len(), 800);
    assert_eq!(index.name_bucket_count(), 10);
}

#[test]
fn invalidation_racing_inserts_leaves_no_orphan_buckets() {
    let index = Arc::new(SymbolIndex::new());
    std::thread::scope(|scope| {
        for worker in 0..4 {
            let index = Arc::clone(&index);
            scope.spawn(move || {
                for i in 0..300 {
                    let name = format!("Churn{}", i % 7);
                    let id = format!("T:App.W{worker}.{name}_{}", i % 25);
                    index.add_symbol(type_entry(&id, &name, "/r/churn.cs"));
                }
            });
        }
        let index = Arc::clone(&index);
        scope.spawn(move || {
            for _ in 0..300 {
                index.invalidate_by_file("/r/churn.cs");
            }
        });
    });

    index.invalidate_by_file("/r/churn.cs");
    assert!(index.is_empty());
    assert_eq!(index.name_bucket_count(), 0);
}
